use std::fmt;
use std::str::FromStr;

use http::HeaderMap;
use http::header::CONTENT_ENCODING;

use crate::error::EncodingError;

/// The content codings this crate knows how to undo.
///
/// The table is closed: `gzip` and `deflate` select a decompressor, and every
/// other `Content-Encoding` value (including a missing header, `br`, `zstd`,
/// or a stacked list such as `gzip, br`) falls back to `Identity` and the
/// body is handed out exactly as received.
///
/// ```text
/// ┌─────────────────────┬──────────┬──────────────────────────────┐
/// │ Header value        │ Variant  │ Reader                       │
/// ├─────────────────────┼──────────┼──────────────────────────────┤
/// │ gzip                │ Gzip     │ flate2::read::MultiGzDecoder │
/// │ deflate             │ Deflate  │ flate2::read::ZlibDecoder    │
/// │ anything / absent   │ Identity │ the raw stream               │
/// └─────────────────────┴──────────┴──────────────────────────────┘
/// ```
///
/// `deflate` is decoded as zlib-wrapped deflate (RFC 1950), which is what
/// the HTTP `deflate` coding means on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ContentEncoding {
    #[default]
    Identity,
    Gzip,
    Deflate,
}

impl ContentEncoding {
    /// Map a single coding token to its variant.
    ///
    /// Matching ignores ASCII case and surrounding whitespace; content
    /// codings are case-insensitive tokens.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        let token = token.trim();
        if token.eq_ignore_ascii_case("gzip") {
            Self::Gzip
        } else if token.eq_ignore_ascii_case("deflate") {
            Self::Deflate
        } else {
            Self::Identity
        }
    }

    /// Detect the coding declared by the first `Content-Encoding` header.
    ///
    /// A value that is not visible ASCII is treated like an unknown coding.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(CONTENT_ENCODING)
            .and_then(|value| value.to_str().ok())
            .map_or(Self::Identity, Self::from_token)
    }

    /// The canonical token for this coding.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Gzip => "gzip",
            Self::Deflate => "deflate",
        }
    }

    #[must_use]
    pub fn is_identity(self) -> bool {
        self == Self::Identity
    }
}

impl fmt::Display for ContentEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parsing for user-supplied names (CLI flags, fixtures).
///
/// Unlike [`ContentEncoding::from_token`], unknown names are an error
/// rather than a silent identity fallback.
impl FromStr for ContentEncoding {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gzip" => Ok(Self::Gzip),
            "deflate" | "zlib" => Ok(Self::Deflate),
            "identity" | "none" => Ok(Self::Identity),
            _ => Err(EncodingError::UnknownEncoding(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_ENCODING, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn missing_header_is_identity() {
        assert_eq!(ContentEncoding::from_headers(&HeaderMap::new()), ContentEncoding::Identity);
    }

    #[test]
    fn known_tokens_select_decoders() {
        assert_eq!(ContentEncoding::from_headers(&headers_with("gzip")), ContentEncoding::Gzip);
        assert_eq!(
            ContentEncoding::from_headers(&headers_with("deflate")),
            ContentEncoding::Deflate
        );
    }

    #[test]
    fn token_match_ignores_case_and_whitespace() {
        assert_eq!(ContentEncoding::from_token(" GZip "), ContentEncoding::Gzip);
        assert_eq!(ContentEncoding::from_token("DEFLATE"), ContentEncoding::Deflate);
    }

    #[test]
    fn unknown_and_stacked_codings_fall_back_to_identity() {
        for value in ["br", "zstd", "gzip, br", "x-gzip", "compress", ""] {
            assert_eq!(
                ContentEncoding::from_token(value),
                ContentEncoding::Identity,
                "value {value:?}"
            );
        }
    }

    #[test]
    fn header_name_lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::HeaderName::from_bytes(b"Content-ENCODING").unwrap(),
            HeaderValue::from_static("gzip"),
        );
        assert_eq!(ContentEncoding::from_headers(&headers), ContentEncoding::Gzip);
    }

    #[test]
    fn first_header_value_wins() {
        let mut headers = headers_with("deflate");
        headers.append(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        assert_eq!(ContentEncoding::from_headers(&headers), ContentEncoding::Deflate);
    }

    #[test]
    fn from_str_rejects_unknown_names() {
        assert_eq!("gzip".parse::<ContentEncoding>(), Ok(ContentEncoding::Gzip));
        assert_eq!("zlib".parse::<ContentEncoding>(), Ok(ContentEncoding::Deflate));
        assert_eq!(
            "br".parse::<ContentEncoding>(),
            Err(EncodingError::UnknownEncoding("br".to_string()))
        );
    }

    #[test]
    fn display_uses_canonical_token() {
        assert_eq!(ContentEncoding::Gzip.to_string(), "gzip");
        assert_eq!(ContentEncoding::Identity.to_string(), "identity");
    }
}
