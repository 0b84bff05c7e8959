use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};

use crate::body::Body;
use crate::error::ConstructionError;

/// The transport's view of a received response: status, headers and the
/// still-encoded body stream.
///
/// This is the input handed to
/// [`ResponseMaterializer::new`](crate::ResponseMaterializer::new). Building
/// one performs no I/O.
#[derive(Debug)]
pub struct RawResponse<B> {
    status: StatusCode,
    headers: HeaderMap,
    body: B,
}

impl<B: Body> RawResponse<B> {
    /// Build a response from a numeric status and a prepared header map.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::InvalidStatus`] if `status` is outside
    /// `100..=999`.
    pub fn new(status: u16, headers: HeaderMap, body: B) -> Result<Self, ConstructionError> {
        let status =
            StatusCode::from_u16(status).map_err(|_| ConstructionError::InvalidStatus(status))?;
        Ok(Self {
            status,
            headers,
            body,
        })
    }

    /// Build a response from `(name, value)` header pairs.
    ///
    /// Repeated names are appended, so multi-value headers keep every value
    /// in order.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lazybody::RawResponse;
    ///
    /// let raw = RawResponse::from_parts(
    ///     200,
    ///     [("Content-Type", "text/plain"), ("Set-Cookie", "a=1"), ("Set-Cookie", "b=2")],
    ///     &b"hello"[..],
    /// )
    /// .unwrap();
    /// assert_eq!(raw.headers().get_all("set-cookie").iter().count(), 2);
    /// ```
    ///
    /// # Errors
    ///
    /// - [`ConstructionError::InvalidStatus`] for a status outside `100..=999`.
    /// - [`ConstructionError::InvalidHeaderName`] for a name that is not a
    ///   valid HTTP token.
    /// - [`ConstructionError::InvalidHeaderValue`] for a value containing
    ///   control characters.
    pub fn from_parts<I, K, V>(status: u16, headers: I, body: B) -> Result<Self, ConstructionError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            let name = name.as_ref();
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                ConstructionError::InvalidHeaderName {
                    name: name.to_string(),
                }
            })?;
            let header_value = HeaderValue::from_str(value.as_ref()).map_err(|_| {
                ConstructionError::InvalidHeaderValue {
                    name: name.to_string(),
                }
            })?;
            map.append(header_name, header_value);
        }
        Self::new(status, map, body)
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Split into status, headers and body.
    pub fn into_parts(self) -> (StatusCode, HeaderMap, B) {
        (self.status, self.headers, self.body)
    }
}

impl<B: Body> From<http::Response<B>> for RawResponse<B> {
    fn from(response: http::Response<B>) -> Self {
        let (parts, body) = response.into_parts();
        Self {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }
}
