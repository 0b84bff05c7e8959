/// Default ceiling on the decoded body size: 256 MiB.
pub const DEFAULT_MAX_BODY_SIZE: usize = 256 * 1024 * 1024;

/// Configuration for a [`ResponseMaterializer`](crate::ResponseMaterializer).
///
/// ```text
/// ┌────────────────┬──────────┬───────────────────────────────────────────┐
/// │ Field          │ Default  │ Purpose                                   │
/// ├────────────────┼──────────┼───────────────────────────────────────────┤
/// │ max_body_size  │ 256 MiB  │ Upper bound on the *decoded* payload      │
/// │ drain_on_close │ true     │ Read the unread remainder before release  │
/// └────────────────┴──────────┴───────────────────────────────────────────┘
/// ```
///
/// The size limit applies after decompression, so a small gzip body that
/// inflates past the limit fails with
/// [`MaterializeError::BodyTooLarge`](crate::MaterializeError::BodyTooLarge)
/// instead of exhausting memory.
///
/// Draining lets the transport reuse the connection after an early
/// [`close`](crate::ResponseMaterializer::close). Turn it off when the body
/// may be unbounded and the connection is going to be dropped anyway.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaterializeConfig {
    pub max_body_size: usize,
    pub drain_on_close: bool,
}

impl MaterializeConfig {
    /// Replace the decoded size limit.
    #[must_use]
    pub fn max_body_size(mut self, limit: usize) -> Self {
        self.max_body_size = limit;
        self
    }

    #[must_use]
    pub fn drain_on_close(mut self, drain: bool) -> Self {
        self.drain_on_close = drain;
        self
    }
}

impl Default for MaterializeConfig {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            drain_on_close: true,
        }
    }
}
