/// Configuration shared by both decoders.
///
/// # Examples
///
/// ```rust
/// use datamodem::{CborDecoder, DecoderOptions};
///
/// let dec = CborDecoder::with_options(DecoderOptions {
///     max_literal_bytes: 64 * 1024,
/// });
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DecoderOptions {
    /// Upper bound, in bytes, on any single buffered token: a string
    /// payload, a number literal, or the accumulated payload of an
    /// indefinite-length string. A stream declaring (or accumulating) a
    /// longer token fails with [`DecodeError::LimitExceeded`] instead of
    /// growing without bound.
    ///
    /// # Default
    ///
    /// 16 MiB.
    ///
    /// [`DecodeError::LimitExceeded`]: crate::DecodeError::LimitExceeded
    pub max_literal_bytes: usize,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            max_literal_bytes: 16 * 1024 * 1024,
        }
    }
}
