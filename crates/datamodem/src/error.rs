use thiserror::Error;

/// An error raised while decoding a stream.
///
/// The first error latches the decoder into its terminal state: it is
/// reported once from `read`, subsequent `read` calls become no-ops, and
/// `finish` returns the same error again. The partially built tree at
/// the point of the error is left as-is (memory-safe, contents
/// unspecified).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// A byte that no grammar rule accepts in the current state.
    #[error("unexpected token byte 0x{0:02x}")]
    UnexpectedToken(u8),
    /// The stream ended in the middle of a token or with open containers.
    #[error("input ended in the middle of a value")]
    TruncatedInput,
    /// A container was used where a map key is required.
    #[error("container values cannot be used as map keys")]
    InvalidContainerKey,
    /// A container close token with no matching open container.
    #[error("container close without an open container")]
    UnbalancedContainerClose,
    /// An integer magnitude that does not fit the tree's `i64` node.
    #[error("integer magnitude out of range")]
    IntegerOverflow,
    /// A malformed escape sequence in a text string literal.
    #[error("invalid escape sequence")]
    InvalidEscape,
    /// A char-string payload that is not valid UTF-8.
    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,
    /// A single token longer than the configured buffering limit.
    #[error("token of {required} bytes exceeds the {limit} byte limit")]
    LimitExceeded { required: u64, limit: usize },
}
