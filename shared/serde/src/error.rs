use thiserror::Error;

/// Errors that can occur while encoding or decoding packet bodies
///
/// Decoding never treats a short buffer as end-of-stream: running out of
/// bytes in the middle of a value is always reported as `Truncated`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// The input ended before a value was fully read
    #[error("Truncated input: needed {needed} bytes but only {remaining} remain")]
    Truncated { needed: usize, remaining: usize },

    /// A VarInt kept its continuation bit set past the maximum width
    #[error("VarInt is longer than {max_bytes} bytes")]
    VarIntTooLong { max_bytes: usize },

    /// A length prefix decoded to a negative number
    #[error("Invalid negative length prefix {length}")]
    NegativeLength { length: i32 },

    /// A string exceeds the protocol's maximum character count
    #[error("String of {length} characters exceeds the maximum of {max}")]
    StringTooLong { length: usize, max: usize },

    /// A string payload was not valid UTF-8
    #[error("String payload is not valid UTF-8")]
    InvalidUtf8,

    /// A frame carried a packet id other than the one expected
    #[error("Unexpected packet id {found:#04x}, expected {expected:#04x}")]
    UnexpectedPacketId { expected: i32, found: i32 },

    /// A frame declared a length that disagrees with its body
    #[error("Frame declared {declared} bytes but the body holds {actual}")]
    FrameLengthMismatch { declared: usize, actual: usize },

    /// A metadata entry named a serializer this revision does not define
    #[error("Unknown metadata serializer id {id}")]
    UnknownSerializer { id: i32 },

    /// The value is well formed but cannot be represented here
    #[error("Unsupported {what}")]
    Unsupported { what: &'static str },
}
