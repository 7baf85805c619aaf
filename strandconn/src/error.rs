use thiserror::Error;

/// All errors produced by StrandConn itself.
///
/// I/O errors from the composed connections never pass through this type:
/// they are returned to the caller exactly as the backing connection
/// produced them.
#[derive(Debug, Error)]
pub enum StrandConnError {
    #[error("capability bits 0b{0:08b} outside the known set")]
    UnknownCapabilityBits(u8),

    #[error("invalid policy value for {key}: {value:?}")]
    InvalidPolicyValue { key: String, value: String },
}

pub type Result<T> = std::result::Result<T, StrandConnError>;
