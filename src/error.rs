use thiserror::Error;

/// Errors surfaced by the NTRU engine.
///
/// Every fallible operation in this crate returns one of these variants;
/// the CLI binary is the only place they are formatted for a human.
#[derive(Debug, Error)]
pub enum NtruError {
    #[error("parameter invalid: {0}")]
    ParameterInvalid(String),

    #[error("key generation failed: no invertible f found in {0} attempts")]
    KeygenFailed(u32),

    #[error("input too long: ciphertext block has degree >= N")]
    InputTooLong,

    #[error("framing error: {0}")]
    FramingError(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NtruError>;
