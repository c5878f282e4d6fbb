use thiserror::Error;

#[derive(Debug, Error)]
pub enum HuffError {
    #[error("input is empty, nothing to compress")]
    EmptyInput,

    #[error("corrupt container: {0}")]
    Corrupt(String),

    #[error("bit sequence matches no code in the table")]
    UnknownCode,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("binary stream: {0}")]
    Stream(#[from] binary_rw::BinaryError),
}
