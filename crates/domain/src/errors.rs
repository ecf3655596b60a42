use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid probe size: {0} (expected four decimal digits, 1000-9999)")]
    InvalidProbeSize(u32),

    #[error("Invalid probe size text: {0}")]
    InvalidProbeSizeText(String),

    #[error("Invalid marker digit: {0:?}")]
    InvalidMarkerDigit(char),

    #[error("Invalid marker label: {0}")]
    InvalidMarkerLabel(String),
}
