use thiserror::Error;

/// Caller input that was rejected before any remote call was made.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("Missing {0}")]
    Missing(&'static str),
    #[error("card id `{0}` must not contain the `-` separator")]
    CardIdSeparator(String),
    #[error("`{0}` is not a valid wallet address")]
    InvalidEthAddress(String),
    #[error("`{0}` is not a valid serial number")]
    InvalidSerialNumber(String),
    #[error("unsupported platform `{0}`")]
    UnsupportedPlatform(String),
}

/// Treats `None` and blank strings alike, the way form input arrives.
pub(crate) fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, ValidationError> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ValidationError::Missing(field)),
    }
}
