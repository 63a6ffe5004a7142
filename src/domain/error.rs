//! Domain error types.

/// Top-level error type for navwatch.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("an instrument named {name} or with symbol {symbol} already exists")]
    DuplicateInstrument { name: String, symbol: String },

    #[error("no instrument named {name}")]
    InstrumentNotFound { name: String },

    #[error("invalid instrument: {reason}")]
    InvalidInstrument { reason: String },

    #[error("invalid numeric input for {field}: {value:?}")]
    InvalidNumericInput { field: String, value: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("csv error: {reason}")]
    Csv { reason: String },

    #[error("credential error: {reason}")]
    Credential { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&NavError> for std::process::ExitCode {
    fn from(err: &NavError) -> Self {
        let code: u8 = match err {
            NavError::Io(_) => 1,
            NavError::ConfigParse { .. }
            | NavError::ConfigMissing { .. }
            | NavError::ConfigInvalid { .. } => 2,
            NavError::Csv { .. } | NavError::InvalidNumericInput { .. } => 3,
            NavError::DuplicateInstrument { .. } | NavError::InstrumentNotFound { .. } => 4,
            NavError::InvalidInstrument { .. } => 5,
            NavError::Credential { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}

/// Parse a user-supplied amount (NAV or threshold).
///
/// Blank text is rejected along with anything `f64::from_str` refuses, and so
/// are NaN and infinities: the numeric core only ever sees finite floats.
pub fn parse_amount(field: &str, text: &str) -> Result<f64, NavError> {
    let invalid = || NavError::InvalidNumericInput {
        field: field.to_string(),
        value: text.to_string(),
    };
    let value: f64 = text.trim().parse().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }
    Ok(value)
}
