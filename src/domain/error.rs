//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for quantdash.
#[derive(Debug, thiserror::Error)]
pub enum QuantdashError {
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error("portfolio value series too short: have {points} points, need at least 2")]
    EmptySeries { points: usize },

    #[error("malformed bar {index} ({date}): {reason}")]
    MalformedBar {
        index: usize,
        date: NaiveDate,
        reason: String,
    },

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

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

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl QuantdashError {
    pub(crate) fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        QuantdashError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn config_invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        QuantdashError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&QuantdashError> for std::process::ExitCode {
    fn from(err: &QuantdashError) -> Self {
        let code: u8 = match err {
            QuantdashError::Io(_) | QuantdashError::Json(_) => 1,
            QuantdashError::ConfigParse { .. }
            | QuantdashError::ConfigMissing { .. }
            | QuantdashError::ConfigInvalid { .. }
            | QuantdashError::UnknownStrategy { .. } => 2,
            QuantdashError::Data { .. } => 3,
            QuantdashError::InvalidParameter { .. } | QuantdashError::MalformedBar { .. } => 4,
            QuantdashError::NoData { .. }
            | QuantdashError::InsufficientData { .. }
            | QuantdashError::EmptySeries { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_bar_message_includes_position() {
        let err = QuantdashError::MalformedBar {
            index: 3,
            date: NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
            reason: "negative volume".into(),
        };
        assert_eq!(err.to_string(), "malformed bar 3 (2024-01-04): negative volume");
    }

    #[test]
    fn insufficient_data_message() {
        let err = QuantdashError::InsufficientData { bars: 1, minimum: 2 };
        assert_eq!(err.to_string(), "insufficient data: have 1 bars, need 2");
    }

    #[test]
    fn invalid_parameter_helper() {
        let err = QuantdashError::invalid_parameter("initial_cash", "must be positive");
        assert!(matches!(
            err,
            QuantdashError::InvalidParameter { ref name, .. } if name == "initial_cash"
        ));
    }
}
