use std::path::PathBuf;

use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] tickrange_core::ValidationError),

    #[error("{0}; please enter at least one stock ticker")]
    Batch(#[from] tickrange_core::BatchError),

    #[error("config file '{}': {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error("failed to format timestamp: {0}")]
    Timestamp(#[from] time::error::Format),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::Batch(_) => 2,
            Self::Serialization(_) => 4,
            Self::Config { .. } => 7,
            Self::Timestamp(_) | Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_a_usage_error() {
        let error = CliError::from(tickrange_core::BatchError::EmptyInput);

        assert_eq!(error.exit_code(), 2);
        assert!(error.to_string().contains("at least one stock ticker"));
    }

    #[test]
    fn config_errors_name_the_file() {
        let error = CliError::Config {
            path: PathBuf::from("/etc/tickrange.toml"),
            message: String::from("unknown field"),
        };

        assert_eq!(error.exit_code(), 7);
        assert_eq!(
            error.to_string(),
            "config file '/etc/tickrange.toml': unknown field"
        );
    }
}
