use std::path::PathBuf;

use thiserror::Error;

use crate::app::models::TaskId;

// Returned by the `FromStr` impls of the task enums
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized value `{0}`")]
pub struct UnknownVariant(pub String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    #[error("task title cannot be empty")]
    EmptyTitle,

    #[error("estimated time must be at least one minute")]
    ZeroEstimate,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("configuration error")]
    Config(#[from] ConfigError),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("terminal io error")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::Priority;
    use pretty_assertions::assert_eq;

    fn read_config(path: &str) -> Result<(), AppError> {
        let parsed: Result<(), ConfigError> =
            Err(ConfigError::Invalid(format!("{path}: tick_rate_ms must be positive")));
        parsed?;
        Ok(())
    }

    fn open_terminal() -> Result<(), AppError> {
        let opened: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "no tty"));
        opened?;
        Ok(())
    }

    #[test]
    fn startup_failures_convert_into_app_error() {
        assert!(matches!(
            read_config("task_dashboard.toml"),
            Err(AppError::Config(ConfigError::Invalid(_)))
        ));
        assert!(matches!(open_terminal(), Err(AppError::Io(_))));
    }

    #[test]
    fn unknown_variant_names_the_value() {
        let err = "someday".parse::<Priority>().unwrap_err();
        assert_eq!(err, UnknownVariant("someday".to_string()));
        assert_eq!(err.to_string(), "unrecognized value `someday`");
    }
}
