//! Error types for the configuration bootstrap.

use thiserror::Error;

/// Errors raised while building a [`Configuration`](crate::config::Configuration)
/// from a declarative document.
///
/// Section-level failures are wrapped once at the top of the parse into
/// [`BuildError::Parse`], so callers see a single failure mode with the
/// original cause preserved underneath.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("each configuration builder can only be used once")]
    AlreadyParsed,

    #[error("the setting '{0}' is not known. Make sure you spelled it correctly (case sensitive)")]
    UnknownSetting(String),

    #[error("invalid value '{value}' for setting '{key}': {reason}")]
    InvalidSetting {
        key: String,
        value: String,
        reason: String,
    },

    #[error("schema error: {0}")]
    Schema(String),

    #[error("error in {section}: cannot resolve type '{type_name}': {reason}")]
    Resolution {
        section: String,
        type_name: String,
        reason: String,
    },

    #[error("cannot load '{resource}': {reason}")]
    Resource { resource: String, reason: String },

    #[error("environment error: {0}")]
    Environment(String),

    #[error("alias '{alias}' is already registered for '{existing}', refusing '{requested}'")]
    DuplicateAlias {
        alias: String,
        existing: String,
        requested: String,
    },

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("error building configuration: {cause}")]
    Parse {
        #[source]
        cause: Box<BuildError>,
    },
}

impl BuildError {
    /// Unwrap top-level [`BuildError::Parse`] wrapping down to the section
    /// error that actually failed the build.
    pub fn root_cause(&self) -> &BuildError {
        match self {
            BuildError::Parse { cause } => cause.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_cause_unwraps_parse_wrapping() {
        let err = BuildError::Parse {
            cause: Box::new(BuildError::UnknownSetting("cacheSize".to_string())),
        };
        assert!(matches!(
            err.root_cause(),
            BuildError::UnknownSetting(key) if key == "cacheSize"
        ));
    }

    #[test]
    fn test_unwrapped_error_is_its_own_root() {
        let err = BuildError::Environment("no default environment specified".to_string());
        assert!(matches!(err.root_cause(), BuildError::Environment(_)));
    }
}
