use cooper_core::{ConfigurationError, CoopError};
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum HostError {
    #[error("class `{name}` is already defined")]
    #[diagnostic(code(cooper::host::duplicate_class))]
    DuplicateClass { name: String },

    #[error("no class named `{name}`")]
    #[diagnostic(code(cooper::host::unknown_class))]
    UnknownClass { name: String },

    #[error("host settings: {message}")]
    #[diagnostic(code(cooper::host::settings))]
    Settings { message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Coop(#[from] CoopError),
}

impl From<ConfigurationError> for HostError {
    fn from(e: ConfigurationError) -> Self {
        HostError::Coop(e.into())
    }
}

impl HostError {
    pub fn coop(&self) -> Option<&CoopError> {
        match self {
            HostError::Coop(e) => Some(e),
            _ => None,
        }
    }

    /// Reason code of a composition failure, if this is one.
    pub fn configuration_code(&self) -> Option<&'static str> {
        self.coop()
            .and_then(CoopError::configuration)
            .map(ConfigurationError::reason_code)
    }
}
