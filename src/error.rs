//! Error types for Rocketdoo

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("Invalid answer for '{question}': {message}")]
    Validation { question: String, message: String },

    #[error("Missing answer for required question '{0}'")]
    IncompleteAnswer(String),

    #[error("Template '{template}' references unknown key '{key}'")]
    TemplateBinding { template: String, key: String },

    #[error("Dependency target '{0}' is already declared in the manifest")]
    DuplicateTarget(String),

    #[error("Invalid manifest entry: {0}")]
    InvalidEntry(String),

    #[error("{failed} of {total} dependencies could not be fetched")]
    FetchFailure { failed: usize, total: usize },

    #[error("Dependency installation failed for: {}. Re-run with --force to continue anyway", .0.join(", "))]
    DependencyInstall(Vec<String>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External command error: {0}")]
    Collaborator(String),

    #[error("Operation interrupted")]
    Interrupted,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ScaffoldError {
    pub fn validation(question: &str, message: impl Into<String>) -> Self {
        ScaffoldError::Validation {
            question: question.to_string(),
            message: message.into(),
        }
    }

    /// Whether the wizard may re-prompt after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ScaffoldError::Validation { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScaffoldError>;
