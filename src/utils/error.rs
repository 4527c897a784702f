use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdvisoryError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Missing score component: {component}")]
    MissingComponent { component: String },

    #[error("Template not found: {id}")]
    TemplateNotFound { id: String },

    #[error("Template '{template}' requires variable '{variable}'")]
    MissingTemplateVariable { template: String, variable: String },

    #[error("Unknown {kind}: '{value}'")]
    UnknownVariant { kind: String, value: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

/// 錯誤分類，用於日誌與診斷
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Data,
    Configuration,
    Template,
    Processing,
}

/// 錯誤嚴重程度，CLI 依此決定退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AdvisoryError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AdvisoryError::IoError(_) => ErrorCategory::Io,
            AdvisoryError::SerializationError(_) | AdvisoryError::CsvError(_) => {
                ErrorCategory::Data
            }
            AdvisoryError::ConfigValidationError { .. }
            | AdvisoryError::InvalidConfigValueError { .. }
            | AdvisoryError::MissingConfigError { .. }
            | AdvisoryError::UnknownVariant { .. } => ErrorCategory::Configuration,
            AdvisoryError::TemplateNotFound { .. }
            | AdvisoryError::MissingTemplateVariable { .. } => ErrorCategory::Template,
            AdvisoryError::MissingComponent { .. } | AdvisoryError::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AdvisoryError::IoError(_) => ErrorSeverity::Critical,
            AdvisoryError::SerializationError(_) | AdvisoryError::CsvError(_) => {
                ErrorSeverity::High
            }
            AdvisoryError::ConfigValidationError { .. }
            | AdvisoryError::InvalidConfigValueError { .. }
            | AdvisoryError::MissingConfigError { .. }
            | AdvisoryError::UnknownVariant { .. } => ErrorSeverity::High,
            AdvisoryError::TemplateNotFound { .. }
            | AdvisoryError::MissingTemplateVariable { .. } => ErrorSeverity::Medium,
            AdvisoryError::MissingComponent { .. } => ErrorSeverity::Medium,
            AdvisoryError::ProcessingError { .. } => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            AdvisoryError::IoError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
            AdvisoryError::SerializationError(_) => {
                "Verify the JSON input is well-formed".to_string()
            }
            AdvisoryError::CsvError(_) => "Check the dashboard output path".to_string(),
            AdvisoryError::ConfigValidationError { field, .. } => {
                format!("Review the '{}' section of the configuration file", field)
            }
            AdvisoryError::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of '{}' and try again", field)
            }
            AdvisoryError::MissingConfigError { field } => {
                format!("Add '{}' to the configuration file", field)
            }
            AdvisoryError::MissingComponent { component } => format!(
                "Provide '{}' explicitly or set scoring.strict = false to use the neutral default",
                component
            ),
            AdvisoryError::TemplateNotFound { .. } => {
                "Register the template before generating prompts".to_string()
            }
            AdvisoryError::MissingTemplateVariable { variable, .. } => {
                format!("Supply a value for '{}'", variable)
            }
            AdvisoryError::UnknownVariant { kind, .. } => {
                format!("Use one of the supported {} values", kind)
            }
            AdvisoryError::ProcessingError { .. } => {
                "Inspect the input data with --verbose for details".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Io => format!("Could not read or write a file: {}", self),
            ErrorCategory::Data => format!("Could not encode or decode data: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Template => format!("Prompt template problem: {}", self),
            ErrorCategory::Processing => format!("Analysis failed: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, AdvisoryError>;
