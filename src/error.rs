//! Error types for the learning-curve harness

use std::fmt;
use thiserror::Error;

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, CurveError>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum CurveError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Degenerate feature in column {column}: {reason}")]
    DegenerateFeature { column: usize, reason: String },

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Convergence failed after {iterations} iterations")]
    ConvergenceError { iterations: usize },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("{context}: {source}")]
    InContext {
        context: EvalContext,
        #[source]
        source: Box<CurveError>,
    },
}

/// Coarse error taxonomy used for reporting and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Data,
    DegenerateFeature,
    UpstreamModel,
    Io,
}

/// Where in the nested protocol an error was raised
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvalContext {
    pub repetition: Option<usize>,
    pub fraction: Option<f64>,
    pub fold: Option<usize>,
    pub configuration: Option<String>,
}

impl EvalContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repetition(mut self, rep: usize) -> Self {
        self.repetition = Some(rep);
        self
    }

    pub fn fraction(mut self, fraction: f64) -> Self {
        self.fraction = Some(fraction);
        self
    }

    pub fn fold(mut self, fold: usize) -> Self {
        self.fold = Some(fold);
        self
    }

    pub fn configuration(mut self, configuration: impl Into<String>) -> Self {
        self.configuration = Some(configuration.into());
        self
    }

    /// Fill fields that are unset here from `outer`
    fn merge(&mut self, outer: EvalContext) {
        self.repetition = self.repetition.or(outer.repetition);
        self.fraction = self.fraction.or(outer.fraction);
        self.fold = self.fold.or(outer.fold);
        if self.configuration.is_none() {
            self.configuration = outer.configuration;
        }
    }
}

impl fmt::Display for EvalContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(rep) = self.repetition {
            parts.push(format!("repetition={}", rep));
        }
        if let Some(fraction) = self.fraction {
            parts.push(format!("fraction={}", fraction));
        }
        if let Some(fold) = self.fold {
            parts.push(format!("fold={}", fold));
        }
        if let Some(config) = &self.configuration {
            parts.push(format!("configuration={}", config));
        }
        write!(f, "[{}]", parts.join(" "))
    }
}

impl CurveError {
    /// Attach protocol context, merging with any context already present
    pub fn with_context(self, context: EvalContext) -> Self {
        match self {
            CurveError::InContext { context: mut inner, source } => {
                inner.merge(context);
                CurveError::InContext { context: inner, source }
            }
            other => CurveError::InContext {
                context,
                source: Box::new(other),
            },
        }
    }

    /// The context this error was raised in, if any
    pub fn context(&self) -> Option<&EvalContext> {
        match self {
            CurveError::InContext { context, .. } => Some(context),
            _ => None,
        }
    }

    /// The error with any context wrapper removed
    pub fn root(&self) -> &CurveError {
        match self {
            CurveError::InContext { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self.root() {
            CurveError::ConfigError(_) | CurveError::InvalidParameter { .. } => {
                ErrorCategory::Configuration
            }
            CurveError::DataError(_)
            | CurveError::FeatureNotFound(_)
            | CurveError::ShapeError { .. } => ErrorCategory::Data,
            CurveError::DegenerateFeature { .. } => ErrorCategory::DegenerateFeature,
            CurveError::ModelError(_)
            | CurveError::ConvergenceError { .. }
            | CurveError::ModelNotFitted => ErrorCategory::UpstreamModel,
            CurveError::IoError(_) | CurveError::SerializationError(_) => ErrorCategory::Io,
            CurveError::InContext { .. } => unreachable!("root() strips context"),
        }
    }
}

/// Extension for attaching [`EvalContext`] to results
pub trait ResultExt<T> {
    fn in_context(self, context: impl FnOnce() -> EvalContext) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn in_context(self, context: impl FnOnce() -> EvalContext) -> Result<T> {
        self.map_err(|e| e.with_context(context()))
    }
}

impl From<polars::error::PolarsError> for CurveError {
    fn from(err: polars::error::PolarsError) -> Self {
        CurveError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for CurveError {
    fn from(err: serde_json::Error) -> Self {
        CurveError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for CurveError {
    fn from(err: ndarray::ShapeError) -> Self {
        CurveError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
