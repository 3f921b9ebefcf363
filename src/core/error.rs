use chrono::NaiveDate;
use thiserror::Error;

use super::amount::ArithmeticError;

/// Errors that can occur while computing or transforming a document.
///
/// Computation errors carry the dotted path of the offending element
/// (`lines[2].taxes[0]`). A failure anywhere aborts the whole pass.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CalcError {
    /// Required input is missing or contradictory.
    #[error("malformed input at {path}: {message}")]
    Malformed { path: String, message: String },

    /// A tax combo could not be given a percentage.
    #[error("unresolved tax rate at {path}: {source}")]
    UnresolvedRate {
        path: String,
        #[source]
        source: RateLookupError,
    },

    /// An arithmetic operation would have lost precision or overflowed.
    #[error("precision violation at {path}: {source}")]
    Precision {
        path: String,
        #[source]
        source: ArithmeticError,
    },

    /// Computed totals do not agree with each other.
    #[error("reconciliation failed: {0}")]
    Reconciliation(String),

    /// The tax regime dataset is inconsistent.
    #[error("invalid regime definition: {0}")]
    Regime(String),

    /// Builder encountered invalid or missing configuration.
    #[error("builder error: {0}")]
    Builder(String),
}

impl CalcError {
    pub fn malformed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Adapter for `map_err` on [`Amount`](super::Amount) operations.
    pub fn precision(path: impl Into<String>) -> impl FnOnce(ArithmeticError) -> CalcError {
        let path = path.into();
        move |source| CalcError::Precision { path, source }
    }

    pub fn unresolved(path: impl Into<String>) -> impl FnOnce(RateLookupError) -> CalcError {
        let path = path.into();
        move |source| CalcError::UnresolvedRate { path, source }
    }

    /// Short stable identifier of the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Malformed { .. } => "malformed",
            Self::UnresolvedRate { .. } => "unresolved-rate",
            Self::Precision { .. } => "precision",
            Self::Reconciliation(_) => "reconciliation",
            Self::Regime(_) => "regime",
            Self::Builder(_) => "builder",
        }
    }
}

/// Why a tax rate lookup produced no percentage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateLookupError {
    #[error("unknown tax category '{0}'")]
    UnknownCategory(String),

    #[error("tax category '{category}' has no rate '{key}'")]
    UnknownRate { category: String, key: String },

    #[error("no value of {category}/{key} is effective on {date}")]
    NoValueOn {
        category: String,
        key: String,
        date: NaiveDate,
    },
}

/// A single reconciliation finding with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the inconsistent field (e.g. "totals.payable").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}
