use crate::schema::Period;
use thiserror::Error;

pub const MULTIPLE_CURRENCIES_MESSAGE: &str =
    "Multiple currencies detected. Please ensure all values use the same currency.";

/// Broad cause of a failure, for callers that route errors by category
/// rather than by variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Wrong column count, names or order.
    Structural,
    /// Empty dataset, unparseable dates or values.
    Content,
    /// More than one distinct currency symbol in the value column.
    CurrencyConflict,
    /// An operation was handed an empty transaction set or summary.
    EmptyInput,
    Configuration,
    /// Derived views disagree with each other.
    Integrity,
    Io,
}

#[derive(Error, Debug)]
pub enum ExpenseAnalysisError {
    #[error("File must have exactly 4 columns (found {0})")]
    ColumnCount(usize),

    #[error("Columns must be: date, description, category, value (found: {})", .0.join(", "))]
    ColumnNames(Vec<String>),

    #[error("File is empty or contains only header row")]
    EmptyDataset,

    #[error("Invalid dates found in date column")]
    InvalidDates { rows: Vec<usize> },

    #[error("Invalid numeric values found in value column")]
    InvalidValues { rows: Vec<usize> },

    #[error("Invalid period '{0}': expected YYYY-MM")]
    InvalidPeriod(String),

    #[error("{}", MULTIPLE_CURRENCIES_MESSAGE)]
    MultipleCurrencies { symbols: Vec<char> },

    #[error("Transaction set cannot be empty")]
    EmptyTransactions,

    #[error("Monthly summary cannot be empty: no months to compare")]
    EmptyMonthlySummary,

    #[error("Invalid rolling window {0}: must be at least 1")]
    InvalidRollingWindow(usize),

    #[error("Invalid verification tolerance {0}: must be a finite, non-negative number")]
    InvalidTolerance(f64),

    #[error("Monthly summary identity violated for {period}: income ({total_income}) - expenses ({total_expenses}) != net ({net_income}), difference {difference}")]
    SummaryIdentityViolation {
        period: Period,
        total_income: f64,
        total_expenses: f64,
        net_income: f64,
        difference: f64,
    },

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ExpenseAnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ColumnCount(_) | Self::ColumnNames(_) => ErrorKind::Structural,
            Self::EmptyDataset
            | Self::InvalidDates { .. }
            | Self::InvalidValues { .. }
            | Self::InvalidPeriod(_) => ErrorKind::Content,
            Self::MultipleCurrencies { .. } => ErrorKind::CurrencyConflict,
            Self::EmptyTransactions | Self::EmptyMonthlySummary => ErrorKind::EmptyInput,
            Self::InvalidRollingWindow(_) | Self::InvalidTolerance(_) => ErrorKind::Configuration,
            Self::SummaryIdentityViolation { .. } => ErrorKind::Integrity,
            Self::CsvError(_) | Self::SerializationError(_) | Self::IoError(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExpenseAnalysisError>;
