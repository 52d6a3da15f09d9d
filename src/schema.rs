use crate::classifier::ClassifierRules;
use crate::error::{ExpenseAnalysisError, Result};
use crate::utils::month_name;
use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

pub const EXPECTED_COLUMNS: [&str; 4] = ["date", "description", "category", "value"];

pub const DEFAULT_ROLLING_WINDOW: usize = 3;

pub const DEFAULT_VERIFICATION_TOLERANCE: f64 = 0.01;

/// One cell of an uploaded table, before any type coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Empty,
}

impl RawValue {
    /// String form used for currency detection and text coercion.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            RawValue::Text(s) => Cow::Borrowed(s.as_str()),
            RawValue::Number(n) => Cow::Owned(n.to_string()),
            RawValue::Date(d) => Cow::Owned(d.format("%Y-%m-%d").to_string()),
            RawValue::Empty => Cow::Borrowed(""),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<NaiveDate> for RawValue {
    fn from(value: NaiveDate) -> Self {
        RawValue::Date(value)
    }
}

static EMPTY_CELL: RawValue = RawValue::Empty;

/// A header row plus data rows, exactly as read from the upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<RawValue>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<RawValue>>) -> Self {
        Self { columns, rows }
    }

    pub fn with_columns<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row<V: Into<RawValue>>(&mut self, row: impl IntoIterator<Item = V>) {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Missing trailing cells of a ragged row read as `Empty`.
    pub fn cell(&self, row: usize, column: usize) -> &RawValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn column(&self, column: usize) -> impl Iterator<Item = &RawValue> + '_ {
        (0..self.rows.len()).map(move |row| self.cell(row, column))
    }
}

/// Calendar year-month bucket. Orders by year, then month.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(try_from = "PeriodFields")]
pub struct Period {
    year: i32,
    #[schemars(range(min = 1, max = 12))]
    month: u32,
}

/// Unchecked wire form of [`Period`].
#[derive(Deserialize, JsonSchema)]
struct PeriodFields {
    year: i32,
    #[schemars(range(min = 1, max = 12))]
    month: u32,
}

impl TryFrom<PeriodFields> for Period {
    type Error = ExpenseAnalysisError;

    fn try_from(fields: PeriodFields) -> Result<Self> {
        Period::new(fields.year, fields.month).ok_or_else(|| {
            ExpenseAnalysisError::InvalidPeriod(format!("{}-{:02}", fields.year, fields.month))
        })
    }
}

impl Period {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Full month name and 4-digit year, e.g. "January 2026".
    pub fn label(&self) -> String {
        format!(
            "{} {:04}",
            month_name(self.month).unwrap_or_default(),
            self.year
        )
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for Period {
    type Err = ExpenseAnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        crate::utils::parse_period_string(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Transaction {
    pub date: NaiveDate,

    pub description: String,

    pub category: String,

    #[schemars(description = "Signed amount: positive is income, negative is an expense")]
    pub value: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Finer-grained label assigned by keyword classification")]
    pub subcategory: Option<String>,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        category: impl Into<String>,
        value: f64,
    ) -> Self {
        Self {
            date,
            description: description.into(),
            category: category.into(),
            value,
            subcategory: None,
        }
    }

    pub fn period(&self) -> Period {
        Period::from_date(self.date)
    }

    pub fn is_expense(&self) -> bool {
        self.value < 0.0
    }

    pub fn is_income(&self) -> bool {
        self.value > 0.0
    }
}

/// Transactions that passed validation and currency normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TransactionSet {
    pub transactions: Vec<Transaction>,

    #[schemars(description = "The single currency symbol stripped from the value column, if any")]
    pub currency_symbol: Option<char>,
}

impl TransactionSet {
    pub fn new(transactions: Vec<Transaction>, currency_symbol: Option<char>) -> Self {
        Self {
            transactions,
            currency_symbol,
        }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn as_slice(&self) -> &[Transaction] {
        &self.transactions
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MonthlyAggregate {
    pub period: Period,

    #[schemars(description = "Sum of positive values in the period")]
    pub total_income: f64,

    #[schemars(description = "Absolute sum of negative values in the period")]
    pub total_expenses: f64,

    #[schemars(description = "Sum of all values in the period (income minus expenses)")]
    pub net_income: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryAggregate {
    pub period: Period,
    pub category: String,
    #[schemars(description = "Absolute sum of expenses for this period and category")]
    pub spending: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SubcategoryAggregate {
    pub subcategory: String,
    pub amount: f64,
    #[schemars(description = "Share of the filtered category total, 0 to 100")]
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RollingAveragePoint {
    pub period: Period,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MonthHighlight {
    #[schemars(description = "Month label such as 'January 2026'")]
    pub month: String,
    pub net_income: f64,
    pub period: Period,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FinancialMetrics {
    pub current_balance: f64,
    pub average_monthly_savings: f64,
    pub best_month: MonthHighlight,
    pub worst_month: MonthHighlight,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AnalysisConfig {
    #[schemars(
        description = "Number of trailing months with recorded expenses averaged together. Must be at least 1."
    )]
    pub rolling_window: usize,

    #[schemars(
        description = "Allowed absolute difference when checking net_income == total_income - total_expenses."
    )]
    pub verification_tolerance: f64,

    #[schemars(description = "Ordered category dispatch and keyword rules for subcategories")]
    pub classifier: ClassifierRules,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            rolling_window: DEFAULT_ROLLING_WINDOW,
            verification_tolerance: DEFAULT_VERIFICATION_TOLERANCE,
            classifier: ClassifierRules::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        validate_rolling_window(self.rolling_window)?;
        if !self.verification_tolerance.is_finite() || self.verification_tolerance < 0.0 {
            return Err(ExpenseAnalysisError::InvalidTolerance(
                self.verification_tolerance,
            ));
        }
        Ok(())
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AnalysisConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

pub fn validate_rolling_window(window: usize) -> Result<()> {
    if window == 0 {
        return Err(ExpenseAnalysisError::InvalidRollingWindow(window));
    }
    Ok(())
}
