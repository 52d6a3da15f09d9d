//! # Expense Analyzer
//!
//! A library for turning an uploaded table of bank transactions into the
//! views an expense dashboard needs: balance, monthly income and expenses,
//! category and subcategory spending, rolling spending trends and best/worst
//! months.
//!
//! ## Core Concepts
//!
//! - **Raw table**: the header and cells exactly as uploaded
//! - **Canonical transaction set**: rows that passed the strict
//!   `date, description, category, value` contract, with at most one
//!   currency symbol stripped from the values
//! - **Period**: a calendar (year, month) bucket used for every monthly view
//! - **Subcategory**: a finer label derived from the description by ordered
//!   keyword rules
//!
//! Every operation is a pure, synchronous transformation of its input.
//!
//! ## Example
//!
//! ```rust,ignore
//! use expense_analyzer::*;
//!
//! let csv = "date,description,category,value\n\
//!            2026-01-15,Grocery Store,Groceries,$-120.50\n\
//!            2026-01-30,Monthly Salary,Salary,$3000.00\n";
//!
//! let table = read_csv(csv.as_bytes())?;
//! let report = analyze_table(&table)?;
//!
//! assert_eq!(report.currency_symbol, Some('$'));
//! assert_eq!(report.metrics.best_month.month, "January 2026");
//! ```

pub mod aggregation;
pub mod classifier;
pub mod currency;
pub mod error;
pub mod ingestion;
pub mod metrics;
pub mod report;
pub mod schema;
pub mod utils;
pub mod validation;

pub use aggregation::{
    calculate_category_breakdown, calculate_default_rolling_average, calculate_monthly_summary,
    calculate_rolling_average, verify_monthly_summary, Aggregator,
};
pub use classifier::{
    all_category_breakdowns, calculate_subcategory_breakdown, classify_transactions,
    CategoryRoute, ClassifierRules, KeywordRule, RuleSet,
};
pub use currency::{
    detect_currency_symbol, normalize_currency_column, strip_currency_symbols, CURRENCY_SYMBOLS,
};
pub use error::{ErrorKind, ExpenseAnalysisError, Result};
pub use ingestion::{read_csv, read_csv_path};
pub use metrics::{calculate_financial_metrics, current_balance};
pub use report::AnalysisReport;
pub use schema::*;
pub use validation::validate_table;

use log::{debug, info};
use std::io::Read;

#[derive(Debug, Default)]
pub struct ExpenseAnalyzer {
    config: AnalysisConfig,
}

impl ExpenseAnalyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn process(&self, table: &RawTable) -> Result<AnalysisReport> {
        info!(
            "Analyzing uploaded table with {} columns and {} rows",
            table.column_count(),
            table.row_count()
        );

        let set = validate_table(table)?;
        self.analyze(&set)
    }

    /// Builds every view from an already validated transaction set.
    pub fn analyze(&self, set: &TransactionSet) -> Result<AnalysisReport> {
        let transactions = set.as_slice();
        let aggregator = Aggregator::new(transactions);

        let monthly_summary = aggregator.monthly_summary();
        verify_monthly_summary(&monthly_summary, self.config.verification_tolerance)?;

        let category_breakdown = aggregator.category_breakdown();
        let rolling_average = aggregator.rolling_average(self.config.rolling_window)?;

        let subcategory_breakdowns = self
            .config
            .classifier
            .all_category_breakdowns(transactions)?;

        let metrics = calculate_financial_metrics(transactions, &monthly_summary)?;

        debug!(
            "Built {} monthly rows, {} category rows, {} rolling points, {} subcategory breakdowns",
            monthly_summary.len(),
            category_breakdown.len(),
            rolling_average.len(),
            subcategory_breakdowns.len()
        );
        info!(
            "Analysis complete: {} transactions, balance {:.2}",
            set.len(),
            metrics.current_balance
        );

        Ok(AnalysisReport {
            currency_symbol: set.currency_symbol,
            transaction_count: set.len(),
            monthly_summary,
            category_breakdown,
            rolling_average,
            subcategory_breakdowns,
            metrics,
        })
    }

    pub fn process_csv<R: Read>(&self, reader: R) -> Result<AnalysisReport> {
        let table = read_csv(reader)?;
        self.process(&table)
    }
}

pub fn analyze_table(table: &RawTable) -> Result<AnalysisReport> {
    ExpenseAnalyzer::default().process(table)
}

pub fn analyze_with_config(table: &RawTable, config: AnalysisConfig) -> Result<AnalysisReport> {
    ExpenseAnalyzer::new(config)?.process(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> RawTable {
        let mut table = RawTable::with_columns(EXPECTED_COLUMNS);
        table.push_row(["2026-01-05", "Monthly Salary", "Salary", "€2500.00"]);
        table.push_row(["2026-01-10", "Grocery Store", "Groceries", "€-95.50"]);
        table.push_row(["2026-01-25", "Bus Fare", "Transport", "€-38.00"]);
        table.push_row(["2026-02-02", "Grocery Store", "Groceries", "€-115.00"]);
        table.push_row(["2026-02-05", "Restaurant", "Dining", "€-52.50"]);
        table.push_row(["2026-02-10", "Monthly Salary", "Salary", "€2500.00"]);
        table.push_row(["2026-03-01", "Gas Station", "Transport", "€-40.00"]);
        table
    }

    #[test]
    fn test_end_to_end_processing() {
        let report = analyze_table(&sample_table()).unwrap();

        assert_eq!(report.currency_symbol, Some('€'));
        assert_eq!(report.transaction_count, 7);
        assert_eq!(report.monthly_summary.len(), 3);
        assert_eq!(report.rolling_average.len(), 1);
        assert_eq!(
            report.rolling_average[0].period,
            Period::new(2026, 3).unwrap()
        );

        assert_eq!(report.metrics.best_month.month, "January 2026");
        assert_eq!(report.metrics.worst_month.month, "March 2026");
        assert!((report.metrics.current_balance - 4659.0).abs() < 1e-9);

        let transport = report.breakdown_for("Transport").unwrap();
        assert_eq!(transport[0].subcategory, "Private Transportation");
        assert!(report.breakdown_for("Salary").is_none());
    }

    #[test]
    fn test_large_values_pass_summary_verification() {
        let mut table = RawTable::with_columns(EXPECTED_COLUMNS);
        table.push_row(["2026-01-01", "Refund", "Other", "3"]);
        table.push_row(["2026-01-02", "Coffee", "Dining", "-1"]);
        table.push_row(["2026-01-03", "Windfall", "Income", "10000000000000000"]);

        let report = analyze_table(&table).unwrap();
        let month = &report.monthly_summary[0];
        assert_eq!(month.total_expenses, 1.0);
        assert_eq!(month.net_income, month.total_income - month.total_expenses);
    }

    #[test]
    fn test_custom_rolling_window() {
        let config = AnalysisConfig {
            rolling_window: 2,
            ..AnalysisConfig::default()
        };
        let report = analyze_with_config(&sample_table(), config).unwrap();
        assert_eq!(report.rolling_average.len(), 2);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = AnalysisConfig {
            rolling_window: 0,
            ..AnalysisConfig::default()
        };
        assert!(ExpenseAnalyzer::new(config).is_err());
    }

    #[test]
    fn test_validation_errors_propagate() {
        let mut table = RawTable::with_columns(["date", "description", "value"]);
        table.push_row(["2026-01-05", "Salary", "100"]);
        let err = analyze_table(&table).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
    }

    #[test]
    fn test_report_serializes() {
        let report = analyze_table(&sample_table()).unwrap();
        let json = report.to_json().unwrap();
        assert!(json.contains("\"currency_symbol\": \"€\""));
        let back: AnalysisReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.transaction_count, report.transaction_count);
    }
}
