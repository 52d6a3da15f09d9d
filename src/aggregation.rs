use crate::error::{ExpenseAnalysisError, Result};
use crate::schema::{
    validate_rolling_window, CategoryAggregate, MonthlyAggregate, Period, RollingAveragePoint,
    Transaction, DEFAULT_ROLLING_WINDOW,
};
use log::debug;
use std::collections::BTreeMap;

/// Read-only monthly views over a transaction slice.
pub struct Aggregator<'a> {
    transactions: &'a [Transaction],
}

impl<'a> Aggregator<'a> {
    pub fn new(transactions: &'a [Transaction]) -> Self {
        Self { transactions }
    }

    /// Income, expenses and net income per period, ascending by period.
    pub fn monthly_summary(&self) -> Vec<MonthlyAggregate> {
        let mut grouped: BTreeMap<Period, (f64, f64)> = BTreeMap::new();

        for txn in self.transactions {
            let entry = grouped.entry(txn.period()).or_insert((0.0, 0.0));
            if txn.is_income() {
                entry.0 += txn.value;
            } else if txn.is_expense() {
                entry.1 += txn.value;
            }
        }

        debug!("Monthly summary covers {} periods", grouped.len());

        // Net is derived from the two totals so the identity holds exactly.
        grouped
            .into_iter()
            .map(|(period, (income, expenses))| {
                let total_expenses = expenses.abs();
                MonthlyAggregate {
                    period,
                    total_income: income,
                    total_expenses,
                    net_income: income - total_expenses,
                }
            })
            .collect()
    }

    /// Expense totals per (period, category). Income never contributes.
    pub fn category_breakdown(&self) -> Vec<CategoryAggregate> {
        let mut grouped: BTreeMap<(Period, &str), f64> = BTreeMap::new();

        for txn in self.transactions.iter().filter(|t| t.is_expense()) {
            *grouped
                .entry((txn.period(), txn.category.as_str()))
                .or_insert(0.0) += txn.value;
        }

        grouped
            .into_iter()
            .map(|((period, category), total)| CategoryAggregate {
                period,
                category: category.to_string(),
                spending: total.abs(),
            })
            .collect()
    }

    /// Absolute expense total for every period that has at least one expense.
    pub fn monthly_expense_series(&self) -> BTreeMap<Period, f64> {
        let mut series: BTreeMap<Period, f64> = BTreeMap::new();
        for txn in self.transactions.iter().filter(|t| t.is_expense()) {
            *series.entry(txn.period()).or_insert(0.0) += txn.value.abs();
        }
        series
    }

    /// Trailing mean of the monthly expense series.
    ///
    /// The window slides over the periods present in the series, not over
    /// calendar months: a month with no expenses is skipped, not counted as
    /// zero. The first `window - 1` periods have no full window and are
    /// omitted.
    pub fn rolling_average(&self, window: usize) -> Result<Vec<RollingAveragePoint>> {
        validate_rolling_window(window)?;

        let series: Vec<(Period, f64)> = self.monthly_expense_series().into_iter().collect();
        if series.len() < window {
            return Ok(Vec::new());
        }

        let points = series
            .windows(window)
            .map(|slice| {
                let sum: f64 = slice.iter().map(|(_, total)| total).sum();
                RollingAveragePoint {
                    period: slice[window - 1].0,
                    average: sum / window as f64,
                }
            })
            .collect();

        Ok(points)
    }
}

pub fn calculate_monthly_summary(transactions: &[Transaction]) -> Vec<MonthlyAggregate> {
    Aggregator::new(transactions).monthly_summary()
}

pub fn calculate_category_breakdown(transactions: &[Transaction]) -> Vec<CategoryAggregate> {
    Aggregator::new(transactions).category_breakdown()
}

pub fn calculate_rolling_average(
    transactions: &[Transaction],
    window: usize,
) -> Result<Vec<RollingAveragePoint>> {
    Aggregator::new(transactions).rolling_average(window)
}

pub fn calculate_default_rolling_average(
    transactions: &[Transaction],
) -> Result<Vec<RollingAveragePoint>> {
    calculate_rolling_average(transactions, DEFAULT_ROLLING_WINDOW)
}

/// Checks `net_income == total_income - total_expenses` for every period.
///
/// `tolerance` is relative to the month's magnitude, with a floor of 1.0 so
/// small months are compared in absolute terms.
pub fn verify_monthly_summary(summary: &[MonthlyAggregate], tolerance: f64) -> Result<()> {
    for month in summary {
        let difference = (month.total_income - month.total_expenses - month.net_income).abs();
        let scale = month.total_income.abs().max(month.total_expenses).max(1.0);
        if difference > tolerance * scale {
            return Err(ExpenseAnalysisError::SummaryIdentityViolation {
                period: month.period,
                total_income: month.total_income,
                total_expenses: month.total_expenses,
                net_income: month.net_income,
                difference,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn txn(y: i32, m: u32, d: u32, category: &str, value: f64) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            "test",
            category,
            value,
        )
    }

    fn period(y: i32, m: u32) -> Period {
        Period::new(y, m).unwrap()
    }

    #[test]
    fn test_monthly_summary_two_months() {
        let txns = vec![
            txn(2026, 1, 15, "Groceries", -100.0),
            txn(2026, 1, 30, "Salary", 3000.0),
            txn(2026, 2, 3, "Dining", -50.0),
        ];

        let summary = calculate_monthly_summary(&txns);
        assert_eq!(summary.len(), 2);

        assert_eq!(summary[0].period, period(2026, 1));
        assert_eq!(summary[0].total_income, 3000.0);
        assert_eq!(summary[0].total_expenses, 100.0);
        assert_eq!(summary[0].net_income, 2900.0);

        assert_eq!(summary[1].period, period(2026, 2));
        assert_eq!(summary[1].total_income, 0.0);
        assert_eq!(summary[1].total_expenses, 50.0);
        assert_eq!(summary[1].net_income, -50.0);

        assert!(verify_monthly_summary(&summary, 1e-9).is_ok());
    }

    #[test]
    fn test_monthly_summary_orders_across_year_boundary() {
        let txns = vec![
            txn(2026, 1, 5, "Salary", 10.0),
            txn(2025, 12, 5, "Salary", 20.0),
            txn(2025, 2, 5, "Salary", 30.0),
        ];
        let periods: Vec<Period> = calculate_monthly_summary(&txns)
            .iter()
            .map(|m| m.period)
            .collect();
        assert_eq!(periods, vec![period(2025, 2), period(2025, 12), period(2026, 1)]);
    }

    #[test]
    fn test_monthly_summary_identity_holds() {
        let values = [12.5, -3.25, -0.1, 7.0, -99.99, 0.0, 1500.0, -1499.99];
        let txns: Vec<Transaction> = values
            .iter()
            .enumerate()
            .map(|(i, v)| txn(2026, (i % 3) as u32 + 1, 1, "Misc", *v))
            .collect();

        for month in calculate_monthly_summary(&txns) {
            assert!(
                (month.net_income - (month.total_income - month.total_expenses)).abs() < 1e-9,
                "identity broken for {}",
                month.period
            );
        }
    }

    #[test]
    fn test_monthly_summary_identity_exact_at_large_magnitudes() {
        let txns = vec![
            txn(2026, 1, 1, "Salary", 3.0),
            txn(2026, 1, 2, "Rent", -1.0),
            txn(2026, 1, 3, "Windfall", 1e16),
        ];
        let summary = calculate_monthly_summary(&txns);

        assert_eq!(
            summary[0].net_income,
            summary[0].total_income - summary[0].total_expenses
        );
        assert!(verify_monthly_summary(&summary, 0.0).is_ok());
    }

    #[test]
    fn test_verify_tolerance_scales_with_magnitude() {
        let summary = vec![MonthlyAggregate {
            period: period(2026, 1),
            total_income: 1e12,
            total_expenses: 0.0,
            net_income: 1e12 + 2.0,
        }];
        assert!(verify_monthly_summary(&summary, 0.01).is_ok());
        assert!(verify_monthly_summary(&summary, 1e-15).is_err());
    }

    #[test]
    fn test_empty_inputs_yield_empty_views() {
        assert!(calculate_monthly_summary(&[]).is_empty());
        assert!(calculate_category_breakdown(&[]).is_empty());
        assert!(calculate_rolling_average(&[], 3).unwrap().is_empty());

        let income_only = vec![txn(2026, 1, 1, "Salary", 3000.0)];
        assert!(calculate_category_breakdown(&income_only).is_empty());
        assert!(calculate_rolling_average(&income_only, 1).unwrap().is_empty());
    }

    #[test]
    fn test_category_breakdown_expenses_only() {
        let txns = vec![
            txn(2026, 1, 2, "Groceries", -120.5),
            txn(2026, 1, 9, "Groceries", -30.0),
            txn(2026, 1, 15, "Dining", -4.5),
            txn(2026, 1, 30, "Salary", 3000.0),
            txn(2026, 2, 1, "Groceries", -10.0),
            txn(2026, 2, 2, "Groceries", 5.0),
        ];

        let breakdown = calculate_category_breakdown(&txns);
        assert_eq!(breakdown.len(), 3);

        assert_eq!(breakdown[0].period, period(2026, 1));
        assert_eq!(breakdown[0].category, "Dining");
        assert_eq!(breakdown[0].spending, 4.5);

        assert_eq!(breakdown[1].category, "Groceries");
        assert_eq!(breakdown[1].spending, 150.5);

        assert_eq!(breakdown[2].period, period(2026, 2));
        assert_eq!(breakdown[2].spending, 10.0);

        assert!(breakdown.iter().all(|c| c.category != "Salary"));
    }

    #[test]
    fn test_rolling_average_window_three() {
        let txns = vec![
            txn(2026, 1, 1, "Rent", -100.0),
            txn(2026, 2, 1, "Rent", -200.0),
            txn(2026, 3, 1, "Rent", -150.0),
            txn(2026, 4, 1, "Rent", -180.0),
            txn(2026, 4, 2, "Salary", 5000.0),
        ];

        let rolling = calculate_default_rolling_average(&txns).unwrap();
        assert_eq!(rolling.len(), 2);
        assert_eq!(rolling[0].period, period(2026, 3));
        assert!((rolling[0].average - 150.0).abs() < 1e-9);
        assert_eq!(rolling[1].period, period(2026, 4));
        assert!((rolling[1].average - 176.67).abs() < 0.01);
    }

    #[test]
    fn test_rolling_average_collapses_gaps() {
        // March has no expenses, so Jan, Feb and Apr form one window.
        let txns = vec![
            txn(2026, 1, 1, "Rent", -90.0),
            txn(2026, 2, 1, "Rent", -90.0),
            txn(2026, 3, 1, "Salary", 1000.0),
            txn(2026, 4, 1, "Rent", -120.0),
        ];

        let rolling = calculate_rolling_average(&txns, 3).unwrap();
        assert_eq!(rolling.len(), 1);
        assert_eq!(rolling[0].period, period(2026, 4));
        assert!((rolling[0].average - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_rolling_average_short_series_and_window_one() {
        let txns = vec![txn(2026, 1, 1, "Rent", -90.0), txn(2026, 2, 1, "Rent", -60.0)];
        assert!(calculate_rolling_average(&txns, 3).unwrap().is_empty());

        let identity = calculate_rolling_average(&txns, 1).unwrap();
        assert_eq!(identity.len(), 2);
        assert_eq!(identity[1].average, 60.0);
    }

    #[test]
    fn test_rolling_average_rejects_zero_window() {
        let txns = vec![txn(2026, 1, 1, "Rent", -90.0)];
        assert!(matches!(
            calculate_rolling_average(&txns, 0),
            Err(ExpenseAnalysisError::InvalidRollingWindow(0))
        ));
    }

    #[test]
    fn test_verify_monthly_summary_detects_violation() {
        let summary = vec![MonthlyAggregate {
            period: period(2026, 1),
            total_income: 100.0,
            total_expenses: 40.0,
            net_income: 70.0,
        }];
        assert!(matches!(
            verify_monthly_summary(&summary, 0.01),
            Err(ExpenseAnalysisError::SummaryIdentityViolation { .. })
        ));
    }
}
