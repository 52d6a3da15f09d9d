use crate::error::{ExpenseAnalysisError, Result};
use crate::schema::{FinancialMetrics, MonthHighlight, MonthlyAggregate, Transaction};

/// Sum of every transaction value; 0.0 when there are none.
pub fn current_balance(transactions: &[Transaction]) -> f64 {
    transactions.iter().map(|t| t.value).sum()
}

/// Balance, average monthly savings and the best and worst months.
///
/// `monthly` is expected in ascending period order (as produced by
/// [`crate::aggregation::calculate_monthly_summary`]); on ties the first
/// month wins, which is then the earliest.
pub fn calculate_financial_metrics(
    transactions: &[Transaction],
    monthly: &[MonthlyAggregate],
) -> Result<FinancialMetrics> {
    let first = monthly
        .first()
        .ok_or(ExpenseAnalysisError::EmptyMonthlySummary)?;

    let mut best = first;
    let mut worst = first;
    for month in &monthly[1..] {
        if month.net_income > best.net_income {
            best = month;
        }
        if month.net_income < worst.net_income {
            worst = month;
        }
    }

    let total_net: f64 = monthly.iter().map(|m| m.net_income).sum();

    Ok(FinancialMetrics {
        current_balance: current_balance(transactions),
        average_monthly_savings: total_net / monthly.len() as f64,
        best_month: highlight(best),
        worst_month: highlight(worst),
    })
}

fn highlight(month: &MonthlyAggregate) -> MonthHighlight {
    MonthHighlight {
        month: month.period.label(),
        net_income: month.net_income,
        period: month.period,
    }
}
