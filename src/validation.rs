use crate::currency::normalize_currency_column;
use crate::error::{ExpenseAnalysisError, Result};
use crate::schema::{RawTable, RawValue, Transaction, TransactionSet, EXPECTED_COLUMNS};
use crate::utils::parse_date;
use chrono::NaiveDate;
use log::debug;

const DATE_COL: usize = 0;
const DESCRIPTION_COL: usize = 1;
const CATEGORY_COL: usize = 2;
const VALUE_COL: usize = 3;

/// Turns an uploaded table into the canonical transaction set.
///
/// Checks run in a fixed order and the first failure wins:
/// column count, column names and order, non-empty body, dates,
/// currency convention, numeric values. Any bad row rejects the whole
/// batch.
pub fn validate_table(table: &RawTable) -> Result<TransactionSet> {
    validate_columns(&table.columns)?;

    if table.rows.is_empty() {
        return Err(ExpenseAnalysisError::EmptyDataset);
    }

    let dates = parse_date_column(table)?;

    let raw_values: Vec<String> = table
        .column(VALUE_COL)
        .map(|v| v.as_text().into_owned())
        .collect();
    let normalized = normalize_currency_column(&raw_values)?;
    let values = parse_value_column(table, &normalized.values)?;

    let transactions: Vec<Transaction> = dates
        .into_iter()
        .zip(values)
        .enumerate()
        .map(|(row, (date, value))| {
            Transaction::new(
                date,
                coerce_text(table.cell(row, DESCRIPTION_COL)),
                coerce_text(table.cell(row, CATEGORY_COL)),
                value,
            )
        })
        .collect();

    debug!(
        "Validated {} transactions (currency symbol: {:?})",
        transactions.len(),
        normalized.symbol
    );

    Ok(TransactionSet::new(transactions, normalized.symbol))
}

/// Exactly `date, description, category, value`, in that order.
pub fn validate_columns(columns: &[String]) -> Result<()> {
    if columns.len() != EXPECTED_COLUMNS.len() {
        return Err(ExpenseAnalysisError::ColumnCount(columns.len()));
    }

    let matches = columns
        .iter()
        .zip(EXPECTED_COLUMNS.iter())
        .all(|(actual, expected)| actual == expected);

    if !matches {
        return Err(ExpenseAnalysisError::ColumnNames(columns.to_vec()));
    }

    Ok(())
}

fn parse_date_column(table: &RawTable) -> Result<Vec<NaiveDate>> {
    let mut dates = Vec::with_capacity(table.row_count());
    let mut bad_rows = Vec::new();

    for (row, cell) in table.column(DATE_COL).enumerate() {
        let parsed = match cell {
            RawValue::Date(date) => Some(*date),
            RawValue::Text(text) => parse_date(text),
            RawValue::Number(_) | RawValue::Empty => None,
        };
        match parsed {
            Some(date) => dates.push(date),
            None => bad_rows.push(row),
        }
    }

    if !bad_rows.is_empty() {
        return Err(ExpenseAnalysisError::InvalidDates { rows: bad_rows });
    }

    Ok(dates)
}

fn parse_value_column(table: &RawTable, normalized: &[String]) -> Result<Vec<f64>> {
    let mut values = Vec::with_capacity(normalized.len());
    let mut bad_rows = Vec::new();

    for (row, text) in normalized.iter().enumerate() {
        let parsed = match table.cell(row, VALUE_COL) {
            RawValue::Number(n) => Some(*n),
            _ => text.trim().parse::<f64>().ok(),
        };
        match parsed {
            Some(value) if value.is_finite() => values.push(value),
            _ => bad_rows.push(row),
        }
    }

    if !bad_rows.is_empty() {
        return Err(ExpenseAnalysisError::InvalidValues { rows: bad_rows });
    }

    Ok(values)
}

fn coerce_text(cell: &RawValue) -> String {
    cell.as_text().into_owned()
}
