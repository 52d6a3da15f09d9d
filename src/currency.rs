//! Detection and stripping of a single currency symbol convention in the
//! `value` column.
//!
//! Detection and stripping share [`CURRENCY_SYMBOLS`], so a symbol that is
//! detected is always one that gets stripped.

use crate::error::{ExpenseAnalysisError, Result};
use log::debug;
use std::collections::BTreeSet;

/// Recognized currency glyphs.
pub const CURRENCY_SYMBOLS: &[char] = &[
    '$', // dollar
    '€', // euro
    '£', // pound
    '¥', // yen / yuan
    '₹', // rupee
    '₽', // ruble
    '₩', // won
    '₪', // shekel
    '₫', // dong
    '₱', // peso
    '₦', // naira
    '₴', // hryvnia
    '₸', // tenge
    '₺', // lira
    '₼', // manat
    '₾', // lari
    '₡', // colon
    '₲', // guarani
    '₵', // cedi
    '₭', // kip
    '₮', // tugrik
    '฿', // baht
    '₿', // bitcoin
    '¢', // cent
];

pub fn is_currency_symbol(c: char) -> bool {
    CURRENCY_SYMBOLS.contains(&c)
}

/// Column of value strings with the currency convention removed.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedColumn {
    pub values: Vec<String>,
    pub symbol: Option<char>,
}

/// Finds the single currency symbol used across `values`.
///
/// Rows without a symbol are fine; two different symbols anywhere in the
/// column are not.
pub fn detect_currency_symbol<S: AsRef<str>>(values: &[S]) -> Result<Option<char>> {
    let found: BTreeSet<char> = values
        .iter()
        .flat_map(|v| v.as_ref().chars())
        .filter(|c| is_currency_symbol(*c))
        .collect();

    match found.len() {
        0 => Ok(None),
        1 => Ok(found.into_iter().next()),
        _ => Err(ExpenseAnalysisError::MultipleCurrencies {
            symbols: found.into_iter().collect(),
        }),
    }
}

/// Removes every recognized symbol and the whitespace around it, then trims.
/// `"-$ 100.50"` becomes `"-100.50"` and `"$-120.50"` becomes `"-120.50"`.
pub fn strip_currency_symbols(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        if is_currency_symbol(c) {
            while out.ends_with(char::is_whitespace) {
                out.pop();
            }
            while chars.next_if(|n| n.is_whitespace()).is_some() {}
            continue;
        }
        out.push(c);
    }

    out.trim().to_string()
}

/// Detects the currency convention of a raw value column and strips it.
pub fn normalize_currency_column<S: AsRef<str>>(values: &[S]) -> Result<NormalizedColumn> {
    let symbol = detect_currency_symbol(values)?;

    let values: Vec<String> = match symbol {
        None => values.iter().map(|v| v.as_ref().to_string()).collect(),
        Some(_) => values
            .iter()
            .map(|v| strip_currency_symbols(v.as_ref()))
            .collect(),
    };

    debug!(
        "Currency normalization: symbol {:?} across {} values",
        symbol,
        values.len()
    );

    Ok(NormalizedColumn { values, symbol })
}
