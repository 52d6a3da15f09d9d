//! Keyword-based subcategory classification.
//!
//! Both levels of dispatch are plain ordered data evaluated top-down, first
//! match wins:
//!
//! 1. the transaction's `category` picks a [`CategoryRoute`] (case-insensitive
//!    substring match on the route patterns); no route means the category
//!    itself is the subcategory,
//! 2. the route's [`RuleSet`] matches the description against each
//!    [`KeywordRule`] in order, falling back to [`RuleSet::fallback`].

use crate::error::{ExpenseAnalysisError, Result};
use crate::schema::{SubcategoryAggregate, Transaction};
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KeywordRule {
    pub subcategory: String,
    #[schemars(description = "Substrings looked for in the lower-cased, punctuation-free description")]
    pub keywords: Vec<String>,
}

impl KeywordRule {
    pub fn new(subcategory: &str, keywords: &[&str]) -> Self {
        Self {
            subcategory: subcategory.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// `description` must already be normalized with [`normalize_description`].
    pub fn matches(&self, description: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| description.contains(k.to_lowercase().as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RuleSet {
    pub rules: Vec<KeywordRule>,
    pub fallback: String,
}

impl RuleSet {
    pub fn classify(&self, description: &str) -> &str {
        let normalized = normalize_description(description);
        self.rules
            .iter()
            .find(|rule| rule.matches(&normalized))
            .map(|rule| rule.subcategory.as_str())
            .unwrap_or(self.fallback.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryRoute {
    pub name: String,
    #[schemars(description = "Case-insensitive substrings of the category that select this route")]
    pub patterns: Vec<String>,
    pub ruleset: RuleSet,
}

impl CategoryRoute {
    pub fn matches(&self, category: &str) -> bool {
        let category = category.to_lowercase();
        self.patterns
            .iter()
            .any(|p| category.contains(p.to_lowercase().as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClassifierRules {
    pub routes: Vec<CategoryRoute>,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            routes: vec![
                CategoryRoute {
                    name: "food".to_string(),
                    patterns: strings(&["food", "groceries", "dining"]),
                    ruleset: food_rules(),
                },
                CategoryRoute {
                    name: "transportation".to_string(),
                    patterns: strings(&["transport"]),
                    ruleset: transportation_rules(),
                },
                CategoryRoute {
                    name: "hobbies".to_string(),
                    patterns: strings(&["hobbies", "subscription", "entertainment"]),
                    ruleset: hobbies_rules(),
                },
            ],
        }
    }
}

impl ClassifierRules {
    pub fn route_for(&self, category: &str) -> Option<&CategoryRoute> {
        self.routes.iter().find(|route| route.matches(category))
    }

    pub fn classify(&self, category: &str, description: &str) -> String {
        match self.route_for(category) {
            Some(route) => route.ruleset.classify(description).to_string(),
            None => category.to_string(),
        }
    }

    pub fn classify_transaction(&self, txn: &Transaction) -> String {
        self.classify(&txn.category, &txn.description)
    }

    /// Copy of `transactions` with every `subcategory` filled in.
    pub fn classify_transactions(&self, transactions: &[Transaction]) -> Result<Vec<Transaction>> {
        if transactions.is_empty() {
            return Err(ExpenseAnalysisError::EmptyTransactions);
        }

        Ok(transactions
            .iter()
            .map(|txn| Transaction {
                subcategory: Some(self.classify_transaction(txn)),
                ..txn.clone()
            })
            .collect())
    }

    /// Spending per subcategory for expenses whose category contains
    /// `category` (case-insensitive), largest first.
    ///
    /// Transactions that already carry a subcategory keep it.
    pub fn subcategory_breakdown(
        &self,
        transactions: &[Transaction],
        category: &str,
    ) -> Result<Vec<SubcategoryAggregate>> {
        if transactions.is_empty() {
            return Err(ExpenseAnalysisError::EmptyTransactions);
        }

        let needle = category.to_lowercase();
        let mut totals: BTreeMap<String, f64> = BTreeMap::new();

        for txn in transactions
            .iter()
            .filter(|t| t.is_expense() && t.category.to_lowercase().contains(&needle))
        {
            let subcategory = match &txn.subcategory {
                Some(s) => s.clone(),
                None => self.classify_transaction(txn),
            };
            *totals.entry(subcategory).or_insert(0.0) += txn.value.abs();
        }

        let category_total: f64 = totals.values().sum();

        let mut breakdown: Vec<SubcategoryAggregate> = totals
            .into_iter()
            .map(|(subcategory, amount)| SubcategoryAggregate {
                percentage: if category_total > 0.0 {
                    amount / category_total * 100.0
                } else {
                    0.0
                },
                subcategory,
                amount,
            })
            .collect();

        // Stable sort keeps equal amounts in subcategory-name order.
        breakdown.sort_by(|a, b| b.amount.total_cmp(&a.amount));

        debug!(
            "Subcategory breakdown for '{}': {} groups, total {:.2}",
            category,
            breakdown.len(),
            category_total
        );

        Ok(breakdown)
    }

    /// A breakdown for every distinct expense category, skipping empty ones.
    pub fn all_category_breakdowns(
        &self,
        transactions: &[Transaction],
    ) -> Result<BTreeMap<String, Vec<SubcategoryAggregate>>> {
        if transactions.is_empty() {
            return Err(ExpenseAnalysisError::EmptyTransactions);
        }

        let classified = self.classify_transactions(transactions)?;
        let categories: BTreeSet<&str> = classified
            .iter()
            .filter(|t| t.is_expense())
            .map(|t| t.category.as_str())
            .collect();

        let mut breakdowns = BTreeMap::new();
        for category in categories {
            let breakdown = self.subcategory_breakdown(&classified, category)?;
            if !breakdown.is_empty() {
                breakdowns.insert(category.to_string(), breakdown);
            }
        }

        Ok(breakdowns)
    }
}

/// Lower-cases and replaces anything that is not a word character or
/// whitespace with a space.
pub fn normalize_description(description: &str) -> String {
    description
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect()
}

pub fn food_rules() -> RuleSet {
    RuleSet {
        rules: vec![KeywordRule::new(
            "Groceries",
            &["grocery", "groceries", "supermarket", "market", "store", "food store"],
        )],
        fallback: "Other Food Sources".to_string(),
    }
}

pub fn transportation_rules() -> RuleSet {
    RuleSet {
        rules: vec![KeywordRule::new(
            "Public Transportation",
            &[
                "bus",
                "metro",
                "subway",
                "train",
                "tram",
                "transit",
                "rail",
                "metro card",
                "transit pass",
                "public transport",
                "rail pass",
            ],
        )],
        fallback: "Private Transportation".to_string(),
    }
}

pub fn hobbies_rules() -> RuleSet {
    RuleSet {
        rules: vec![
            KeywordRule::new(
                "Streaming",
                &["streaming", "music subscription", "video subscription"],
            ),
            KeywordRule::new(
                "Fitness",
                &[
                    "gym",
                    "fitness",
                    "yoga",
                    "pilates",
                    "crossfit",
                    "workout",
                    "health club",
                    "sports club",
                ],
            ),
            KeywordRule::new(
                "Gaming",
                &["game pass", "gaming", "game subscription", "video game"],
            ),
            KeywordRule::new(
                "Educational",
                &["online course", "learning", "education", "course"],
            ),
            KeywordRule::new(
                "Books",
                &["book", "books", "reading", "audiobook", "ebook", "magazine"],
            ),
            KeywordRule::new("News & Media", &["news", "newspaper", "publication"]),
            KeywordRule::new(
                "Professional",
                &["creative cloud", "workspace", "cloud storage", "productivity"],
            ),
        ],
        fallback: "Other Subscriptions".to_string(),
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

pub fn classify_transactions(transactions: &[Transaction]) -> Result<Vec<Transaction>> {
    ClassifierRules::default().classify_transactions(transactions)
}

pub fn calculate_subcategory_breakdown(
    transactions: &[Transaction],
    category: &str,
) -> Result<Vec<SubcategoryAggregate>> {
    ClassifierRules::default().subcategory_breakdown(transactions, category)
}

pub fn all_category_breakdowns(
    transactions: &[Transaction],
) -> Result<BTreeMap<String, Vec<SubcategoryAggregate>>> {
    ClassifierRules::default().all_category_breakdowns(transactions)
}
