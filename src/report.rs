use crate::schema::{
    CategoryAggregate, FinancialMetrics, MonthlyAggregate, RollingAveragePoint,
    SubcategoryAggregate,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every derived view for one uploaded dataset, ready for the presentation
/// layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisReport {
    pub currency_symbol: Option<char>,
    pub transaction_count: usize,
    pub monthly_summary: Vec<MonthlyAggregate>,
    pub category_breakdown: Vec<CategoryAggregate>,
    pub rolling_average: Vec<RollingAveragePoint>,
    #[schemars(description = "Subcategory breakdown keyed by expense category name")]
    pub subcategory_breakdowns: BTreeMap<String, Vec<SubcategoryAggregate>>,
    pub metrics: FinancialMetrics,
}

impl AnalysisReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AnalysisReport)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }

    /// Breakdown for an exact category name, if it had any expenses.
    pub fn breakdown_for(&self, category: &str) -> Option<&[SubcategoryAggregate]> {
        self.subcategory_breakdowns
            .get(category)
            .map(|rows| rows.as_slice())
    }
}
