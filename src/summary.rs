use crate::aggregation::category_total;
use crate::schema::{DashboardSnapshot, Kpi, Period, RawSeries, ReportTree};
use crate::utils::{finite_or_zero, parse_report_date};
use chrono::NaiveDate;
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const REVENUE_CATEGORY: &str = "Total Revenues";
pub const EXPENSES_CATEGORY: &str = "Total Expenses";

pub const GROSS_PROFIT_FIELD: &str = "Total Gross Profit";
pub const NET_OTHER_INCOME_FIELD: &str = "Total Net Other Income";
pub const NET_OPERATING_PROFITS_FIELD: &str = "Total Net Operating Profits";
pub const NET_INCOME_FIELD: &str = "Total Net Income/(Loss)";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    /// `max(0, revenue - expenses)`
    pub cash_at_bank: f64,
    pub revenue: f64,
    pub expenses: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDirection {
    Positive,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KpiChange {
    /// e.g. "+5.2%" or "-3.1%"
    pub label: String,
    pub direction: ChangeDirection,
}

impl KpiChange {
    /// A zero change carries no indicator.
    pub fn from_mom(mom: f64) -> Option<Self> {
        if mom == 0.0 || !mom.is_finite() {
            return None;
        }

        let direction = if mom > 0.0 {
            ChangeDirection::Positive
        } else {
            ChangeDirection::Negative
        };
        let sign = if mom > 0.0 { "+" } else { "" };

        Some(Self {
            label: format!("{}{:.1}%", sign, mom),
            direction,
        })
    }
}

impl Kpi {
    pub fn change(&self) -> Option<KpiChange> {
        self.mom.and_then(KpiChange::from_mom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComputedInsight {
    pub title: String,
    pub field: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportMetadata {
    pub start_date: String,
    pub end_date: String,
    pub created_at: String,
}

impl ReportMetadata {
    pub fn start(&self) -> Option<NaiveDate> {
        parse_report_date(&self.start_date)
    }

    pub fn end(&self) -> Option<NaiveDate> {
        parse_report_date(&self.end_date)
    }
}

pub fn extract_kpis(snapshot: &DashboardSnapshot) -> Vec<Kpi> {
    snapshot.main_dashboard_kpis.top_kpis.clone()
}

pub fn all_kpis(snapshot: &DashboardSnapshot) -> Vec<Kpi> {
    snapshot.main_dashboard_kpis.kpis.clone()
}

fn sum(values: &[f64]) -> f64 {
    values.iter().copied().map(finite_or_zero).sum()
}

fn category_result_total(tree: &ReportTree, name: &str) -> f64 {
    match tree.category(name) {
        Some(category) => sum(&category.total_result),
        None => {
            debug!("Summary category '{}' not found; counting as 0", name);
            0.0
        }
    }
}

/// Trusts each category's precomputed `totalResult` rather than re-deriving
/// it from field actuals.
pub fn financial_summary(tree: &ReportTree) -> FinancialSummary {
    let revenue = category_result_total(tree, REVENUE_CATEGORY);
    let expenses = category_result_total(tree, EXPENSES_CATEGORY);

    FinancialSummary {
        cash_at_bank: (revenue - expenses).max(0.0),
        revenue,
        expenses,
    }
}

pub fn computed_field_total(tree: &ReportTree, field_name: &str, period: Period) -> f64 {
    match tree.computed_field(field_name) {
        Some(field) => sum(field.series_for(period)),
        None => {
            debug!("Computed field '{}' not found; counting as 0", field_name);
            0.0
        }
    }
}

/// Headline figures for the four computed fields shown on the report page.
pub fn computed_insights(tree: &ReportTree, period: Period) -> Vec<ComputedInsight> {
    [
        ("Gross Profit", GROSS_PROFIT_FIELD),
        ("Net Other Income", NET_OTHER_INCOME_FIELD),
        ("Net Operating Profits", NET_OPERATING_PROFITS_FIELD),
        ("Net Income/(Loss)", NET_INCOME_FIELD),
    ]
    .into_iter()
    .map(|(title, field)| ComputedInsight {
        title: title.to_string(),
        field: field.to_string(),
        value: computed_field_total(tree, field, period),
    })
    .collect()
}

/// Grand total over every series, floored at zero.
pub fn metric_total(series: &[RawSeries]) -> f64 {
    let total: f64 = series.iter().map(|s| category_total(&s.values)).sum();
    total.max(0.0)
}

pub fn report_metadata(tree: &ReportTree) -> ReportMetadata {
    let result = &tree.report_result;
    ReportMetadata {
        start_date: result.starting_date.clone().unwrap_or_default(),
        end_date: result.ending_date.clone().unwrap_or_default(),
        created_at: result.created_at.clone().unwrap_or_default(),
    }
}
