//! # Financial Report Charts
//!
//! A library that turns loaded financial-reporting documents (per-period
//! dashboard snapshots and a profit-and-loss report tree) into the canonical
//! shapes chart renderers consume.
//!
//! ## Core Concepts
//!
//! - **Raw Series**: a named category holding one amount or a date-aligned sequence
//! - **Category Totals**: one scalar per category, for donut/pie charts
//! - **Line Series**: one index-aligned sequence per category, for trend charts
//! - **Top-N plus Others**: charts are capped at `max_categories` entries and the
//!   long tail is folded into `"Others"`
//! - **Graceful degradation**: missing or malformed input yields empty output, never an error
//!
//! ## Example
//!
//! ```rust,ignore
//! use fin_report_charts::*;
//!
//! let snapshot = dashboard_from_path("Main Dashboard/monthly.json")?;
//! let processor = ChartDataProcessor::default();
//!
//! let expenses = processor.dashboard_category_totals(Some(&snapshot), "expenses");
//! let cash_flow = processor.dashboard_line_series(Some(&snapshot), "cashFlow");
//!
//! let report = report_from_path("Report/report.json")?;
//! let summary = financial_summary(&report);
//! let net_income = processor.computed_field_line_series(
//!     Some(&report),
//!     NET_INCOME_FIELD,
//!     Period::Monthly,
//! );
//! ```

pub mod aggregation;
pub mod error;
pub mod extractor;
pub mod ingestion;
pub mod schema;
pub mod summary;
pub mod utils;

pub use aggregation::{
    category_total, category_totals, line_series, AggregationPolicy, CategoryTotal, LineSeries,
    DEFAULT_MAX_CATEGORIES, OTHERS_LABEL,
};
pub use error::{ReportingError, Result};
pub use extractor::*;
pub use ingestion::{
    dashboard_from_path, dashboard_from_reader, dashboard_from_str, dashboard_from_value,
    is_dashboard_document, is_report_document, report_from_path, report_from_reader,
    report_from_str, report_from_value,
};
pub use schema::*;
pub use summary::*;
pub use utils::{dashboard_date_axis, month_labels_between, report_date_axis};

use log::debug;

/// Routes every chart source through one extractor and one aggregator.
///
/// Each method accepts `None` for a document that has not been loaded yet and
/// returns an empty chart in that case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChartDataProcessor {
    policy: AggregationPolicy,
}

impl ChartDataProcessor {
    pub fn new(policy: AggregationPolicy) -> Self {
        Self { policy }
    }

    pub fn with_max_categories(max_categories: usize) -> Self {
        Self::new(AggregationPolicy::new(max_categories))
    }

    pub fn policy(&self) -> AggregationPolicy {
        self.policy
    }

    pub fn dashboard_category_totals(
        &self,
        snapshot: Option<&DashboardSnapshot>,
        chart_key: &str,
    ) -> Vec<CategoryTotal> {
        let Some(snapshot) = snapshot else {
            debug!("No dashboard loaded; '{}' chart is empty", chart_key);
            return Vec::new();
        };

        let raw = extract_dashboard_series(snapshot, chart_key);
        self.policy.category_totals(&raw)
    }

    pub fn dashboard_line_series(
        &self,
        snapshot: Option<&DashboardSnapshot>,
        chart_key: &str,
    ) -> Vec<LineSeries> {
        let Some(snapshot) = snapshot else {
            debug!("No dashboard loaded; '{}' chart is empty", chart_key);
            return Vec::new();
        };

        let raw = extract_dashboard_series(snapshot, chart_key);
        let date_axis = dashboard_date_axis(snapshot);
        self.policy.line_series(&raw, &date_axis)
    }

    pub fn report_category_totals(
        &self,
        tree: Option<&ReportTree>,
        category_name: &str,
    ) -> Vec<CategoryTotal> {
        let Some(tree) = tree else {
            debug!("No report loaded; '{}' chart is empty", category_name);
            return Vec::new();
        };

        let raw = extract_report_series(tree, category_name);
        self.policy.category_totals(&raw)
    }

    pub fn report_line_series(
        &self,
        tree: Option<&ReportTree>,
        category_name: &str,
        period: Period,
    ) -> Vec<LineSeries> {
        let Some(tree) = tree else {
            debug!("No report loaded; '{}' chart is empty", category_name);
            return Vec::new();
        };

        let raw = extract_report_series(tree, category_name);
        let date_axis = report_date_axis(tree, period);
        self.policy.line_series(&raw, &date_axis)
    }

    pub fn computed_field_category_totals(
        &self,
        tree: Option<&ReportTree>,
        field_name: &str,
        period: Period,
    ) -> Vec<CategoryTotal> {
        let Some(tree) = tree else {
            debug!("No report loaded; '{}' chart is empty", field_name);
            return Vec::new();
        };

        let raw = extract_computed_field_series(tree, field_name, period);
        self.policy.category_totals(&raw)
    }

    pub fn computed_field_line_series(
        &self,
        tree: Option<&ReportTree>,
        field_name: &str,
        period: Period,
    ) -> Vec<LineSeries> {
        let Some(tree) = tree else {
            debug!("No report loaded; '{}' chart is empty", field_name);
            return Vec::new();
        };

        let raw = extract_computed_field_series(tree, field_name, period);
        let date_axis = report_date_axis(tree, period);
        self.policy.line_series(&raw, &date_axis)
    }
}
