use crate::schema::{DashboardSnapshot, Period, RawSeries, ReportTree};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub name: String,
    pub kind: Option<String>,
}

/// Series stored under `charts[chart_key]`; a missing key means "no data".
pub fn extract_dashboard_series(snapshot: &DashboardSnapshot, chart_key: &str) -> Vec<RawSeries> {
    match snapshot.chart(chart_key) {
        Some(series) => series.to_vec(),
        None => {
            debug!("Chart '{}' not present in dashboard snapshot", chart_key);
            Vec::new()
        }
    }
}

/// One series per field of the named profit/loss category, taken from the
/// field's first actual-data record.
pub fn extract_report_series(tree: &ReportTree, category_name: &str) -> Vec<RawSeries> {
    let Some(category) = tree.category(category_name) else {
        debug!("Category '{}' not found in report", category_name);
        return Vec::new();
    };

    category
        .fields
        .iter()
        .map(|field| {
            let values = field
                .actual_data
                .first()
                .map(|record| record.value.clone())
                .unwrap_or_default();
            RawSeries::new(field.name.clone(), values)
        })
        .collect()
}

pub fn extract_computed_field_series(
    tree: &ReportTree,
    field_name: &str,
    period: Period,
) -> Vec<RawSeries> {
    match tree.computed_field(field_name) {
        Some(field) => vec![RawSeries::new(
            field.name.clone(),
            field.series_for(period).to_vec(),
        )],
        None => {
            debug!("Computed field '{}' not found in report", field_name);
            Vec::new()
        }
    }
}

pub fn available_categories(tree: &ReportTree) -> Vec<CategoryInfo> {
    tree.report_result
        .profit_n_loss
        .iter()
        .map(|category| CategoryInfo {
            name: category.name.clone(),
            kind: category.kind.clone(),
        })
        .collect()
}
