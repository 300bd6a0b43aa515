use crate::error::{ReportingError, Result};
use crate::schema::{DashboardSnapshot, RawSeries, ReportTree};
use crate::utils::finite_or_zero;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Numeric JSON values pass through; everything else (null, strings, booleans) is 0.
pub fn number_or_zero(value: &Value) -> f64 {
    value.as_f64().map(finite_or_zero).unwrap_or(0.0)
}

pub fn numbers_from_value(value: &Value) -> Vec<f64> {
    match value {
        Value::Array(items) => items.iter().map(number_or_zero).collect(),
        _ => Vec::new(),
    }
}

fn list_from_value<T: DeserializeOwned>(value: Value) -> Vec<T> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter_map(|(idx, item)| match T::deserialize(item) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    debug!("Skipping malformed record #{}: {}", idx, e);
                    None
                }
            })
            .collect(),
        Value::Null => Vec::new(),
        other => {
            debug!("Expected a list, found {}; treating as empty", json_kind(&other));
            Vec::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub(crate) fn lenient_numbers<'de, D>(deserializer: D) -> std::result::Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(numbers_from_value(&value))
}

pub(crate) fn lenient_strings<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items.into_iter().map(label_from_value).collect(),
        _ => Vec::new(),
    })
}

/// Labels keep their position: numbers are stringified, anything else is blank.
fn label_from_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

pub(crate) fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(label_from_value(value))
}

pub(crate) fn lenient_opt_string<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        _ => None,
    })
}

pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_or_zero(&value))
}

pub(crate) fn lenient_opt_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_f64().filter(|v| v.is_finite()))
}

pub(crate) fn lenient_list<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(list_from_value(value))
}

pub(crate) fn lenient_series_map<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, Vec<RawSeries>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(map) => map
            .into_iter()
            .map(|(key, series)| (key, list_from_value(series)))
            .collect(),
        _ => BTreeMap::new(),
    })
}

pub(crate) fn lenient_or_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_else(|e| {
        debug!("Malformed section replaced with defaults: {}", e);
        T::default()
    }))
}

/// Mirrors the checks the dashboard page runs before rendering: a
/// `mainDashboard` object carrying `charts` and an array `dateArray`.
pub fn is_dashboard_document(value: &Value) -> bool {
    value
        .get("mainDashboard")
        .and_then(Value::as_object)
        .map_or(false, |main| {
            main.get("charts").map_or(false, Value::is_object)
                && main.get("dateArray").map_or(false, Value::is_array)
        })
}

pub fn is_report_document(value: &Value) -> bool {
    value
        .get("reportResult")
        .and_then(Value::as_object)
        .map_or(false, |result| {
            result.get("profitnLoss").map_or(false, Value::is_array)
        })
}

fn ensure_object(value: &Value, document: &str) -> Result<()> {
    if value.is_object() {
        Ok(())
    } else {
        Err(ReportingError::InvalidDocument(format!(
            "{} document must be a JSON object, found {}",
            document,
            json_kind(value)
        )))
    }
}

pub fn dashboard_from_value(value: Value) -> Result<DashboardSnapshot> {
    ensure_object(&value, "Dashboard")?;
    if !is_dashboard_document(&value) {
        warn!("Dashboard document is missing mainDashboard.charts or mainDashboard.dateArray");
    }

    let snapshot = DashboardSnapshot::deserialize(value)?;
    info!(
        "Loaded {} dashboard with {} charts over {} periods",
        snapshot.main_dashboard.period.as_str(),
        snapshot.main_dashboard.charts.len(),
        snapshot.main_dashboard.date_array.len()
    );
    Ok(snapshot)
}

pub fn dashboard_from_str(json: &str) -> Result<DashboardSnapshot> {
    let value: Value = serde_json::from_str(json)?;
    dashboard_from_value(value)
}

pub fn dashboard_from_reader<R: Read>(reader: R) -> Result<DashboardSnapshot> {
    let value: Value = serde_json::from_reader(reader)?;
    dashboard_from_value(value)
}

pub fn dashboard_from_path<P: AsRef<Path>>(path: P) -> Result<DashboardSnapshot> {
    let file = File::open(path.as_ref())?;
    debug!("Reading dashboard document from {}", path.as_ref().display());
    dashboard_from_reader(BufReader::new(file))
}

pub fn report_from_value(value: Value) -> Result<ReportTree> {
    ensure_object(&value, "Report")?;
    if !is_report_document(&value) {
        warn!("Report document is missing reportResult.profitnLoss");
    }

    let tree = ReportTree::deserialize(value)?;
    info!(
        "Loaded report with {} profit/loss categories and {} computed fields",
        tree.report_result.profit_n_loss.len(),
        tree.report_result.computed_fields.len()
    );
    Ok(tree)
}

pub fn report_from_str(json: &str) -> Result<ReportTree> {
    let value: Value = serde_json::from_str(json)?;
    report_from_value(value)
}

pub fn report_from_reader<R: Read>(reader: R) -> Result<ReportTree> {
    let value: Value = serde_json::from_reader(reader)?;
    report_from_value(value)
}

pub fn report_from_path<P: AsRef<Path>>(path: P) -> Result<ReportTree> {
    let file = File::open(path.as_ref())?;
    debug!("Reading report document from {}", path.as_ref().display());
    report_from_reader(BufReader::new(file))
}
