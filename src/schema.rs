use crate::ingestion::{
    lenient_f64, lenient_list, lenient_numbers, lenient_opt_f64, lenient_opt_string,
    lenient_or_default, lenient_series_map, lenient_string, lenient_strings, numbers_from_value,
};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    #[schemars(description = "One bucket per calendar month")]
    Monthly,

    #[schemars(description = "One bucket per calendar quarter")]
    Quarterly,

    #[schemars(description = "One bucket per year")]
    Yearly,
}

impl Period {
    /// Unknown or empty selectors fall back to `Monthly`.
    pub fn parse_lossy(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "quarterly" => Period::Quarterly,
            "yearly" => Period::Yearly,
            _ => Period::Monthly,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Monthly => "monthly",
            Period::Quarterly => "quarterly",
            Period::Yearly => "yearly",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Period::Monthly => "Monthly",
            Period::Quarterly => "Quarterly",
            Period::Yearly => "Yearly",
        }
    }
}

impl From<&str> for Period {
    fn from(raw: &str) -> Self {
        Self::parse_lossy(raw)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().map(Period::parse_lossy).unwrap_or_default())
    }
}

/// Values of one named category as stored in the source documents: either a
/// single amount or an ordered sequence aligned to the date axis.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum SeriesValues {
    Scalar(f64),
    Sequence(Vec<f64>),
}

impl Default for SeriesValues {
    fn default() -> Self {
        SeriesValues::Sequence(Vec::new())
    }
}

impl SeriesValues {
    pub fn as_sequence(&self) -> Option<&[f64]> {
        match self {
            SeriesValues::Sequence(values) => Some(values),
            SeriesValues::Scalar(_) => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, SeriesValues::Scalar(_))
    }
}

impl From<f64> for SeriesValues {
    fn from(value: f64) -> Self {
        SeriesValues::Scalar(value)
    }
}

impl From<Vec<f64>> for SeriesValues {
    fn from(values: Vec<f64>) -> Self {
        SeriesValues::Sequence(values)
    }
}

impl<'de> Deserialize<'de> for SeriesValues {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match &value {
            Value::Number(n) => {
                SeriesValues::Scalar(n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0))
            }
            Value::Array(_) => SeriesValues::Sequence(numbers_from_value(&value)),
            _ => SeriesValues::default(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawSeries {
    #[serde(default, deserialize_with = "lenient_string")]
    #[schemars(description = "Category or field name, used as the legend label")]
    pub name: String,

    #[serde(default)]
    #[schemars(description = "A single amount or a sequence aligned to the date axis")]
    pub values: SeriesValues,

    #[serde(
        default,
        rename = "chartType",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_string"
    )]
    pub chart_type: Option<String>,
}

impl RawSeries {
    pub fn new(name: impl Into<String>, values: impl Into<SeriesValues>) -> Self {
        Self {
            name: name.into(),
            values: values.into(),
            chart_type: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Kpi {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub value: f64,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_string"
    )]
    pub date: Option<String>,

    #[serde(
        default,
        rename = "mOm",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_f64"
    )]
    #[schemars(description = "Month-over-month change in percent")]
    pub mom: Option<f64>,

    #[serde(
        default,
        rename = "type",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_string"
    )]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MainDashboard {
    #[serde(default)]
    pub period: Period,

    #[serde(default, rename = "startDate", deserialize_with = "lenient_opt_string")]
    pub start_date: Option<String>,

    #[serde(default, rename = "endDate", deserialize_with = "lenient_opt_string")]
    pub end_date: Option<String>,

    #[serde(default, rename = "metricDate", deserialize_with = "lenient_opt_string")]
    pub metric_date: Option<String>,

    #[serde(default, rename = "dateArray", deserialize_with = "lenient_strings")]
    #[schemars(description = "Ordered period labels every chart sequence is aligned to")]
    pub date_array: Vec<String>,

    #[serde(default, deserialize_with = "lenient_series_map")]
    pub charts: BTreeMap<String, Vec<RawSeries>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DashboardKpis {
    #[serde(default, rename = "topKPIs", deserialize_with = "lenient_list")]
    pub top_kpis: Vec<Kpi>,

    #[serde(default, rename = "KPIs", deserialize_with = "lenient_list")]
    pub kpis: Vec<Kpi>,
}

/// Per-period dashboard document (`monthly.json`, `quarterly.json`, `yearly.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DashboardSnapshot {
    #[serde(default, rename = "mainDashboard", deserialize_with = "lenient_or_default")]
    pub main_dashboard: MainDashboard,

    #[serde(default, rename = "mainDashboardKPIs", deserialize_with = "lenient_or_default")]
    pub main_dashboard_kpis: DashboardKpis,
}

impl DashboardSnapshot {
    pub fn chart(&self, chart_key: &str) -> Option<&[RawSeries]> {
        self.main_dashboard.charts.get(chart_key).map(Vec::as_slice)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(DashboardSnapshot)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ActualData {
    #[serde(default, deserialize_with = "lenient_numbers")]
    pub value: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Field {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,

    #[serde(default, rename = "actualData", deserialize_with = "lenient_list")]
    #[schemars(description = "Actual-data records; only the first one feeds the charts")]
    pub actual_data: Vec<ActualData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Category {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,

    #[serde(
        default,
        rename = "type",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_string"
    )]
    pub kind: Option<String>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub fields: Vec<Field>,

    #[serde(default, rename = "totalResult", deserialize_with = "lenient_numbers")]
    #[schemars(description = "Precomputed per-period totals of the category")]
    pub total_result: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComputedField {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,

    #[serde(default, deserialize_with = "lenient_numbers")]
    pub result: Vec<f64>,

    #[serde(default, deserialize_with = "lenient_numbers")]
    pub quarterly: Vec<f64>,

    #[serde(default, deserialize_with = "lenient_numbers")]
    pub yearly: Vec<f64>,
}

impl ComputedField {
    /// `result` holds the monthly buckets.
    pub fn series_for(&self, period: Period) -> &[f64] {
        match period {
            Period::Monthly => &self.result,
            Period::Quarterly => &self.quarterly,
            Period::Yearly => &self.yearly,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportResult {
    #[serde(default, rename = "startingDate", deserialize_with = "lenient_opt_string")]
    pub starting_date: Option<String>,

    #[serde(default, rename = "endingDate", deserialize_with = "lenient_opt_string")]
    pub ending_date: Option<String>,

    #[serde(default, rename = "createdAt", deserialize_with = "lenient_opt_string")]
    pub created_at: Option<String>,

    #[serde(default, rename = "profitnLoss", deserialize_with = "lenient_list")]
    pub profit_n_loss: Vec<Category>,

    #[serde(default, rename = "computedFields", deserialize_with = "lenient_list")]
    pub computed_fields: Vec<ComputedField>,
}

/// The profit-and-loss report document (`report.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportTree {
    #[serde(default, rename = "reportResult", deserialize_with = "lenient_or_default")]
    pub report_result: ReportResult,
}

impl ReportTree {
    /// First exact, case-sensitive name match.
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.report_result
            .profit_n_loss
            .iter()
            .find(|category| category.name == name)
    }

    pub fn computed_field(&self, name: &str) -> Option<&ComputedField> {
        self.report_result
            .computed_fields
            .iter()
            .find(|field| field.name == name)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ReportTree)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
