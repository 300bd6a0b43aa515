//! Reduces extracted series into the two shapes chart consumers accept:
//! per-category totals (donut/pie) and index-aligned line series.
//!
//! Both paths share one category-limiting rule. Categories whose total is not
//! strictly positive are dropped first. If at most `max_categories` remain they
//! are emitted in input order. Otherwise the `max_categories - 1` largest are
//! kept in descending order of total (equal totals keep input order) and the
//! remainder is folded into a trailing `"Others"` entry.
//!
//! Every line series in one output spans the date axis: short sequences are
//! zero-padded and long ones truncated. Without an axis, kept series pass
//! through at their own length.

use crate::schema::{RawSeries, SeriesValues};
use crate::utils::finite_or_zero;
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::iter;

pub const DEFAULT_MAX_CATEGORIES: usize = 8;
pub const OTHERS_LABEL: &str = "Others";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryTotal {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LineSeries {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AggregationPolicy {
    #[schemars(description = "Maximum entries per chart, including the Others slot")]
    pub max_categories: usize,
}

impl Default for AggregationPolicy {
    fn default() -> Self {
        Self {
            max_categories: DEFAULT_MAX_CATEGORIES,
        }
    }
}

impl AggregationPolicy {
    pub fn new(max_categories: usize) -> Self {
        Self { max_categories }
    }

    pub fn category_totals(&self, series: &[RawSeries]) -> Vec<CategoryTotal> {
        category_totals(series, self.max_categories)
    }

    pub fn line_series(&self, series: &[RawSeries], date_axis: &[String]) -> Vec<LineSeries> {
        line_series(series, date_axis, self.max_categories)
    }
}

/// Sum of a sequence (non-finite elements count as 0) or the scalar itself.
pub fn category_total(values: &SeriesValues) -> f64 {
    match values {
        SeriesValues::Scalar(value) => finite_or_zero(*value),
        SeriesValues::Sequence(items) => items.iter().copied().map(finite_or_zero).sum(),
    }
}

struct Ranked<'a> {
    series: &'a RawSeries,
    total: f64,
}

fn rank_positive<'a>(series: impl Iterator<Item = &'a RawSeries>) -> Vec<Ranked<'a>> {
    series
        .map(|series| Ranked {
            series,
            total: category_total(&series.values),
        })
        .filter(|ranked| ranked.total > 0.0)
        .collect()
}

// `sort_by` is stable, so equal totals keep their input order.
fn split_top(
    mut ranked: Vec<Ranked<'_>>,
    max_categories: usize,
) -> (Vec<Ranked<'_>>, Vec<Ranked<'_>>) {
    ranked.sort_by(|a, b| b.total.total_cmp(&a.total));
    let dropped = ranked.split_off(max_categories - 1);
    (ranked, dropped)
}

pub fn category_totals(series: &[RawSeries], max_categories: usize) -> Vec<CategoryTotal> {
    let max_categories = max_categories.max(1);
    let ranked = rank_positive(series.iter());

    if ranked.len() <= max_categories {
        return ranked.into_iter().map(to_total).collect();
    }

    let (kept, dropped) = split_top(ranked, max_categories);
    let others: f64 = dropped.iter().map(|r| r.total).sum();
    debug!(
        "Folded {} categories into '{}' (total {})",
        dropped.len(),
        OTHERS_LABEL,
        others
    );

    kept.into_iter()
        .map(to_total)
        .chain(iter::once(CategoryTotal {
            name: OTHERS_LABEL.to_string(),
            value: others,
        }))
        .collect()
}

/// Scalar-valued categories have no per-period shape and are skipped.
pub fn line_series(
    series: &[RawSeries],
    date_axis: &[String],
    max_categories: usize,
) -> Vec<LineSeries> {
    let max_categories = max_categories.max(1);
    let ranked = rank_positive(series.iter().filter(|series| {
        if series.values.is_scalar() {
            debug!("Series '{}' has a single value; not drawable as a line", series.name);
            false
        } else {
            true
        }
    }));

    let axis_width = (!date_axis.is_empty()).then_some(date_axis.len());

    if ranked.len() <= max_categories {
        return ranked
            .into_iter()
            .map(|ranked| to_line(ranked, axis_width))
            .collect();
    }

    let (kept, dropped) = split_top(ranked, max_categories);

    let width = axis_width.unwrap_or_else(|| {
        dropped
            .iter()
            .map(|r| sequence_of(r.series).len())
            .max()
            .unwrap_or(0)
    });

    // Short sequences leave the missing positions at zero.
    let mut others = vec![0.0; width];
    for ranked in &dropped {
        for (slot, value) in others.iter_mut().zip(sequence_of(ranked.series)) {
            *slot += finite_or_zero(*value);
        }
    }
    debug!(
        "Folded {} line series into '{}' across {} positions",
        dropped.len(),
        OTHERS_LABEL,
        width
    );

    kept.into_iter()
        .map(|ranked| to_line(ranked, axis_width))
        .chain(iter::once(LineSeries {
            name: OTHERS_LABEL.to_string(),
            values: others,
        }))
        .collect()
}

fn sequence_of(series: &RawSeries) -> &[f64] {
    series.values.as_sequence().unwrap_or(&[])
}

fn to_total(ranked: Ranked<'_>) -> CategoryTotal {
    CategoryTotal {
        name: ranked.series.name.clone(),
        value: ranked.total,
    }
}

fn to_line(ranked: Ranked<'_>, width: Option<usize>) -> LineSeries {
    let mut values: Vec<f64> = sequence_of(ranked.series)
        .iter()
        .copied()
        .map(finite_or_zero)
        .collect();
    if let Some(width) = width {
        values.resize(width, 0.0);
    }

    LineSeries {
        name: ranked.series.name.clone(),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(len: usize) -> Vec<String> {
        (1..=len).map(|i| format!("P{}", i)).collect()
    }

    fn descending_scalars(count: usize) -> Vec<RawSeries> {
        (1..=count)
            .map(|i| RawSeries::new(format!("Category{}", i), (count + 1 - i) as f64 * 1000.0))
            .collect()
    }

    #[test]
    fn test_category_total() {
        assert_eq!(category_total(&SeriesValues::Scalar(15000.0)), 15000.0);
        assert_eq!(category_total(&SeriesValues::Sequence(vec![1.0, 2.0, 3.0])), 6.0);
        assert_eq!(category_total(&SeriesValues::Sequence(vec![1.0, f64::NAN])), 1.0);
        assert_eq!(category_total(&SeriesValues::Scalar(f64::NAN)), 0.0);
        assert_eq!(category_total(&SeriesValues::default()), 0.0);
    }

    #[test]
    fn test_small_input_keeps_order() {
        let input = vec![
            RawSeries::new("Marketing", 15000.0),
            RawSeries::new("Ops", 12000.0),
            RawSeries::new("Tech", 8000.0),
            RawSeries::new("HR", 5000.0),
        ];

        let result = category_totals(&input, DEFAULT_MAX_CATEGORIES);
        let names: Vec<&str> = result.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Marketing", "Ops", "Tech", "HR"]);
        assert_eq!(result[0].value, 15000.0);
        assert_eq!(result[3].value, 5000.0);
    }

    #[test]
    fn test_no_sorting_within_limit() {
        let input = vec![
            RawSeries::new("Small", 1.0),
            RawSeries::new("Large", 100.0),
            RawSeries::new("Medium", 10.0),
        ];

        let result = category_totals(&input, 3);
        let names: Vec<&str> = result.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Small", "Large", "Medium"]);
    }

    #[test]
    fn test_over_limit_folds_into_others() {
        let result = category_totals(&descending_scalars(10), DEFAULT_MAX_CATEGORIES);

        assert_eq!(result.len(), DEFAULT_MAX_CATEGORIES);
        for (idx, entry) in result.iter().take(7).enumerate() {
            assert_eq!(entry.name, format!("Category{}", idx + 1));
        }
        let others = result.last().unwrap();
        assert_eq!(others.name, OTHERS_LABEL);
        // Category8 + Category9 + Category10
        assert_eq!(others.value, 6000.0);
    }

    #[test]
    fn test_over_limit_sorts_descending() {
        let input = vec![
            RawSeries::new("A", 5.0),
            RawSeries::new("B", 50.0),
            RawSeries::new("C", 1.0),
            RawSeries::new("D", 20.0),
        ];

        let result = category_totals(&input, 3);
        assert_eq!(
            result,
            vec![
                CategoryTotal {
                    name: "B".into(),
                    value: 50.0,
                },
                CategoryTotal {
                    name: "D".into(),
                    value: 20.0,
                },
                CategoryTotal {
                    name: "Others".into(),
                    value: 6.0,
                },
            ]
        );
    }

    #[test]
    fn test_ties_keep_input_order() {
        let input = vec![
            RawSeries::new("First", 10.0),
            RawSeries::new("Second", 10.0),
            RawSeries::new("Third", 10.0),
            RawSeries::new("Fourth", 10.0),
        ];

        let result = category_totals(&input, 3);
        assert_eq!(result[0].name, "First");
        assert_eq!(result[1].name, "Second");
        assert_eq!(result[2].name, OTHERS_LABEL);
        assert_eq!(result[2].value, 20.0);
    }

    #[test]
    fn test_non_positive_totals_are_dropped() {
        let input = vec![
            RawSeries::new("Zero", 0.0),
            RawSeries::new("Negative", -40.0),
            RawSeries::new("Cancels", vec![10.0, -10.0]),
            RawSeries::new("Empty", Vec::<f64>::new()),
            RawSeries::new("Kept", vec![1.0, 2.0]),
        ];

        let totals = category_totals(&input, DEFAULT_MAX_CATEGORIES);
        assert_eq!(
            totals,
            vec![CategoryTotal {
                name: "Kept".into(),
                value: 3.0,
            }]
        );

        let lines = line_series(&input, &axis(2), DEFAULT_MAX_CATEGORIES);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].name, "Kept");
    }

    #[test]
    fn test_zero_filter_applies_before_limit() {
        let mut input = descending_scalars(8);
        input.push(RawSeries::new("Idle1", 0.0));
        input.push(RawSeries::new("Idle2", 0.0));

        let result = category_totals(&input, DEFAULT_MAX_CATEGORIES);
        assert_eq!(result.len(), 8);
        assert!(result.iter().all(|c| c.name != OTHERS_LABEL));
    }

    #[test]
    fn test_empty_input() {
        assert!(category_totals(&[], DEFAULT_MAX_CATEGORIES).is_empty());
        assert!(line_series(&[], &axis(3), DEFAULT_MAX_CATEGORIES).is_empty());
    }

    #[test]
    fn test_line_series_pass_through() {
        let input = vec![
            RawSeries::new("Income", vec![50000.0, 55000.0, 60000.0]),
            RawSeries::new("Expenses", vec![30000.0, 32000.0, 35000.0]),
        ];
        let dates = vec!["Jan".to_string(), "Feb".to_string(), "Mar".to_string()];

        let result = line_series(&input, &dates, DEFAULT_MAX_CATEGORIES);
        assert_eq!(
            result,
            vec![
                LineSeries {
                    name: "Income".into(),
                    values: vec![50000.0, 55000.0, 60000.0],
                },
                LineSeries {
                    name: "Expenses".into(),
                    values: vec![30000.0, 32000.0, 35000.0],
                },
            ]
        );
    }

    #[test]
    fn test_line_series_others_element_wise() {
        let input = vec![
            RawSeries::new("A", vec![10.0, 10.0, 10.0]),
            RawSeries::new("B", vec![1.0, 2.0, 3.0]),
            RawSeries::new("C", vec![100.0, 0.0, 0.0]),
            RawSeries::new("D", vec![4.0]),
        ];

        let result = line_series(&input, &axis(3), 3);
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].name, "C");
        assert_eq!(result[1].name, "A");
        assert_eq!(result[2].name, OTHERS_LABEL);
        // B + D, with D zero-padded past its first position
        assert_eq!(result[2].values, vec![5.0, 2.0, 3.0]);
    }

    #[test]
    fn test_line_series_others_without_axis_uses_longest_dropped() {
        let input = vec![
            RawSeries::new("Big", vec![100.0, 100.0]),
            RawSeries::new("Short", vec![1.0]),
            RawSeries::new("Long", vec![1.0, 1.0, 1.0]),
        ];

        let result = line_series(&input, &[], 2);
        assert_eq!(result.len(), 2);
        assert_eq!(result[1].values, vec![2.0, 1.0, 1.0]);
    }

    #[test]
    fn test_line_series_span_the_date_axis() {
        let dates = axis(4);

        let within = line_series(&[RawSeries::new("Short", vec![5.0, 5.0])], &dates, 8);
        assert_eq!(within[0].values, vec![5.0, 5.0, 0.0, 0.0]);

        let input = vec![
            RawSeries::new("Big", vec![100.0, 100.0]),
            RawSeries::new("A", vec![1.0; 4]),
            RawSeries::new("B", vec![1.0; 4]),
            RawSeries::new("Long", vec![0.5; 6]),
        ];
        let folded = line_series(&input, &dates, 2);
        assert_eq!(folded.len(), 2);
        assert_eq!(folded[0].name, "Big");
        assert_eq!(folded[0].values, vec![100.0, 100.0, 0.0, 0.0]);
        assert_eq!(folded[1].values, vec![2.5, 2.5, 2.5, 2.5]);
        assert!(folded.iter().all(|line| line.values.len() == dates.len()));

        let truncated = line_series(&input[3..], &dates, 8);
        assert_eq!(truncated[0].values, vec![0.5; 4]);
    }

    #[test]
    fn test_line_series_skips_scalars() {
        let input = vec![
            RawSeries::new("Flat", 500.0),
            RawSeries::new("Trend", vec![1.0, f64::NAN, 3.0]),
        ];

        let result = line_series(&input, &axis(3), DEFAULT_MAX_CATEGORIES);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].values, vec![1.0, 0.0, 3.0]);
    }

    #[test]
    fn test_max_categories_zero_behaves_as_one() {
        let input = vec![RawSeries::new("A", 3.0), RawSeries::new("B", 4.0)];

        let result = category_totals(&input, 0);
        assert_eq!(
            result,
            vec![CategoryTotal {
                name: "Others".into(),
                value: 7.0,
            }]
        );

        let single = category_totals(&input[..1], 0);
        assert_eq!(
            single,
            vec![CategoryTotal {
                name: "A".into(),
                value: 3.0,
            }]
        );
    }

    #[test]
    fn test_idempotent() {
        let input = descending_scalars(12);
        assert_eq!(category_totals(&input, 5), category_totals(&input, 5));

        let lines: Vec<RawSeries> = (0..10)
            .map(|i| RawSeries::new(format!("S{}", i), vec![i as f64 + 1.0; 4]))
            .collect();
        assert_eq!(
            line_series(&lines, &axis(4), 4),
            line_series(&lines, &axis(4), 4)
        );
    }

    #[test]
    fn test_policy_defaults() {
        let policy = AggregationPolicy::default();
        assert_eq!(policy.max_categories, 8);

        let input = descending_scalars(9);
        assert_eq!(policy.category_totals(&input), category_totals(&input, 8));
        assert_eq!(AggregationPolicy::new(3).category_totals(&input).len(), 3);
    }
}
