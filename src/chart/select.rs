//! Picks the columns to plot and turns them into numeric series

use log::debug;
use serde_json::Value;
use thiserror::Error;

use crate::record::{Record, compare_values, display_value};

/// Errors when choosing or reading the columns to plot
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("No records found in input. Did the input contain any data?")]
    NoRecords,
    #[error("The first record has no columns")]
    NoColumns,
    #[error("Unknown column {reference:?}. Available columns: {}", .available.join(", "))]
    UnknownColumn {
        reference: String,
        available: Vec<String>,
    },
    #[error("No numeric columns to plot. Available columns: {}", .available.join(", "))]
    NoSeriesColumns { available: Vec<String> },
    #[error("Value {value:?} in row {row}, column {column:?} is not a number")]
    NonNumeric {
        row: usize,
        column: String,
        value: String,
    },
}

/// Which columns to plot and how to order the rows
#[derive(Debug, Default)]
pub struct SelectionOptions<'a> {
    /// Column (name or index) holding the x-axis values
    pub x_axis: Option<&'a str>,
    /// Columns (names or indices) to plot, in order. Empty selects every numeric column.
    pub series: &'a [String],
    /// Sort the rows by the x-axis
    pub sort: bool,
}

/// One column as numbers
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

/// The series to plot, with the first and last x-axis labels when an x-axis was chosen
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub series: Vec<Series>,
    pub x_labels: Option<(String, String)>,
}

/// Reads a value as a finite number: JSON numbers as is, strings if they parse
fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Resolves a column reference by exact name first, then as a zero-based index
fn resolve_column(reference: &str, columns: &[String]) -> Result<String, SelectionError> {
    if columns.iter().any(|c| c == reference) {
        return Ok(reference.to_string());
    }
    reference
        .parse::<usize>()
        .ok()
        .and_then(|idx| columns.get(idx))
        .cloned()
        .ok_or_else(|| SelectionError::UnknownColumn {
            reference: reference.to_string(),
            available: columns.to_vec(),
        })
}

fn x_label(record: Option<&Record>, column: &str) -> String {
    record
        .and_then(|r| r.get(column))
        .map(display_value)
        .unwrap_or_default()
}

/// Chooses the series to plot from all parsed records
pub fn select_series(
    mut records: Vec<Record>,
    options: &SelectionOptions,
) -> Result<Selection, SelectionError> {
    let first = records.first().ok_or(SelectionError::NoRecords)?;
    let columns: Vec<String> = first.keys().cloned().collect();
    if columns.is_empty() {
        return Err(SelectionError::NoColumns);
    }

    let mut candidates = columns.clone();
    let x_axis = match options.x_axis {
        Some(reference) => {
            let x_axis = resolve_column(reference, &columns)?;
            candidates.retain(|c| *c != x_axis);
            if options.sort {
                // stable, so rows with equal x values keep their order
                records.sort_by(|a, b| {
                    compare_values(
                        a.get(&x_axis).unwrap_or(&Value::Null),
                        b.get(&x_axis).unwrap_or(&Value::Null),
                    )
                });
            }
            Some(x_axis)
        }
        None => None,
    };

    let selected: Vec<String> = if options.series.is_empty() {
        let first = &records[0];
        candidates
            .into_iter()
            .filter(|c| first.get(c).and_then(as_number).is_some())
            .collect()
    } else {
        options
            .series
            .iter()
            .map(|reference| resolve_column(reference, &columns))
            .collect::<Result<_, _>>()?
    };
    if selected.is_empty() {
        return Err(SelectionError::NoSeriesColumns { available: columns });
    }
    debug!("Plotting columns {:?} against {:?}", selected, x_axis);

    let series = selected
        .into_iter()
        .map(|column| -> Result<Series, SelectionError> {
            let values = records
                .iter()
                .enumerate()
                .map(|(row, record)| {
                    let value = record.get(&column).unwrap_or(&Value::Null);
                    as_number(value).ok_or_else(|| SelectionError::NonNumeric {
                        row,
                        column: column.clone(),
                        value: display_value(value),
                    })
                })
                .collect::<Result<Vec<f64>, _>>()?;
            Ok(Series {
                name: column,
                values,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let x_labels = x_axis.map(|column| {
        (
            x_label(records.first(), &column),
            x_label(records.last(), &column),
        )
    });
    Ok(Selection { series, x_labels })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn records(values: Value) -> Vec<Record> {
        match values {
            Value::Array(rows) => rows
                .into_iter()
                .map(|row| match row {
                    Value::Object(map) => map.into_iter().collect(),
                    other => panic!("Expected an object, got {other}"),
                })
                .collect(),
            other => panic!("Expected an array, got {other}"),
        }
    }

    fn sample() -> Vec<Record> {
        records(json!([
            {"date": "2021-03-01", "value": "3", "name": "c", "count": 30},
            {"date": "2021-01-01", "value": "1", "name": "a", "count": 10},
            {"date": "2021-02-01", "value": "2", "name": "b", "count": 20},
        ]))
    }

    fn series(name: &str, values: &[f64]) -> Series {
        Series {
            name: name.to_string(),
            values: values.to_vec(),
        }
    }

    #[test]
    fn test_auto_selects_numeric_columns() {
        let selection = select_series(sample(), &SelectionOptions::default()).unwrap();
        assert_eq!(
            selection,
            Selection {
                series: vec![series("value", &[3.0, 1.0, 2.0]), series("count", &[30.0, 10.0, 20.0])],
                x_labels: None,
            }
        );
    }

    #[test]
    fn test_sort_by_x_axis() {
        let options = SelectionOptions {
            x_axis: Some("date"),
            sort: true,
            ..Default::default()
        };
        let selection = select_series(sample(), &options).unwrap();
        assert_eq!(selection.series[0], series("value", &[1.0, 2.0, 3.0]));
        assert_eq!(
            selection.x_labels,
            Some(("2021-01-01".to_string(), "2021-03-01".to_string()))
        );
    }

    #[test]
    fn test_sort_is_stable() {
        let rows = records(json!([
            {"x": 2, "y": 1},
            {"x": 1, "y": 2},
            {"x": 2, "y": 3},
            {"x": 1, "y": 4},
        ]));
        let options = SelectionOptions {
            x_axis: Some("x"),
            sort: true,
            ..Default::default()
        };
        let selection = select_series(rows, &options).unwrap();
        assert_eq!(selection.series, vec![series("y", &[2.0, 4.0, 1.0, 3.0])]);
    }

    #[test]
    fn test_sort_by_nanosecond_timestamps() {
        let rows = records(json!([
            {"t": 1_700_000_000_000_000_001u64, "v": 1},
            {"t": 1_700_000_000_000_000_000u64, "v": 2},
        ]));
        let options = SelectionOptions {
            x_axis: Some("t"),
            sort: true,
            ..Default::default()
        };
        let selection = select_series(rows, &options).unwrap();
        assert_eq!(selection.series, vec![series("v", &[2.0, 1.0])]);
        assert_eq!(
            selection.x_labels,
            Some((
                "1700000000000000000".to_string(),
                "1700000000000000001".to_string()
            ))
        );
    }

    #[test]
    fn test_explicit_series_by_name_and_index() {
        let requested = vec!["count".to_string(), "1".to_string()];
        let options = SelectionOptions {
            x_axis: Some("0"),
            series: &requested,
            sort: false,
        };
        let selection = select_series(sample(), &options).unwrap();
        let names: Vec<_> = selection.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["count", "value"]);
        assert_eq!(
            selection.x_labels,
            Some(("2021-03-01".to_string(), "2021-02-01".to_string()))
        );
    }

    #[test]
    fn test_unknown_columns() {
        let options = SelectionOptions {
            x_axis: Some("missing"),
            ..Default::default()
        };
        let err = select_series(sample(), &options).unwrap_err();
        assert!(matches!(err, SelectionError::UnknownColumn { .. }));
        assert!(err.to_string().contains("date, value, name, count"));

        let requested = vec!["9".to_string()];
        let options = SelectionOptions {
            series: &requested,
            ..Default::default()
        };
        assert!(matches!(
            select_series(sample(), &options),
            Err(SelectionError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(matches!(
            select_series(Vec::new(), &SelectionOptions::default()),
            Err(SelectionError::NoRecords)
        ));
        assert!(matches!(
            select_series(vec![Record::new()], &SelectionOptions::default()),
            Err(SelectionError::NoColumns)
        ));
        let rows = records(json!([{"name": "a"}]));
        assert!(matches!(
            select_series(rows, &SelectionOptions::default()),
            Err(SelectionError::NoSeriesColumns { .. })
        ));
    }

    #[test]
    fn test_x_axis_is_not_a_series() {
        let rows = records(json!([{"x": 1, "y": 2}]));
        let options = SelectionOptions {
            x_axis: Some("x"),
            ..Default::default()
        };
        let selection = select_series(rows, &options).unwrap();
        assert_eq!(selection.series, vec![series("y", &[2.0])]);
    }

    #[test]
    fn test_non_numeric_value() {
        let rows = records(json!([
            {"value": "1"},
            {"value": "n/a"},
        ]));
        let err = select_series(rows, &SelectionOptions::default()).unwrap_err();
        match err {
            SelectionError::NonNumeric { row, column, value } => {
                assert_eq!(row, 1);
                assert_eq!(column, "value");
                assert_eq!(value, "n/a");
            }
            other => panic!("Expected a non-numeric error, got {other:?}"),
        }

        let rows = records(json!([{"value": "NaN"}]));
        assert!(select_series(rows, &SelectionOptions::default()).is_err());
    }
}
