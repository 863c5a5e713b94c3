//! Turns the nested per-location JSON of a weather source into a flat frame with one row
//! per location and timestamp.

use crate::error::WeatherInsightsError;
use crate::types::columns::{LATITUDE, LONGITUDE};
use crate::weather_data::error::{FetchError, SchemaError};
use crate::weather_data::source::{QueryParams, WeatherSource};
use log::debug;
use polars::prelude::*;
use serde_json::{Map, Value};

/// Requests `url` from `source` and normalizes the body, see [`normalize_response`].
pub async fn fetch_table(
    source: &dyn WeatherSource,
    url: &str,
    params: &QueryParams,
    required_fields: &[String],
    array_fields: &[String],
) -> Result<DataFrame, WeatherInsightsError> {
    let body = source.get_json(url, params).await?;
    normalize_response(&body, required_fields, array_fields)
}

/// Flattens `body` into a frame.
///
/// * `required_fields` are dotted paths (`hourly.temperature_2m`); only those are kept and each
///   column is named after the leaf of its path.
/// * `array_fields` are leaf names of the per-timestamp arrays. They are exploded together,
///   so position `i` of every array lands on the same row.
///
/// Latitude and longitude are kept as the exact number text the source sent.
pub fn normalize_response(
    body: &Value,
    required_fields: &[String],
    array_fields: &[String],
) -> Result<DataFrame, WeatherInsightsError> {
    let locations = flatten_locations(body)?;
    let leaf_names: Vec<&str> = required_fields.iter().map(|f| leaf_name(f)).collect();
    let is_array: Vec<bool> = leaf_names
        .iter()
        .map(|leaf| array_fields.iter().any(|a| a == leaf))
        .collect();

    let mut cells: Vec<Vec<Value>> = vec![Vec::new(); required_fields.len()];
    for (index, location) in locations.iter().enumerate() {
        let selected = required_fields
            .iter()
            .map(|field| {
                location
                    .get(field)
                    .ok_or_else(|| SchemaError::MissingColumn {
                        column: field.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let rows = exploded_length(index, &leaf_names, &is_array, &selected)?;
        for row in 0..rows {
            for (column, value) in selected.iter().enumerate() {
                let cell = match (is_array[column], value) {
                    (true, Value::Array(items)) => items[row].clone(),
                    _ => (*value).clone(),
                };
                cells[column].push(cell);
            }
        }
    }

    let columns = leaf_names
        .iter()
        .zip(cells)
        .map(|(name, values)| to_column(name, values))
        .collect::<Vec<_>>();
    let frame = DataFrame::new(columns).map_err(FetchError::from)?;
    debug!(
        "Normalized {} location(s) into {} row(s)",
        locations.len(),
        frame.height()
    );
    Ok(frame)
}

/// The part of a dotted path after the last dot.
pub fn leaf_name(path: &str) -> &str {
    path.rsplit_once('.').map_or(path, |(_, leaf)| leaf)
}

// A single-location request answers with an object, a multi-location one with an array.
fn flatten_locations(body: &Value) -> Result<Vec<Map<String, Value>>, FetchError> {
    let objects: Vec<&Value> = match body {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![body],
        other => {
            return Err(FetchError::UnexpectedShape {
                message: format!("expected an object or an array, got {}", json_kind(other)),
            })
        }
    };

    objects
        .into_iter()
        .map(|object| match object {
            Value::Object(_) => {
                let mut flat = Map::new();
                flatten_into("", object, &mut flat);
                Ok(flat)
            }
            other => Err(FetchError::UnexpectedShape {
                message: format!("expected a location object, got {}", json_kind(other)),
            }),
        })
        .collect()
}

fn flatten_into(prefix: &str, value: &Value, out: &mut Map<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(&path, inner, out);
            }
        }
        other => {
            out.insert(prefix.to_string(), other.clone());
        }
    }
}

// Rows produced by one location: the shared length of its exploded arrays, or 1 when
// nothing is exploded.
fn exploded_length(
    location: usize,
    leaf_names: &[&str],
    is_array: &[bool],
    selected: &[&Value],
) -> Result<usize, FetchError> {
    let mut length: Option<usize> = None;
    for ((name, exploded), value) in leaf_names.iter().zip(is_array).zip(selected) {
        if !exploded {
            continue;
        }
        let Value::Array(items) = value else {
            return Err(FetchError::UnexpectedShape {
                message: format!(
                    "field '{}' of location {} is {}, expected an array",
                    name,
                    location,
                    json_kind(value)
                ),
            });
        };
        match length {
            None => length = Some(items.len()),
            Some(expected) if expected != items.len() => {
                return Err(FetchError::UnexpectedShape {
                    message: format!(
                        "field '{}' of location {} has {} values, expected {}",
                        name,
                        location,
                        items.len(),
                        expected
                    ),
                })
            }
            Some(_) => {}
        }
    }
    Ok(length.unwrap_or(1))
}

fn to_column(name: &str, values: Vec<Value>) -> Column {
    if name == LATITUDE || name == LONGITUDE {
        let text: Vec<Option<String>> = values.into_iter().map(coordinate_text).collect();
        return Column::new(name.into(), text);
    }
    if values.iter().any(Value::is_string) {
        let text: Vec<Option<String>> = values
            .into_iter()
            .map(|value| match value {
                Value::Null => None,
                Value::String(s) => Some(s),
                other => Some(other.to_string()),
            })
            .collect();
        return Column::new(name.into(), text);
    }
    let numbers: Vec<Option<f64>> = values.iter().map(Value::as_f64).collect();
    Column::new(name.into(), numbers)
}

// serde_json prints numbers in their shortest round-trip form, identical for every row of a
// location and for the same grid point in a later request.
fn coordinate_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
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
