//! Classification of raw JSON-shaped metadata into [`MetadataValue`]s.

use log::debug;
use serde_json::{Map, Number, Value};

use super::error::ValueError;
use super::types::{
    ArrayValue, AuxArray, CompositeKind, CompositeValue, MetadataMap, MetadataValue, Scalar,
};
use crate::report::{Diagnostic, Diagnostics};

/// Classify a raw value, discarding any diagnostics
pub fn classify(raw: &Value) -> Result<MetadataValue, ValueError> {
    let mut diagnostics = Diagnostics::new();
    classify_at("", raw, &mut diagnostics)
}

/// Classify a raw value found at `path`, recording coercions into `diagnostics`
///
/// Arrays whose elements disagree on type are upgraded to float when every
/// element has a numeric reading (`null` becomes NaN). Only when that fallback
/// also fails is the value rejected.
pub fn classify_at(
    path: &str,
    raw: &Value,
    diagnostics: &mut Diagnostics,
) -> Result<MetadataValue, ValueError> {
    match raw {
        Value::Null => Ok(MetadataValue::Null),
        Value::Bool(b) => Ok(Scalar::Bool(*b).into()),
        Value::Number(n) => Ok(number_scalar(n).into()),
        Value::String(s) => Ok(Scalar::String(s.clone()).into()),
        Value::Object(object) => match detect_composite(object) {
            Some(kind) => classify_composite(path, kind, object, diagnostics),
            None => classify_object(path, object, diagnostics).map(MetadataValue::Map),
        },
        Value::Array(items) => classify_array(path, items, diagnostics),
    }
}

/// Classify a raw value that must be a map; `null` yields an empty map
pub fn classify_map(
    path: &str,
    raw: &Value,
    diagnostics: &mut Diagnostics,
) -> Result<MetadataMap, ValueError> {
    match raw {
        Value::Object(object) => classify_object(path, object, diagnostics),
        Value::Null => Ok(MetadataMap::new()),
        other => Err(ValueError::NotAMap {
            path: path.to_string(),
            found: json_type_name(other),
        }),
    }
}

/// Number of array dimensions of a raw value
///
/// Scalars and maps are 0-dimensional. Ragged nested arrays count as one
/// dimension, matching how they would be stored as a flat list of objects.
pub fn dimensionality(raw: &Value) -> usize {
    match raw {
        Value::Array(items) => array_shape(items).map(|shape| shape.len()).unwrap_or(1),
        _ => 0,
    }
}

/// Join a parent key path and a child key with a dot
pub fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn classify_object(
    path: &str,
    object: &Map<String, Value>,
    diagnostics: &mut Diagnostics,
) -> Result<MetadataMap, ValueError> {
    let mut map = MetadataMap::new();
    for (key, value) in object {
        let child = join_path(path, key);
        map.insert(key.clone(), classify_at(&child, value, diagnostics)?);
    }
    Ok(map)
}

fn classify_array(
    path: &str,
    items: &[Value],
    diagnostics: &mut Diagnostics,
) -> Result<MetadataValue, ValueError> {
    if items.is_empty() {
        return Ok(ArrayValue::new(Vec::new()).into());
    }

    if items.iter().all(Value::is_object) {
        let maps = items
            .iter()
            .enumerate()
            .map(|(i, item)| classify_map(&format!("{}-{}", path, i), item, diagnostics))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(MetadataValue::ListOfMaps(maps));
    }
    if items.iter().any(Value::is_object) {
        return Err(ValueError::MixedContainer {
            path: path.to_string(),
        });
    }

    let shape = array_shape(items).ok_or_else(|| ValueError::Ragged {
        path: path.to_string(),
    })?;
    let mut leaves = Vec::new();
    collect_leaves(items, &mut leaves);

    if shape.len() > 1 {
        return classify_multidimensional(path, shape, &leaves);
    }

    let mut scalars = Vec::with_capacity(leaves.len());
    for leaf in &leaves {
        scalars.push(match leaf {
            Value::Null => None,
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Number(n) => Some(number_scalar(n)),
            Value::String(s) => Some(Scalar::String(s.clone())),
            Value::Array(_) | Value::Object(_) => {
                return Err(ValueError::MixedContainer {
                    path: path.to_string(),
                })
            }
        });
    }

    if let Some(direct) = scalars.iter().cloned().collect::<Option<Vec<Scalar>>>() {
        let array = ArrayValue::with_shape(shape.clone(), direct)?;
        if array.kind().is_some() {
            return Ok(array.into());
        }
    }

    // Inconsistent element types: widen everything to float
    let floats = scalars
        .iter()
        .map(|s| match s {
            None => Some(f64::NAN),
            Some(s) => s.to_f64(),
        })
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(|| ValueError::Heterogeneous {
            path: path.to_string(),
        })?;

    debug!("Coerced heterogeneous array at '{}' to float", path);
    diagnostics.push(Diagnostic::coerced(path));
    let array = ArrayValue::with_shape(shape, floats.into_iter().map(Scalar::Float).collect())?;
    Ok(array.into())
}

/// N-D arrays keep their shape but are never stored, so element types are
/// not checked. Nulls read as NaN and map leaves as their JSON text.
fn classify_multidimensional(
    path: &str,
    shape: Vec<usize>,
    leaves: &[&Value],
) -> Result<MetadataValue, ValueError> {
    debug!("Array at '{}' has {} dimensions", path, shape.len());
    let elements = leaves
        .iter()
        .map(|leaf| match leaf {
            Value::Null => Scalar::Float(f64::NAN),
            Value::Bool(b) => Scalar::Bool(*b),
            Value::Number(n) => number_scalar(n),
            Value::String(s) => Scalar::String(s.clone()),
            other => Scalar::String(other.to_string()),
        })
        .collect();
    Ok(ArrayValue::with_shape(shape, elements)?.into())
}

fn classify_composite(
    path: &str,
    kind: CompositeKind,
    object: &Map<String, Value>,
    diagnostics: &mut Diagnostics,
) -> Result<MetadataValue, ValueError> {
    let mut fields = MetadataMap::new();
    let mut aux = None;

    for (key, value) in object {
        if key == kind.aux_field() {
            if let Value::Array(rows) = value {
                if let Some((shape, data)) = numeric_matrix(rows) {
                    aux = Some(AuxArray {
                        field: key.clone(),
                        shape,
                        data,
                    });
                    continue;
                }
            }
        }
        let child = join_path(path, key);
        fields.insert(key.clone(), classify_at(&child, value, diagnostics)?);
    }

    Ok(MetadataValue::Composite(CompositeValue { kind, fields, aux }))
}

fn detect_composite(object: &Map<String, Value>) -> Option<CompositeKind> {
    CompositeKind::ALL.into_iter().find(|kind| {
        let names = kind.field_names();
        object.len() == names.len()
            && names.iter().all(|name| object.contains_key(*name))
            && matches!(
                object.get(kind.aux_field()),
                Some(Value::Array(rows)) if numeric_matrix(rows).is_some()
            )
    })
}

/// Rectangular 2-D numeric array (nulls read as NaN)
fn numeric_matrix(rows: &[Value]) -> Option<(Vec<usize>, Vec<f64>)> {
    let shape = array_shape(rows)?;
    if shape.len() != 2 || shape.iter().any(|&n| n == 0) {
        return None;
    }
    let mut leaves = Vec::new();
    collect_leaves(rows, &mut leaves);
    let data = leaves
        .into_iter()
        .map(|leaf| match leaf {
            Value::Number(n) => n.as_f64(),
            Value::Null => Some(f64::NAN),
            _ => None,
        })
        .collect::<Option<Vec<f64>>>()?;
    Some((shape, data))
}

/// Shape of a nested array, `None` when ragged
fn array_shape(items: &[Value]) -> Option<Vec<usize>> {
    let mut shape = vec![items.len()];
    let first = match items.first() {
        Some(Value::Array(inner)) => inner,
        _ => {
            if items.iter().any(Value::is_array) {
                return None;
            }
            return Some(shape);
        }
    };

    let inner_shape = array_shape(first)?;
    for item in items {
        match item {
            Value::Array(inner) if array_shape(inner).as_deref() == Some(&inner_shape[..]) => {}
            _ => return None,
        }
    }
    shape.extend(inner_shape);
    Some(shape)
}

fn collect_leaves<'a>(items: &'a [Value], out: &mut Vec<&'a Value>) {
    for item in items {
        match item {
            Value::Array(inner) => collect_leaves(inner, out),
            other => out.push(other),
        }
    }
}

fn number_scalar(n: &Number) -> Scalar {
    match n.as_i64() {
        Some(i) => Scalar::Int(i),
        None => Scalar::Float(n.as_f64().unwrap_or(f64::NAN)),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
