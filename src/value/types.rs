use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ValueError;

/// Element kind of a scalar or of a homogeneous array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Boolean flag
    Bool,
    /// 64-bit signed integer
    Int,
    /// 64-bit float
    Float,
    /// UTF-8 string
    String,
}

impl ScalarKind {
    /// Every scalar kind, in tag-table order
    pub const ALL: [ScalarKind; 4] = [
        ScalarKind::Bool,
        ScalarKind::Int,
        ScalarKind::Float,
        ScalarKind::String,
    ];

    /// Short lowercase name used in type tags and messages
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
            ScalarKind::String => "string",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single typed leaf value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Float value (non-finite values survive persistence)
    Float(#[serde(with = "float_repr")] f64),
    /// String value
    String(String),
}

impl Scalar {
    /// Kind of this scalar
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::Int(_) => ScalarKind::Int,
            Scalar::Float(_) => ScalarKind::Float,
            Scalar::String(_) => ScalarKind::String,
        }
    }

    /// Widen this scalar to a float, if it has a numeric reading
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Scalar::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(v) => Some(*v),
            Scalar::String(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// String content, if this is a string scalar
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// Render as a JSON value; non-finite floats become `null`
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Scalar::Bool(b) => serde_json::Value::Bool(*b),
            Scalar::Int(i) => serde_json::Value::from(*i),
            Scalar::Float(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Scalar::String(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::String(s) => write!(f, "{:?}", s),
        }
    }
}

/// A flat sequence of scalars with a logical shape
///
/// One-dimensional arrays have shape `[len]`. Higher-dimensional arrays are
/// representable so that the codec can recognize and skip them; only 1-D
/// homogeneous arrays are ever persisted as properties.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayValue {
    shape: Vec<usize>,
    elements: Vec<Scalar>,
}

impl ArrayValue {
    /// Create a 1-D array
    pub fn new(elements: Vec<Scalar>) -> Self {
        Self {
            shape: vec![elements.len()],
            elements,
        }
    }

    /// Create an array with an explicit row-major shape
    pub fn with_shape(shape: Vec<usize>, elements: Vec<Scalar>) -> Result<Self, ValueError> {
        let expected: usize = shape.iter().product();
        if expected != elements.len() {
            return Err(ValueError::ShapeMismatch {
                shape,
                expected,
                actual: elements.len(),
            });
        }
        Ok(Self { shape, elements })
    }

    /// 1-D float array
    pub fn from_floats(values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(values.into_iter().map(Scalar::Float).collect())
    }

    /// Logical shape
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of array dimensions
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Elements in row-major order
    pub fn elements(&self) -> &[Scalar] {
        &self.elements
    }

    /// Total element count
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True when the array holds no elements
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Common element kind, or `None` for empty or mixed arrays
    pub fn kind(&self) -> Option<ScalarKind> {
        let first = self.elements.first()?.kind();
        self.elements
            .iter()
            .all(|e| e.kind() == first)
            .then_some(first)
    }

    /// Kind of the first element
    pub fn leading_kind(&self) -> Option<ScalarKind> {
        self.elements.first().map(Scalar::kind)
    }

    /// Upgrade every element to float, keeping the shape
    ///
    /// Returns `None` if any element has no numeric reading.
    pub fn coerce_to_float(&self) -> Option<ArrayValue> {
        let elements = self
            .elements
            .iter()
            .map(|e| e.to_f64().map(Scalar::Float))
            .collect::<Option<Vec<_>>>()?;
        Some(Self {
            shape: self.shape.clone(),
            elements,
        })
    }

    /// Render as a (possibly nested) JSON array
    pub fn to_json(&self) -> serde_json::Value {
        nest_json(&self.shape, &self.elements, Scalar::to_json)
    }
}

/// Ordered map with unique keys
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataMap {
    entries: Vec<(String, MetadataValue)>,
}

impl MetadataMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value; an existing key keeps its position and the old value is returned
    pub fn insert(&mut self, key: impl Into<String>, value: MetadataValue) -> Option<MetadataValue> {
        let key = key.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(&mut slot.1, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Look up a value by key
    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// True if the key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the map has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as a JSON object, keeping key order
    pub fn to_json(&self) -> serde_json::Value {
        let object: serde_json::Map<String, serde_json::Value> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        serde_json::Value::Object(object)
    }
}

impl FromIterator<(String, MetadataValue)> for MetadataMap {
    fn from_iter<I: IntoIterator<Item = (String, MetadataValue)>>(iter: I) -> Self {
        let mut map = MetadataMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Structured domain objects with a dedicated section type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeKind {
    /// Coordinate frame transform: `from`/`to` frame ids and a `trans` matrix
    CoordTransform,
}

impl CompositeKind {
    /// Every known composite kind
    pub const ALL: [CompositeKind; 1] = [CompositeKind::CoordTransform];

    /// Section type tag identifying this kind in the store
    pub fn type_tag(&self) -> &'static str {
        match self {
            CompositeKind::CoordTransform => "coord-transform",
        }
    }

    /// Reverse of [`CompositeKind::type_tag`]
    pub fn from_type_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.type_tag() == tag)
    }

    /// All field names of the object, including the auxiliary field
    pub fn field_names(&self) -> &'static [&'static str] {
        match self {
            CompositeKind::CoordTransform => &["from", "to", "trans"],
        }
    }

    /// Name of the field held as an auxiliary array
    pub fn aux_field(&self) -> &'static str {
        match self {
            CompositeKind::CoordTransform => "trans",
        }
    }
}

/// Auxiliary numeric array owned by a composite value
#[derive(Debug, Clone, PartialEq)]
pub struct AuxArray {
    /// Field name the array is substituted for
    pub field: String,
    /// Row-major shape
    pub shape: Vec<usize>,
    /// Row-major values
    pub data: Vec<f64>,
}

impl AuxArray {
    /// Render as a nested JSON array
    pub fn to_json(&self) -> serde_json::Value {
        let scalars: Vec<Scalar> = self.data.iter().copied().map(Scalar::Float).collect();
        nest_json(&self.shape, &scalars, Scalar::to_json)
    }
}

/// A composite value: typed fields plus an optional auxiliary array
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeValue {
    /// Which domain object this is
    pub kind: CompositeKind,
    /// Plain fields (the auxiliary field excluded)
    pub fields: MetadataMap,
    /// Auxiliary array, persisted as a linked data array
    pub aux: Option<AuxArray>,
}

/// Tagged representation of any metadata value
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    /// Absent value; never stored
    Null,
    /// Single scalar
    Scalar(Scalar),
    /// Homogeneous (or to-be-coerced) array
    Array(ArrayValue),
    /// Nested map
    Map(MetadataMap),
    /// Ordered sequence of maps
    ListOfMaps(Vec<MetadataMap>),
    /// Named structured object
    Composite(CompositeValue),
}

impl MetadataValue {
    /// Short name of the variant, for diagnostics
    pub fn variant_name(&self) -> &'static str {
        match self {
            MetadataValue::Null => "null",
            MetadataValue::Scalar(_) => "scalar",
            MetadataValue::Array(_) => "array",
            MetadataValue::Map(_) => "map",
            MetadataValue::ListOfMaps(_) => "list-of-maps",
            MetadataValue::Composite(_) => "composite",
        }
    }

    /// Render back to a JSON value
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            MetadataValue::Null => serde_json::Value::Null,
            MetadataValue::Scalar(s) => s.to_json(),
            MetadataValue::Array(a) => a.to_json(),
            MetadataValue::Map(m) => m.to_json(),
            MetadataValue::ListOfMaps(items) => {
                serde_json::Value::Array(items.iter().map(MetadataMap::to_json).collect())
            }
            MetadataValue::Composite(c) => {
                let mut object = match c.fields.to_json() {
                    serde_json::Value::Object(object) => object,
                    _ => serde_json::Map::new(),
                };
                if let Some(aux) = &c.aux {
                    object.insert(aux.field.clone(), aux.to_json());
                }
                serde_json::Value::Object(object)
            }
        }
    }
}

impl From<Scalar> for MetadataValue {
    fn from(value: Scalar) -> Self {
        MetadataValue::Scalar(value)
    }
}

impl From<ArrayValue> for MetadataValue {
    fn from(value: ArrayValue) -> Self {
        MetadataValue::Array(value)
    }
}

impl From<MetadataMap> for MetadataValue {
    fn from(value: MetadataMap) -> Self {
        MetadataValue::Map(value)
    }
}

fn nest_json<T>(
    shape: &[usize],
    items: &[T],
    render: fn(&T) -> serde_json::Value,
) -> serde_json::Value {
    match shape {
        [] | [_] => serde_json::Value::Array(items.iter().map(render).collect()),
        [rows, rest @ ..] => {
            let stride: usize = rest.iter().product();
            let nested = (0..*rows)
                .map(|r| nest_json(rest, &items[r * stride..(r + 1) * stride], render))
                .collect();
            serde_json::Value::Array(nested)
        }
    }
}

/// Serde adapter writing non-finite floats as `"NaN"`, `"inf"` and `"-inf"`
pub(crate) mod float_repr {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value.is_infinite() {
            serializer.serialize_str(if *value > 0.0 { "inf" } else { "-inf" })
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Number(v) => Ok(v),
            Repr::Text(text) => match text.as_str() {
                "NaN" => Ok(f64::NAN),
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                other => Err(D::Error::custom(format!("invalid float literal '{}'", other))),
            },
        }
    }
}
