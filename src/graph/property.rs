//! Property value types for mapped nodes
//!
//! A node's data travels through the mapper as a [`PropertyMap`]: an
//! insertion-ordered bag of [`PropertyValue`]s. Ordering matters because the
//! key order of a filter bag is reflected in generated Cypher.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Property value type supporting multiple data types
///
/// Supports:
/// - String
/// - Integer (i64)
/// - Float (f64)
/// - Boolean
/// - DateTime (as i64 timestamp)
/// - Point (spatial coordinate)
/// - Array (Vec<PropertyValue>)
/// - Map (PropertyMap), used for parameter bundles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(i64), // Unix timestamp in milliseconds
    Point(Point),
    Array(Vec<PropertyValue>),
    Map(PropertyMap),
    Null,
}

/// A spatial point. `z` is set for 3D coordinate reference systems.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub srid: u32,
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl Point {
    /// SRID of the default 2D cartesian CRS.
    pub const CARTESIAN: u32 = 7203;
    /// SRID of the 3D cartesian CRS.
    pub const CARTESIAN_3D: u32 = 9157;
    /// SRID of WGS-84 (longitude/latitude).
    pub const WGS84: u32 = 4326;

    pub fn cartesian(x: f64, y: f64) -> Self {
        Point { srid: Self::CARTESIAN, x, y, z: None }
    }

    pub fn cartesian_3d(x: f64, y: f64, z: f64) -> Self {
        Point { srid: Self::CARTESIAN_3D, x, y, z: Some(z) }
    }

    pub fn wgs84(longitude: f64, latitude: f64) -> Self {
        Point { srid: Self::WGS84, x: longitude, y: latitude, z: None }
    }
}

impl PropertyValue {
    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    /// Get string value if this is a string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get integer value if this is an integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get float value if this is a float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get boolean value if this is a boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get datetime value if this is a datetime
    pub fn as_datetime(&self) -> Option<i64> {
        match self {
            PropertyValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    pub fn as_point(&self) -> Option<&Point> {
        match self {
            PropertyValue::Point(p) => Some(p),
            _ => None,
        }
    }

    /// Get array value if this is an array
    pub fn as_array(&self) -> Option<&Vec<PropertyValue>> {
        match self {
            PropertyValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Get map value if this is a map
    pub fn as_map(&self) -> Option<&PropertyMap> {
        match self {
            PropertyValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Get type name as string
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::String(_) => "String",
            PropertyValue::Integer(_) => "Integer",
            PropertyValue::Float(_) => "Float",
            PropertyValue::Boolean(_) => "Boolean",
            PropertyValue::DateTime(_) => "DateTime",
            PropertyValue::Point(_) => "Point",
            PropertyValue::Array(_) => "Array",
            PropertyValue::Map(_) => "Map",
            PropertyValue::Null => "Null",
        }
    }

    /// Parse an RFC 3339 timestamp into a `DateTime`
    pub fn parse_datetime(text: &str) -> Option<PropertyValue> {
        chrono::DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|dt| PropertyValue::DateTime(dt.timestamp_millis()))
    }

    /// Convert to the JSON shape the HTTP endpoint returns values in.
    ///
    /// Datetimes become RFC 3339 strings, points
    /// `{"type": "Point", "coordinates": [..], "crs": {..}}`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            PropertyValue::String(s) => serde_json::Value::String(s.clone()),
            PropertyValue::Integer(i) => serde_json::Value::from(*i),
            PropertyValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            PropertyValue::Boolean(b) => serde_json::Value::Bool(*b),
            PropertyValue::DateTime(ms) => chrono::DateTime::from_timestamp_millis(*ms)
                .map(|dt| serde_json::Value::String(dt.to_rfc3339()))
                .unwrap_or_else(|| serde_json::Value::from(*ms)),
            PropertyValue::Point(p) => {
                let mut coordinates = vec![p.x, p.y];
                if let Some(z) = p.z {
                    coordinates.push(z);
                }
                serde_json::json!({
                    "type": "Point",
                    "coordinates": coordinates,
                    "crs": { "srid": p.srid },
                })
            }
            PropertyValue::Array(arr) => {
                serde_json::Value::Array(arr.iter().map(PropertyValue::to_json).collect())
            }
            PropertyValue::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            PropertyValue::Null => serde_json::Value::Null,
        }
    }

    /// Convert to the JSON shape sent as a statement parameter.
    ///
    /// Points become `{"x", "y", ["z",] "srid"}` maps, the argument shape of
    /// Cypher's `point()`. Datetimes stay RFC 3339 strings for `datetime()`.
    /// Generated statements wrap both in those functions; a bare map is not a
    /// storable property value.
    pub fn to_parameter_json(&self) -> serde_json::Value {
        match self {
            PropertyValue::Point(p) => {
                let mut point = serde_json::Map::new();
                point.insert("x".to_string(), serde_json::Value::from(p.x));
                point.insert("y".to_string(), serde_json::Value::from(p.y));
                if let Some(z) = p.z {
                    point.insert("z".to_string(), serde_json::Value::from(z));
                }
                point.insert("srid".to_string(), serde_json::Value::from(p.srid));
                serde_json::Value::Object(point)
            }
            PropertyValue::Array(arr) => serde_json::Value::Array(
                arr.iter().map(PropertyValue::to_parameter_json).collect(),
            ),
            PropertyValue::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_parameter_json()))
                    .collect(),
            ),
            other => other.to_json(),
        }
    }

    /// Convert a JSON value returned by the server back into a property value.
    ///
    /// Integral numbers become `Integer`, other numbers `Float`. Objects in the
    /// point shape become `Point`; every other object becomes `Map`.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => PropertyValue::Null,
            serde_json::Value::Bool(b) => PropertyValue::Boolean(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => PropertyValue::Integer(i),
                None => PropertyValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => PropertyValue::String(s.clone()),
            serde_json::Value::Array(arr) => {
                PropertyValue::Array(arr.iter().map(PropertyValue::from_json).collect())
            }
            serde_json::Value::Object(obj) => match point_from_json(obj) {
                Some(point) => PropertyValue::Point(point),
                None => PropertyValue::Map(
                    obj.iter()
                        .map(|(k, v)| (k.clone(), PropertyValue::from_json(v)))
                        .collect(),
                ),
            },
        }
    }
}

fn point_from_json(obj: &serde_json::Map<String, serde_json::Value>) -> Option<Point> {
    if obj.get("type").and_then(|t| t.as_str()) != Some("Point") {
        return None;
    }
    let coordinates = obj.get("coordinates")?.as_array()?;
    let x = coordinates.first()?.as_f64()?;
    let y = coordinates.get(1)?.as_f64()?;
    let z = coordinates.get(2).and_then(|c| c.as_f64());
    let srid = obj
        .get("crs")
        .and_then(|crs| crs.get("srid"))
        .and_then(|s| s.as_u64())
        .map(|s| s as u32)
        .unwrap_or(if z.is_some() { Point::CARTESIAN_3D } else { Point::CARTESIAN });
    Some(Point { srid, x, y, z })
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => write!(f, "\"{}\"", s),
            PropertyValue::Integer(i) => write!(f, "{}", i),
            PropertyValue::Float(fl) => write!(f, "{}", fl),
            PropertyValue::Boolean(b) => write!(f, "{}", b),
            PropertyValue::DateTime(dt) => write!(f, "DateTime({})", dt),
            PropertyValue::Point(p) => match p.z {
                Some(z) => {
                    write!(f, "point({{srid: {}, x: {}, y: {}, z: {}}})", p.srid, p.x, p.y, z)
                }
                None => write!(f, "point({{srid: {}, x: {}, y: {}}})", p.srid, p.x, p.y),
            },
            PropertyValue::Array(arr) => {
                write!(f, "[")?;
                for (i, val) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", val)?;
                }
                write!(f, "]")
            }
            PropertyValue::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, val)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, val)?;
                }
                write!(f, "}}")
            }
            PropertyValue::Null => write!(f, "null"),
        }
    }
}

// Convenience conversions
impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Integer(i)
    }
}

impl From<i32> for PropertyValue {
    fn from(i: i32) -> Self {
        PropertyValue::Integer(i as i64)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Float(f)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Boolean(b)
    }
}

impl From<Point> for PropertyValue {
    fn from(p: Point) -> Self {
        PropertyValue::Point(p)
    }
}

impl<T: Into<PropertyValue>> From<Vec<T>> for PropertyValue {
    fn from(arr: Vec<T>) -> Self {
        PropertyValue::Array(arr.into_iter().map(Into::into).collect())
    }
}

impl From<PropertyMap> for PropertyValue {
    fn from(map: PropertyMap) -> Self {
        PropertyValue::Map(map)
    }
}

/// Property bag for a node: insertion-ordered name -> value mapping
pub type PropertyMap = IndexMap<String, PropertyValue>;

/// Errors converting between property bags and typed structs
#[derive(thiserror::Error, Debug)]
pub enum ConversionError {
    #[error("expected a struct-like value that serializes to a map, got {0}")]
    NotAMap(&'static str),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Build a [`PropertyMap`] from a typed value.
///
/// `None` fields serialize as `Null`.
pub fn to_properties<T: Serialize>(value: &T) -> Result<PropertyMap, ConversionError> {
    match serde_json::to_value(value)? {
        serde_json::Value::Object(obj) => Ok(obj
            .iter()
            .map(|(k, v)| (k.clone(), PropertyValue::from_json(v)))
            .collect()),
        other => Err(ConversionError::NotAMap(json_kind(&other))),
    }
}

/// Rebuild a typed value from a [`PropertyMap`].
pub fn from_properties<T: DeserializeOwned>(props: &PropertyMap) -> Result<T, ConversionError> {
    let obj: serde_json::Map<String, serde_json::Value> =
        props.iter().map(|(k, v)| (k.clone(), v.to_json())).collect();
    Ok(serde_json::from_value(serde_json::Value::Object(obj))?)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Build a [`PropertyMap`] literal, keeping key order.
///
/// ```
/// use neo4u::props;
/// let bag = props! { "name" => "Alice", "age" => 30 };
/// assert_eq!(bag.keys().collect::<Vec<_>>(), ["name", "age"]);
/// ```
#[macro_export]
macro_rules! props {
    () => { $crate::graph::PropertyMap::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::graph::PropertyMap::new();
        $(
            map.insert(
                ::std::string::String::from($key),
                $crate::graph::PropertyValue::from($value),
            );
        )+
        map
    }};
}
