//! Property descriptors and the `Entity` declaration trait

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::graph::PropertyValue;

/// Declared value type of a mapped property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "point")]
    Point,
    #[serde(rename = "date[]")]
    DateArray,
    #[serde(rename = "string[]")]
    StringArray,
    #[serde(rename = "number[]")]
    NumberArray,
    #[serde(rename = "boolean[]")]
    BooleanArray,
}

impl DataType {
    pub const ALL: [DataType; 9] = [
        DataType::String,
        DataType::Number,
        DataType::Boolean,
        DataType::Date,
        DataType::Point,
        DataType::DateArray,
        DataType::StringArray,
        DataType::NumberArray,
        DataType::BooleanArray,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Boolean => "boolean",
            DataType::Date => "date",
            DataType::Point => "point",
            DataType::DateArray => "date[]",
            DataType::StringArray => "string[]",
            DataType::NumberArray => "number[]",
            DataType::BooleanArray => "boolean[]",
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(
            self,
            DataType::DateArray
                | DataType::StringArray
                | DataType::NumberArray
                | DataType::BooleanArray
        )
    }

    /// Element type of an array type; scalars return themselves
    pub fn element_type(&self) -> DataType {
        match self {
            DataType::DateArray => DataType::Date,
            DataType::StringArray => DataType::String,
            DataType::NumberArray => DataType::Number,
            DataType::BooleanArray => DataType::Boolean,
            scalar => *scalar,
        }
    }

    /// Whether `value` has this declared shape. `Null` matches every type.
    ///
    /// Not applied by the mapper on writes; available for callers that want
    /// to check bags against their declarations.
    pub fn accepts(&self, value: &PropertyValue) -> bool {
        match (self, value) {
            (_, PropertyValue::Null) => true,
            (DataType::String, PropertyValue::String(_)) => true,
            (DataType::Number, PropertyValue::Integer(_) | PropertyValue::Float(_)) => true,
            (DataType::Boolean, PropertyValue::Boolean(_)) => true,
            (DataType::Date, PropertyValue::DateTime(_) | PropertyValue::String(_)) => true,
            (DataType::Point, PropertyValue::Point(_)) => true,
            (array, PropertyValue::Array(items)) if array.is_array() => {
                let element = array.element_type();
                items.iter().all(|item| !item.is_null() && element.accepts(item))
            }
            _ => false,
        }
    }
}

impl DataType {
    /// Restore a value read back from the server to its declared shape.
    ///
    /// The HTTP endpoint renders temporal values as strings, so `date` and
    /// `date[]` properties are parsed back into `DateTime`. Values that do not
    /// parse, and every other type, pass through unchanged.
    pub fn coerce(&self, value: PropertyValue) -> PropertyValue {
        match (self, value) {
            (DataType::Date, PropertyValue::String(text)) => {
                PropertyValue::parse_datetime(&text).unwrap_or(PropertyValue::String(text))
            }
            (DataType::DateArray, PropertyValue::Array(items)) => PropertyValue::Array(
                items.into_iter().map(|item| DataType::Date.coerce(item)).collect(),
            ),
            (_, value) => value,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown data type: {}", s))
    }
}

/// Metadata for one declared property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// Logical name
    pub name: String,
    /// Declared value type
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<PropertyValue>,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            primary: false,
            unique: false,
            required: false,
            default: None,
        }
    }

    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<PropertyValue>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// A Rust type mapped to a node label.
///
/// ```
/// use neo4u::model::{DataType, Entity, PropertyDescriptor};
///
/// struct Person;
///
/// impl Entity for Person {
///     const LABEL: &'static str = "Person";
///
///     fn properties() -> Vec<(&'static str, PropertyDescriptor)> {
///         vec![("name", PropertyDescriptor::new("name", DataType::String).primary())]
///     }
/// }
/// ```
pub trait Entity: 'static {
    /// Node label the type maps to
    const LABEL: &'static str;

    /// Declared properties, keyed by field name
    fn properties() -> Vec<(&'static str, PropertyDescriptor)> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Point;

    #[test]
    fn test_data_type_names() {
        for t in DataType::ALL {
            assert_eq!(t.as_str().parse::<DataType>().unwrap(), t);
            assert_eq!(t.to_string(), t.as_str());
        }
        assert!("uuid".parse::<DataType>().is_err());
        assert_eq!(serde_json::to_value(DataType::NumberArray).unwrap(), "number[]");
    }

    #[test]
    fn test_data_type_accepts() {
        assert!(DataType::String.accepts(&"x".into()));
        assert!(DataType::Number.accepts(&1.5.into()));
        assert!(DataType::Number.accepts(&3.into()));
        assert!(!DataType::Number.accepts(&"3".into()));
        assert!(DataType::Point.accepts(&Point::cartesian(0.0, 1.0).into()));
        assert!(DataType::StringArray.accepts(&vec!["a", "b"].into()));
        assert!(!DataType::StringArray.accepts(&vec![1, 2].into()));
        assert!(!DataType::StringArray.accepts(&"a".into()));
        assert!(DataType::Boolean.accepts(&PropertyValue::Null));
    }

    #[test]
    fn test_descriptor_builder() {
        let d = PropertyDescriptor::new("id", DataType::Number)
            .primary()
            .unique()
            .required()
            .with_default(0);
        assert!(d.primary && d.unique && d.required);
        assert_eq!(d.default, Some(PropertyValue::Integer(0)));

        let plain = PropertyDescriptor::new("name", DataType::String);
        assert!(!plain.primary && !plain.unique && !plain.required);
        assert!(plain.default.is_none());
    }

    #[test]
    fn test_descriptor_deserialize() {
        let json = serde_json::json!({ "name": "tags", "type": "string[]", "required": true });
        let d: PropertyDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(d.data_type, DataType::StringArray);
        assert!(d.required);
        assert!(!d.primary);
    }

    #[test]
    fn test_coerce_dates() {
        assert_eq!(
            DataType::Date.coerce("1970-01-01T00:00:02Z".into()),
            PropertyValue::DateTime(2000)
        );
        assert_eq!(
            DataType::DateArray.coerce(vec!["1970-01-01T00:00:00Z", "soon"].into()),
            PropertyValue::Array(vec![PropertyValue::DateTime(0), PropertyValue::from("soon")])
        );

        let text = PropertyValue::from("not a date");
        assert_eq!(DataType::Date.coerce(text.clone()), text);
        let stamp = PropertyValue::from("1970-01-01T00:00:00Z");
        assert_eq!(DataType::String.coerce(stamp.clone()), stamp);
        assert_eq!(DataType::Date.coerce(PropertyValue::Null), PropertyValue::Null);
    }
}
