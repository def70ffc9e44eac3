use crate::value::{Document, FieldValue, Number, Scalar, ValueError};
use serde_json::{Map, Value as JsonValue};

impl Document {
    /// Convert a JSON object into a document, keeping key order.
    ///
    /// Only scalars and flat arrays of scalars are accepted.
    pub fn from_json(value: &JsonValue) -> Result<Self, ValueError> {
        let JsonValue::Object(map) = value else {
            return Err(ValueError::NotAnObject {
                found: json_kind(value),
            });
        };

        let mut doc = Self::new();
        for (name, value) in map {
            doc.insert(name.clone(), FieldValue::from_json(name, value)?)?;
        }

        Ok(doc)
    }

    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let map = self
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_json()))
            .collect::<Map<_, _>>();

        JsonValue::Object(map)
    }
}

impl TryFrom<JsonValue> for Document {
    type Error = ValueError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        Self::from_json(&value)
    }
}

impl FieldValue {
    fn from_json(field: &str, value: &JsonValue) -> Result<Self, ValueError> {
        match value {
            JsonValue::Array(items) => items
                .iter()
                .map(|item| match item {
                    JsonValue::Array(_) => Err(ValueError::NestedArray {
                        field: field.to_string(),
                    }),
                    other => Scalar::from_json(field, other),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Array),
            other => Scalar::from_json(field, other).map(Self::Scalar),
        }
    }

    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Scalar(scalar) => scalar.to_json(),
            Self::Array(items) => JsonValue::Array(items.iter().map(Scalar::to_json).collect()),
        }
    }
}

impl Scalar {
    fn from_json(field: &str, value: &JsonValue) -> Result<Self, ValueError> {
        match value {
            JsonValue::Null => Ok(Self::Null),
            JsonValue::Bool(v) => Ok(Self::Bool(*v)),
            JsonValue::Number(n) => {
                let v = n.as_f64().ok_or(ValueError::NonFiniteNumber(f64::NAN))?;
                Number::new(v).map(Self::Number)
            }
            JsonValue::String(v) => Ok(Self::Text(v.clone())),
            JsonValue::Object(_) => Err(ValueError::NestedObject {
                field: field.to_string(),
            }),
            JsonValue::Array(_) => Err(ValueError::NestedArray {
                field: field.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(v) => JsonValue::Bool(*v),
            Self::Number(v) => number_to_json(*v),
            Self::Text(v) => JsonValue::String(v.clone()),
        }
    }
}

// Integral values go back out as JSON integers so `{"age": 3}` round-trips.
#[expect(clippy::cast_possible_truncation)]
fn number_to_json(number: Number) -> JsonValue {
    let v = number.get();
    if v.fract() == 0.0 && v.abs() <= 9_007_199_254_740_991.0 {
        return JsonValue::from(v as i64);
    }

    serde_json::Number::from_f64(v).map_or(JsonValue::Null, JsonValue::Number)
}

const fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
