//! Typed data fields of a step or template.
//!
//! The engine describes each field with a numeric type code and an access
//! mode. Caller-supplied values arrive loosely typed and are coerced into a
//! [`FieldValue`] variant matching the declared type before anything is
//! written.

use super::ValidationError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Declared type of a data field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Whole number (wire code 1).
    Integer,
    /// Free text (wire code 2).
    Text,
    /// Date and time (wire code 16).
    DateTime,
    /// Any other engine type; kept so the body round-trips, never written.
    Unsupported(u32),
}

impl FieldType {
    const INTEGER_CODE: u32 = 1;
    const TEXT_CODE: u32 = 2;
    const DATE_TIME_CODE: u32 = 16;

    /// Maps a wire type code to a field type.
    #[must_use]
    pub const fn from_code(code: u32) -> Self {
        match code {
            Self::INTEGER_CODE => Self::Integer,
            Self::TEXT_CODE => Self::Text,
            Self::DATE_TIME_CODE => Self::DateTime,
            other => Self::Unsupported(other),
        }
    }

    /// Returns the wire type code.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Integer => Self::INTEGER_CODE,
            Self::Text => Self::TEXT_CODE,
            Self::DateTime => Self::DATE_TIME_CODE,
            Self::Unsupported(code) => code,
        }
    }

    /// Returns a human-readable type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Text => "text",
            Self::DateTime => "date/time",
            Self::Unsupported(_) => "unsupported",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "integer" | "int" => Some(Self::Integer),
            "string" | "text" => Some(Self::Text),
            "time" | "date" | "datetime" | "date/time" => Some(Self::DateTime),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.code())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawFieldType {
            Code(u32),
            Name(String),
        }

        match RawFieldType::deserialize(deserializer)? {
            RawFieldType::Code(code) => Ok(Self::from_code(code)),
            RawFieldType::Name(name) => Self::from_name(&name)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown field type '{name}'"))),
        }
    }
}

/// Access mode bits of a data field: read (1), write (2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMode(u8);

impl FieldMode {
    /// Readable only.
    pub const READ: Self = Self(1);
    /// Writable only.
    pub const WRITE: Self = Self(2);
    /// Readable and writable.
    pub const READ_WRITE: Self = Self(3);

    /// Creates a mode from raw wire bits.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Returns the raw wire bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` when the client may write this field.
    #[must_use]
    pub const fn is_writable(self) -> bool {
        self.0 & Self::WRITE.0 != 0
    }
}

impl Default for FieldMode {
    fn default() -> Self {
        Self::READ_WRITE
    }
}

/// A value of one of the writable field types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Value of an integer field.
    Integer(i64),
    /// Value of a text field.
    Text(String),
    /// Value of a date/time field.
    DateTime(DateTime<Utc>),
}

impl FieldValue {
    /// Coerces a loosely typed input into the variant for `declared`.
    ///
    /// Integers must be JSON integers, text must be a JSON string, and
    /// date/time values must be RFC 3339 strings. No other conversions are
    /// attempted.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::FieldType`] on a type mismatch and
    /// [`ValidationError::UnsupportedFieldType`] when the declared type cannot
    /// be written.
    pub fn coerce(field: &str, declared: FieldType, input: &Value) -> Result<Self, ValidationError> {
        let mismatch = || ValidationError::FieldType {
            field: field.to_owned(),
            expected: declared,
        };
        match declared {
            FieldType::Integer => input.as_i64().map(Self::Integer).ok_or_else(mismatch),
            FieldType::Text => input
                .as_str()
                .map(|text| Self::Text(text.to_owned()))
                .ok_or_else(mismatch),
            FieldType::DateTime => input
                .as_str()
                .and_then(|text| DateTime::parse_from_rfc3339(text.trim()).ok())
                .map(|parsed| Self::DateTime(parsed.with_timezone(&Utc)))
                .ok_or_else(mismatch),
            FieldType::Unsupported(code) => Err(ValidationError::UnsupportedFieldType {
                field: field.to_owned(),
                code,
            }),
        }
    }

    /// Returns the field type this value belongs to.
    #[must_use]
    pub const fn field_type(&self) -> FieldType {
        match self {
            Self::Integer(_) => FieldType::Integer,
            Self::Text(_) => FieldType::Text,
            Self::DateTime(_) => FieldType::DateTime,
        }
    }

    /// Renders the value in its wire form.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Integer(number) => Value::from(*number),
            Self::Text(text) => Value::String(text.clone()),
            Self::DateTime(instant) => {
                Value::String(instant.to_rfc3339_opts(SecondsFormat::Secs, true))
            }
        }
    }
}

/// A declared data field with its current value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataField {
    #[serde(rename = "type")]
    field_type: FieldType,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    mode: FieldMode,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    modified: bool,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl DataField {
    /// Creates an empty field declaration.
    #[must_use]
    pub fn new(field_type: FieldType, mode: FieldMode) -> Self {
        Self {
            field_type,
            value: Value::Null,
            mode,
            modified: false,
            extra: Map::new(),
        }
    }

    /// Sets the current value without marking the field modified.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    /// Returns the declared type.
    #[must_use]
    pub const fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Returns the access mode.
    #[must_use]
    pub const fn mode(&self) -> FieldMode {
        self.mode
    }

    /// Returns the raw wire value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the current value as a typed variant, when it is set and
    /// matches the declared type.
    #[must_use]
    pub fn typed_value(&self) -> Option<FieldValue> {
        if self.value.is_null() {
            return None;
        }
        FieldValue::coerce("", self.field_type, &self.value).ok()
    }

    /// Returns `true` when the value was changed by this client.
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    pub(crate) fn assign(&mut self, value: &FieldValue) {
        self.value = value.to_json();
        self.modified = true;
    }
}
