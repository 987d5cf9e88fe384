use crate::core::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use std::{
    any::type_name,
    ops::{Deref, DerefMut},
};
use thiserror::Error;
use uuid::Uuid;

/// Failure to turn a populated cell into the leaf it was bound to.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("cannot store NULL into {target}")]
    UnexpectedNull { target: &'static str },

    #[error("cannot convert {found} value into {target}")]
    Mismatch {
        target: &'static str,
        found: &'static str,
    },

    #[error("value {value} is out of range for {target}")]
    OutOfRange { target: &'static str, value: String },

    #[error("invalid json payload: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConversionError {
    fn mismatch<T>(value: &Value) -> Self {
        match value {
            Value::Null => ConversionError::UnexpectedNull {
                target: type_name::<T>(),
            },
            other => ConversionError::Mismatch {
                target: type_name::<T>(),
                found: other.kind(),
            },
        }
    }
}

/// Conversion from a row source's native cell into a typed leaf.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, ConversionError>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        Ok(value)
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::String(s) => Ok(s),
            other => other
                .as_string()
                .ok_or_else(|| ConversionError::mismatch::<String>(&other)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        value
            .as_bool()
            .ok_or_else(|| ConversionError::mismatch::<bool>(&value))
    }
}

macro_rules! integer_from_value {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self, ConversionError> {
                    let wide = value
                        .as_i128()
                        .ok_or_else(|| ConversionError::mismatch::<$ty>(&value))?;
                    <$ty>::try_from(wide).map_err(|_| ConversionError::OutOfRange {
                        target: type_name::<$ty>(),
                        value: wide.to_string(),
                    })
                }
            }
        )*
    };
}

integer_from_value!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        value
            .as_f64()
            .ok_or_else(|| ConversionError::mismatch::<f64>(&value))
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        value
            .as_f64()
            .map(|v| v as f32)
            .ok_or_else(|| ConversionError::mismatch::<f32>(&value))
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Json(json) => Ok(json),
            Value::Null => Ok(serde_json::Value::Null),
            Value::String(s) => Ok(serde_json::from_str(&s)?),
            Value::Bytes(b) => Ok(serde_json::from_slice(&b)?),
            other => Err(ConversionError::mismatch::<serde_json::Value>(&other)),
        }
    }
}

impl FromValue for Uuid {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Uuid(v) => Ok(v),
            Value::String(ref s) => {
                Uuid::parse_str(s).map_err(|_| ConversionError::mismatch::<Uuid>(&value))
            }
            other => Err(ConversionError::mismatch::<Uuid>(&other)),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Date(v) => Ok(v),
            Value::Timestamp(v) => Ok(v.date_naive()),
            Value::String(ref s) => s
                .parse::<NaiveDate>()
                .map_err(|_| ConversionError::mismatch::<NaiveDate>(&value)),
            other => Err(ConversionError::mismatch::<NaiveDate>(&other)),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Timestamp(v) => Ok(v),
            Value::String(ref s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| ConversionError::mismatch::<DateTime<Utc>>(&value)),
            other => Err(ConversionError::mismatch::<DateTime<Utc>>(&other)),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Timestamp(v) => Ok(v.naive_utc()),
            other => Err(ConversionError::mismatch::<NaiveDateTime>(&other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Box<T> {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        T::from_value(value).map(Box::new)
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::StringArray(items) => items
                .into_iter()
                .map(|item| T::from_value(Value::String(item)))
                .collect(),
            Value::Bytes(bytes) => bytes
                .into_iter()
                .map(|byte| T::from_value(Value::Uint(byte as u64)))
                .collect(),
            Value::Json(serde_json::Value::Array(items)) => items
                .into_iter()
                .map(|item| T::from_value(Value::Json(item)))
                .collect(),
            other => Err(ConversionError::mismatch::<Vec<T>>(&other)),
        }
    }
}

/// Leaf wrapper for structured payloads that the row source hands over as
/// JSON (or JSON text) and that are decoded with serde.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Json<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T: DeserializeOwned> FromValue for Json<T> {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        let decoded = match value {
            Value::Json(json) => serde_json::from_value(json)?,
            Value::String(s) => serde_json::from_str(&s)?,
            Value::Bytes(b) => serde_json::from_slice(&b)?,
            other => return Err(ConversionError::mismatch::<T>(&other)),
        };
        Ok(Json(decoded))
    }
}
