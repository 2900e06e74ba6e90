//! Untyped argument bags and typed extraction

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::FunctionError;
use crate::param::VolumeMounts;

/// A value passed to a function by key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ArgValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Array(Vec<ArgValue>),
    Object(HashMap<String, ArgValue>),
    Null,
}

pub type Args = HashMap<String, ArgValue>;

impl ArgValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ArgValue::Null)
    }

    /// Name used in type mismatch messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ArgValue::String(_) => "a string",
            ArgValue::Number(_) => "a number",
            ArgValue::Boolean(_) => "a boolean",
            ArgValue::Array(_) => "an array",
            ArgValue::Object(_) => "an object",
            ArgValue::Null => "null",
        }
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        ArgValue::String(s)
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::String(s.to_string())
    }
}

impl From<bool> for ArgValue {
    fn from(b: bool) -> Self {
        ArgValue::Boolean(b)
    }
}

impl From<f64> for ArgValue {
    fn from(n: f64) -> Self {
        ArgValue::Number(n)
    }
}

impl From<i32> for ArgValue {
    fn from(n: i32) -> Self {
        ArgValue::Number(n as f64)
    }
}

impl<T: Into<ArgValue>> From<Vec<T>> for ArgValue {
    fn from(items: Vec<T>) -> Self {
        ArgValue::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<VolumeMounts> for ArgValue {
    fn from(map: VolumeMounts) -> Self {
        ArgValue::Object(
            map.into_iter()
                .map(|(k, v)| (k, ArgValue::String(v)))
                .collect(),
        )
    }
}

/// Conversion from an [`ArgValue`] into a typed argument
pub trait FromArgValue: Sized {
    const EXPECTED: &'static str;

    fn from_arg_value(value: &ArgValue) -> Option<Self>;
}

impl FromArgValue for ArgValue {
    const EXPECTED: &'static str = "any value";

    fn from_arg_value(value: &ArgValue) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromArgValue for String {
    const EXPECTED: &'static str = "a string";

    fn from_arg_value(value: &ArgValue) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromArgValue for bool {
    const EXPECTED: &'static str = "a boolean";

    fn from_arg_value(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Boolean(b) => Some(*b),
            ArgValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl FromArgValue for f64 {
    const EXPECTED: &'static str = "a number";

    fn from_arg_value(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl FromArgValue for i64 {
    const EXPECTED: &'static str = "an integer";

    fn from_arg_value(value: &ArgValue) -> Option<Self> {
        match value {
            // i64::MAX rounds up to 2^63 as an f64, so the upper bound is exclusive
            ArgValue::Number(n)
                if n.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(n) =>
            {
                Some(*n as i64)
            }
            _ => None,
        }
    }
}

impl FromArgValue for Vec<String> {
    const EXPECTED: &'static str = "an array of strings";

    fn from_arg_value(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Array(items) => items.iter().map(String::from_arg_value).collect(),
            _ => None,
        }
    }
}

impl FromArgValue for VolumeMounts {
    const EXPECTED: &'static str = "a map of strings";

    fn from_arg_value(value: &ArgValue) -> Option<Self> {
        match value {
            ArgValue::Object(map) => map
                .iter()
                .map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                .collect(),
            _ => None,
        }
    }
}

impl FromArgValue for HashMap<String, String> {
    const EXPECTED: &'static str = "a map of strings";

    fn from_arg_value(value: &ArgValue) -> Option<Self> {
        VolumeMounts::from_arg_value(value).map(|m| m.into_iter().collect())
    }
}

fn present<'a>(args: &'a Args, name: &str) -> Option<&'a ArgValue> {
    args.get(name).filter(|v| !v.is_null())
}

fn coerce<T: FromArgValue>(name: &str, value: &ArgValue) -> Result<T, FunctionError> {
    T::from_arg_value(value).ok_or_else(|| FunctionError::TypeMismatch {
        name: name.to_string(),
        expected: T::EXPECTED,
        found: value.type_name(),
    })
}

/// Reads a required argument. Absent and null values are both missing.
pub fn arg<T: FromArgValue>(args: &Args, name: &str) -> Result<T, FunctionError> {
    let value = present(args, name).ok_or_else(|| FunctionError::missing_argument(name))?;
    coerce(name, value)
}

/// Reads an optional argument, falling back to `default` when absent or null
pub fn opt_arg<T: FromArgValue>(args: &Args, name: &str, default: T) -> Result<T, FunctionError> {
    match present(args, name) {
        Some(value) => coerce(name, value),
        None => Ok(default),
    }
}
