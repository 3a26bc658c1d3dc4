//! Failure model: turning whatever a task threw into a transport-safe shape.
//!
//! A task can fail with a Rust error, with some JSON it got back from a
//! remote call, or with an error that is already normalized. All three end
//! up as a [`NormalizedError`] `{kind, message, data}` before they are stored
//! in an ERROR result. Normalization is total: it never panics and never
//! returns an error, worst case it stringifies the input.
//!
//! # Kind mapping
//! - Rust errors: the error's type name without module path or generic
//!   arguments (`app::jobs::RuntimeFailure<u8>` -> `RuntimeFailure`).
//! - JSON objects: the first string among `kind`, `name`, `code`.
//! - Everything else: `"Error"`.
//!
//! A JSON `{kind, message}` pair without `data` still counts as normalized;
//! it comes back out with an empty `"data": {}`.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Default kind when nothing better can be found.
pub const DEFAULT_ERROR_KIND: &str = "Error";

/// Keys inspected (in order) to find the kind of a JSON error object.
const KIND_KEYS: [&str; 3] = ["kind", "name", "code"];

/// Serializable error description carried by an ERROR result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NormalizedError {
    kind: String,
    message: String,

    /// Auxiliary context. Empty when there is none.
    #[serde(default)]
    data: Map<String, Value>,
}

impl NormalizedError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            data: Map::new(),
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }
}

impl fmt::Display for NormalizedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// What a task hands over when it fails.
///
/// Any `std::error::Error` converts into `TaskFailure`, so task code can use
/// `?` freely. The Rust error itself is not kept: only its type name,
/// message and source chain are captured, since error values are generally
/// neither `Clone` nor serializable.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskFailure {
    /// Already in wire shape; stored unchanged.
    Normalized(NormalizedError),

    /// Captured from a Rust error.
    Exception {
        kind: String,
        message: String,
        causes: Vec<String>,
    },

    /// Arbitrary JSON (null, a plain string, an error object from elsewhere, ...).
    Value(Value),
}

impl<E> From<E> for TaskFailure
where
    E: std::error::Error + 'static,
{
    fn from(error: E) -> Self {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }

        Self::Exception {
            kind: short_type_name(std::any::type_name::<E>()).to_string(),
            message: error.to_string(),
            causes,
        }
    }
}

impl TaskFailure {
    pub fn normalized(error: NormalizedError) -> Self {
        Self::Normalized(error)
    }

    pub fn value(value: Value) -> Self {
        Self::Value(value)
    }

    pub fn exception(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Exception {
            kind: kind.into(),
            message: message.into(),
            causes: Vec::new(),
        }
    }

    /// Classify raw JSON: a strict `{kind, message, data?}` triple is taken as
    /// already normalized, anything else is kept as a raw value.
    pub fn from_json(value: Value) -> Self {
        match NormalizedError::deserialize(&value) {
            Ok(normalized) => Self::Normalized(normalized),
            Err(_) => Self::Value(value),
        }
    }

    pub fn is_normalized(&self) -> bool {
        matches!(self, Self::Normalized(_))
    }

    /// Convert into the wire shape.
    pub fn normalize(self) -> NormalizedError {
        match self {
            Self::Normalized(error) => error,
            Self::Exception {
                kind,
                message,
                causes,
            } => {
                let mut error = NormalizedError::new(kind, message);
                if !causes.is_empty() {
                    let causes = causes.into_iter().map(Value::String).collect();
                    error.data.insert("causes".to_string(), Value::Array(causes));
                }
                error
            }
            Self::Value(value) => normalize_value(value),
        }
    }
}

impl Serialize for TaskFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.clone().normalize().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TaskFailure {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_json)
    }
}

fn normalize_value(value: Value) -> NormalizedError {
    match value {
        Value::String(message) => NormalizedError::new(DEFAULT_ERROR_KIND, message),
        Value::Object(map) => normalize_object(map),
        other => {
            tracing::warn!(value = %other, "error value is not an object, stringifying it");
            NormalizedError::new(DEFAULT_ERROR_KIND, other.to_string())
        }
    }
}

fn normalize_object(mut map: Map<String, Value>) -> NormalizedError {
    let fallback_message = if map.contains_key("message") {
        None
    } else {
        Some(Value::Object(map.clone()).to_string())
    };

    let kind = KIND_KEYS
        .iter()
        .find_map(|key| match map.get(*key) {
            Some(Value::String(s)) => Some((*key, s.clone())),
            _ => None,
        })
        .map(|(key, kind)| {
            map.remove(key);
            kind
        })
        .unwrap_or_else(|| DEFAULT_ERROR_KIND.to_string());

    let message = match (map.remove("message"), fallback_message) {
        (Some(Value::String(s)), _) => s,
        (Some(other), _) => other.to_string(),
        (None, Some(text)) => {
            tracing::warn!(kind = %kind, "error object has no message, stringifying it");
            text
        }
        (None, None) => String::new(),
    };

    let mut data = match map.remove("data") {
        Some(Value::Object(data)) => data,
        Some(other) => {
            let mut data = Map::new();
            data.insert("data".to_string(), other);
            data
        }
        None => Map::new(),
    };
    for (key, value) in map {
        data.entry(key).or_insert(value);
    }

    NormalizedError {
        kind,
        message,
        data,
    }
}

/// `a::b::Name<c::D>` -> `Name`
fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
