//! # Shaping Profile Model
//!
//! A shaping profile is the set of traffic-control parameters the shaping
//! service applies to one address. This crate treats the parameters as
//! opaque JSON beyond requiring an upstream (`up`) and a downstream (`down`)
//! entry.
//!
//! Profiles arrive in one of two encodings:
//! * **raw**: the document *is* the parameter object, e.g. `{"up": {..}, "down": {..}}`.
//!   This is also the shape the service returns for a single address.
//! * **named**: the parameters are wrapped under `content`, as exported by a
//!   profile repository, e.g. `{"name": "3G", "content": {"up": {..}, "down": {..}}}`.
//!
//! Both are resolved once, at decode time, into the same [`ShapingProfile`].

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ShapingError;

const REQUIRED_KEYS: [&str; 2] = ["up", "down"];
const NAMED_CONTENT_KEY: &str = "content";

/// Encoding of a profile document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileFormat {
    /// The document is the parameter object itself.
    Raw,
    /// The parameter object sits under the `content` key.
    #[default]
    Named,
}

impl FromStr for ProfileFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "raw" => Ok(ProfileFormat::Raw),
            "named" => Ok(ProfileFormat::Named),
            other => Err(format!("unknown profile format '{other}' (expected 'raw' or 'named')")),
        }
    }
}

impl fmt::Display for ProfileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileFormat::Raw => f.write_str("raw"),
            ProfileFormat::Named => f.write_str("named"),
        }
    }
}

/// A validated, immutable set of shaping parameters.
///
/// Can only be built through [`ShapingProfile::decode`] (or
/// [`ShapingProfile::from_slice`]), so every value carries both `up` and `down`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ShapingProfile {
    parameters: Map<String, Value>,
}

impl ShapingProfile {
    /// Builds a profile from an already parsed document.
    ///
    /// # Errors
    /// [`ShapingError::InvalidProfile`] if `content` is missing under
    /// [`ProfileFormat::Named`], if the parameters are not a JSON object, or
    /// if `up` or `down` is missing.
    pub fn decode(document: Value, format: ProfileFormat) -> Result<Self, ShapingError> {
        let parameters = match format {
            ProfileFormat::Raw => document,
            ProfileFormat::Named => unwrap_content(document)?,
        };

        let Value::Object(parameters) = parameters else {
            return Err(ShapingError::InvalidProfile(format!(
                "parameters must be a JSON object, got {}",
                json_kind(&parameters)
            )));
        };

        for key in REQUIRED_KEYS {
            if !parameters.contains_key(key) {
                return Err(ShapingError::InvalidProfile(format!(
                    "missing required parameter '{key}'"
                )));
            }
        }

        Ok(Self { parameters })
    }

    /// Parses JSON bytes and decodes them with [`ShapingProfile::decode`].
    pub fn from_slice(bytes: &[u8], format: ProfileFormat) -> Result<Self, ShapingError> {
        let document: Value = serde_json::from_slice(bytes)
            .map_err(|e| ShapingError::InvalidProfile(format!("malformed JSON: {e}")))?;

        Self::decode(document, format)
    }

    pub fn parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }

    /// Multi-line rendering of the parameters, used when logging existing profiles.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.parameters).unwrap_or_else(|_| format!("{:?}", self.parameters))
    }
}

fn unwrap_content(document: Value) -> Result<Value, ShapingError> {
    match document {
        Value::Object(mut wrapper) => wrapper.remove(NAMED_CONTENT_KEY).ok_or_else(|| {
            ShapingError::InvalidProfile(format!(
                "named profile has no '{NAMED_CONTENT_KEY}' field"
            ))
        }),
        other => Err(ShapingError::InvalidProfile(format!(
            "named profile must be a JSON object, got {}",
            json_kind(&other)
        ))),
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

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
