//! The `ToolResult` envelope every invocation returns.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::ToolError;

/// Structured failure detail inside a `{ok:false, error:{...}}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResultError {
    /// Human-readable message.
    pub message: String,
    /// Machine-readable taxonomy code (see [`crate::error::ToolErrorCode`]).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Optional structured detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Tagged envelope every tool invocation returns: `{ok:true, data}` or
/// `{ok:false, error:{message, code?, details?}}`.
///
/// No runner exception, schema violation, timeout, or permission denial
/// ever crosses the engine boundary as a raised error. Everything is
/// normalized into this shape, which is why `Serialize` is implemented by
/// hand rather than derived: the wire shape cannot accidentally drift from
/// the two variants below.
#[derive(Debug, Clone)]
pub enum ToolResult {
    /// The tool ran and produced `data`.
    Ok {
        /// The tool's return value.
        data: Value,
    },
    /// The tool did not run, or ran and failed.
    Err {
        /// Normalized failure detail.
        error: ToolResultError,
    },
}

impl ToolResult {
    /// Build a success result.
    #[must_use]
    pub fn ok(data: Value) -> Self {
        Self::Ok { data }
    }

    /// Build a failure result with no code or detail.
    #[must_use]
    pub fn err(message: impl Into<String>) -> Self {
        Self::Err {
            error: ToolResultError {
                message: message.into(),
                code: None,
                details: None,
            },
        }
    }

    /// Whether this result is the success variant.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    /// The success payload, if any.
    #[must_use]
    pub const fn data(&self) -> Option<&Value> {
        match self {
            Self::Ok { data } => Some(data),
            Self::Err { .. } => None,
        }
    }
}

impl From<ToolError> for ToolResult {
    fn from(err: ToolError) -> Self {
        Self::Err {
            error: ToolResultError {
                message: err.message,
                code: Some(err.code.as_str().to_string()),
                details: err.details,
            },
        }
    }
}

impl Serialize for ToolResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        match self {
            Self::Ok { data } => {
                let mut s = serializer.serialize_struct("ToolResult", 2)?;
                s.serialize_field("ok", &true)?;
                s.serialize_field("data", data)?;
                s.end()
            }
            Self::Err { error } => {
                let mut s = serializer.serialize_struct("ToolResult", 2)?;
                s.serialize_field("ok", &false)?;
                s.serialize_field("error", error)?;
                s.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for ToolResult {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Wire {
            ok: bool,
            #[serde(default)]
            data: Value,
            #[serde(default)]
            error: Option<ToolResultError>,
        }
        let wire = Wire::deserialize(deserializer)?;
        if wire.ok {
            Ok(Self::Ok { data: wire.data })
        } else {
            Ok(Self::Err {
                error: wire.error.unwrap_or(ToolResultError {
                    message: "tool failed with no error detail".to_string(),
                    code: None,
                    details: None,
                }),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_serializes_to_envelope() {
        let result = ToolResult::ok(serde_json::json!({ "x": 1 }));
        let v = serde_json::to_value(&result).unwrap();
        assert_eq!(v, serde_json::json!({ "ok": true, "data": { "x": 1 } }));
    }

    #[test]
    fn err_serializes_to_envelope() {
        let result = ToolResult::from(crate::error::ToolError::not_found("fs.read"));
        let v = serde_json::to_value(&result).unwrap();
        assert_eq!(v["ok"], false);
        assert_eq!(v["error"]["code"], "not_found");
    }
}
