//! CREOSON JSON envelope.
//!
//! Every call is a single POST carrying `sessionId`, `command`, `function` and an
//! optional `data` object. Replies carry a `status` block and an optional `data`
//! object holding the result fields.

use super::error::CreosonError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Serialize)]
pub(crate) struct Request<'a> {
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<&'a str>,
    pub command: &'static str,
    pub function: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Status {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Response {
    #[serde(default)]
    pub status: Status,
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Successful reply of one command/function pair.
#[derive(Debug)]
pub(crate) struct Reply {
    pub command: &'static str,
    pub function: &'static str,
    pub session_id: Option<String>,
    pub data: Value,
}

impl Response {
    /// Turn a raw reply into a `Reply`, surfacing `status.error` as a server error.
    pub fn into_reply(
        self,
        command: &'static str,
        function: &'static str,
    ) -> Result<Reply, CreosonError> {
        if self.status.error {
            return Err(CreosonError::Server {
                command,
                function,
                message: self
                    .status
                    .message
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }
        Ok(Reply {
            command,
            function,
            session_id: self.session_id,
            data: self.data.unwrap_or(Value::Null),
        })
    }
}

impl Reply {
    /// Decode a named result field.
    pub fn field<T: DeserializeOwned>(&self, field: &'static str) -> Result<T, CreosonError> {
        let value = self
            .data
            .get(field)
            .filter(|v| !v.is_null())
            .ok_or(CreosonError::MissingField {
                command: self.command,
                function: self.function,
                field,
            })?;
        serde_json::from_value(value.clone()).map_err(|source| CreosonError::Decode {
            command: self.command,
            function: self.function,
            field,
            source,
        })
    }

    /// Decode the whole `data` object.
    pub fn data<T: DeserializeOwned>(self) -> Result<T, CreosonError> {
        serde_json::from_value(self.data).map_err(|source| CreosonError::Decode {
            command: self.command,
            function: self.function,
            field: "data",
            source,
        })
    }
}

/// Builder for the `data` object; optional fields are left out instead of sent as null.
#[derive(Debug, Default)]
pub(crate) struct DataBuilder(Map<String, Value>);

impl DataBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn set_opt<V: Into<Value>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(key, v),
            None => self,
        }
    }

    pub fn build(self) -> Value {
        Value::Object(self.0)
    }
}
