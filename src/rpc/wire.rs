//! Wire shapes for the request/response protocol.
//!
//! Every call-related envelope carries a [`CallPayload`]: an internally
//! tagged object whose `kind` is `request`, `response` or `error`, with
//! camelCase keys. The envelope tag repeats the kind so receivers can
//! route without decoding the payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::channel::Envelope;
use crate::error::{Error, ErrorKind};
use crate::types::RequestId;

/// Payload of a call-related envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CallPayload {
    /// A command invocation, answered by `Response` or `Error` with the
    /// same correlation id.
    #[serde(rename_all = "camelCase")]
    Request {
        /// Pairs this request with its eventual answer.
        correlation_id: RequestId,
        /// The command to run on the far side.
        command: String,
        /// Command arguments.
        args: Value,
    },
    /// A successful answer.
    #[serde(rename_all = "camelCase")]
    Response {
        /// Id of the request being answered.
        correlation_id: RequestId,
        /// The command's result.
        result: Value,
    },
    /// A failure answer.
    #[serde(rename_all = "camelCase")]
    Error {
        /// Id of the request being answered.
        correlation_id: RequestId,
        /// What went wrong.
        error: WireError,
    },
}

impl CallPayload {
    /// Returns the envelope tag for this payload.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Request { .. } => "request",
            Self::Response { .. } => "response",
            Self::Error { .. } => "error",
        }
    }

    /// Returns the correlation id this payload carries.
    #[must_use]
    pub const fn correlation_id(&self) -> RequestId {
        match self {
            Self::Request { correlation_id, .. }
            | Self::Response { correlation_id, .. }
            | Self::Error { correlation_id, .. } => *correlation_id,
        }
    }

    /// Wraps this payload in an envelope tagged with its kind.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the payload fails to serialize.
    pub fn into_envelope(self) -> Result<Envelope, Error> {
        let tag = self.tag();
        let payload = serde_json::to_value(&self)
            .map_err(|err| Error::internal(format!("call payload encode failed: {err}")))?;
        Ok(Envelope::new(tag, payload))
    }

    /// Decodes a call payload from an envelope.
    ///
    /// # Errors
    ///
    /// Returns a malformed-frame error when the payload does not have the
    /// call shape.
    pub fn from_envelope(envelope: &Envelope) -> Result<Self, Error> {
        serde_json::from_value(envelope.payload.clone())
            .map_err(|err| Error::malformed_frame(format!("call payload decode failed: {err}")))
    }
}

/// The error shape that travels on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireError {
    /// Human-readable description.
    pub message: String,
    /// Status code, when the failure has one.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<u16>,
}

impl WireError {
    /// Builds the wire shape of a local error.
    #[must_use]
    pub fn from_error(error: &Error) -> Self {
        Self {
            message: error.to_string(),
            status: error.status(),
        }
    }

    /// Rebuilds a local error from the wire shape.
    ///
    /// Remote failures stay remote: whatever kind the far side had, the
    /// near side sees a remote error, with the status code when present.
    #[must_use]
    pub fn into_error(self) -> Error {
        match self.status {
            Some(status) => Error::remote(status, self.message),
            None => Error::new(ErrorKind::Remote).with_message(self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_wire_shape_is_camel_case() {
        let payload = CallPayload::Request {
            correlation_id: RequestId::from_raw(1),
            command: "generate".to_string(),
            args: json!({"quota": 10}),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({
                "kind": "request",
                "correlationId": 1,
                "command": "generate",
                "args": {"quota": 10},
            })
        );
    }

    #[test]
    fn response_round_trips_through_envelope() {
        let payload = CallPayload::Response {
            correlation_id: RequestId::from_raw(2),
            result: json!([2, 3, 5]),
        };
        let envelope = payload.clone().into_envelope().unwrap();
        assert_eq!(envelope.tag, "response");
        assert_eq!(CallPayload::from_envelope(&envelope).unwrap(), payload);
    }

    #[test]
    fn error_payload_keeps_status() {
        let payload = CallPayload::Error {
            correlation_id: RequestId::from_raw(3),
            error: WireError {
                message: "not found".to_string(),
                status: Some(404),
            },
        };
        let envelope = payload.into_envelope().unwrap();
        let decoded = CallPayload::from_envelope(&envelope).unwrap();
        let CallPayload::Error { error, .. } = decoded else {
            panic!("expected error payload");
        };
        let local = error.into_error();
        assert_eq!(local.status(), Some(404));
        assert!(local.is_remote());
    }

    #[test]
    fn non_call_payload_is_malformed() {
        let envelope = Envelope::new("request", json!({"kind": "bogus"}));
        let err = CallPayload::from_envelope(&envelope).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedFrame);
    }
}
