//! Response envelopes.
//!
//! Successful calls answer `{"data": ...}`; failures answer
//! `{"error": {"code": ..., "message": ..., "fields": {...}}}`.

use crate::ClientError;
use duka_commerce::validation::FieldErrors;
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(default)]
    fields: FieldErrors,
}

/// Decode a response body given its status.
pub(crate) fn decode<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, ClientError> {
    if (200..300).contains(&status) {
        let envelope: DataEnvelope<T> = serde_json::from_slice(body)?;
        return Ok(envelope.data);
    }
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) => Err(ClientError::Api {
            status,
            code: envelope.error.code,
            message: envelope.error.message,
            fields: envelope.error.fields,
        }),
        Err(_) => Err(ClientError::Api {
            status,
            code: "http_error".to_string(),
            message: String::from_utf8_lossy(body).trim().to_string(),
            fields: FieldErrors::new(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_data() {
        let value: Vec<i32> = decode(200, br#"{"data": [1, 2]}"#).unwrap();
        assert_eq!(value, vec![1, 2]);
    }

    #[test]
    fn test_decode_error_envelope() {
        let body = br#"{"error": {"code": "validation", "message": "Check the form",
                        "fields": {"phone": "Phone number is required"}}}"#;
        let err = decode::<serde_json::Value>(400, body).unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.user_message(), "Check the form");
        assert_eq!(err.fields().unwrap().get("phone"), Some("Phone number is required"));
    }

    #[test]
    fn test_decode_plain_text_error() {
        let err = decode::<serde_json::Value>(502, b"Bad Gateway\n").unwrap_err();
        match err {
            ClientError::Api { status, code, message, .. } => {
                assert_eq!(status, 502);
                assert_eq!(code, "http_error");
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_success_with_wrong_shape_is_parse_error() {
        let err = decode::<Vec<i32>>(200, br#"{"items": []}"#).unwrap_err();
        assert!(matches!(err, ClientError::Parse(_)));
    }
}
