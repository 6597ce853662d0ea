//! Response Envelope
//!
//! Every JSON response is wrapped in the same envelope so clients can read
//! `resultCode` / `httpStatus` without inspecting transport status codes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const SUCCESS_CODE: &str = "SUCCESS";

/// Standard response envelope
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BaseResponse<T> {
    /// Stable machine-readable code ("SUCCESS" or an error code)
    pub result_code: String,

    /// Human-readable message
    pub message: String,

    /// Payload, absent on errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// HTTP status mirrored into the body
    pub http_status: u16,
}

impl<T> BaseResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            result_code: SUCCESS_CODE.to_string(),
            message: "success".to_string(),
            data: Some(data),
            http_status: 200,
        }
    }

    pub fn ok_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            result_code: SUCCESS_CODE.to_string(),
            message: message.into(),
            data: Some(data),
            http_status: 200,
        }
    }
}

impl BaseResponse<()> {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            result_code: SUCCESS_CODE.to_string(),
            message: message.into(),
            data: None,
            http_status: 200,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>, http_status: u16) -> Self {
        Self {
            result_code: code.into(),
            message: message.into(),
            data: None,
            http_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope_shape() {
        let response = BaseResponse::ok(serde_json::json!({"id": "01HZX0000000A"}));
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"resultCode\":\"SUCCESS\""));
        assert!(json.contains("\"httpStatus\":200"));
        assert!(json.contains("\"data\""));
    }

    #[test]
    fn test_error_envelope_omits_data() {
        let response = BaseResponse::error("DUPLICATE_LOGIN_ID", "login id already in use", 409);
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"resultCode\":\"DUPLICATE_LOGIN_ID\""));
        assert!(json.contains("\"httpStatus\":409"));
        assert!(!json.contains("\"data\""));
    }
}
