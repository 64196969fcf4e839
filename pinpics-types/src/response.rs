use serde::{Deserialize, Serialize};

use crate::enums::Status;

/// Envelope returned by every API endpoint
///
/// Failures keep the same shape (`status: "error"`) so clients can surface
/// `message` directly to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: Status,
    pub message: String,
    #[serde(default = "none", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

fn none<T>() -> Option<T> {
    None
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            data: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// Payload of a successful response, `None` for anything else
    pub fn into_success_data(self) -> Option<T> {
        if self.is_success() {
            self.data
        } else {
            None
        }
    }
}

impl ApiResponse<()> {
    /// Successful response without payload
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_omits_data() {
        let response: ApiResponse<i32> = ApiResponse::error("nope");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "nope");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_envelope_without_data_deserializes() {
        let response: ApiResponse<Vec<i32>> =
            serde_json::from_str(r#"{"status":"success","message":"done"}"#).unwrap();
        assert!(response.is_success());
        assert_eq!(response.data, None);
    }

    #[test]
    fn test_into_success_data_drops_error_payload() {
        let response = ApiResponse {
            status: Status::Error,
            message: "failed".to_string(),
            data: Some(5),
        };
        assert_eq!(response.into_success_data(), None);
        assert_eq!(ApiResponse::success("ok", 5).into_success_data(), Some(5));
    }
}
