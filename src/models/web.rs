use serde::{Deserialize, Serialize};

/// Response envelope shared by every `/api` endpoint.
///
/// Exactly one of `data` / `errors` is present; the other is left out of the
/// JSON entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<String>,
}

impl<T> WebResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            data: Some(data),
            errors: None,
        }
    }
}

impl WebResponse<()> {
    pub fn errors(message: impl Into<String>) -> Self {
        Self {
            data: None,
            errors: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_envelope() {
        let json = serde_json::to_string(&WebResponse::data("OK")).unwrap();
        assert_eq!(json, r#"{"data":"OK"}"#);
    }

    #[test]
    fn test_errors_envelope() {
        let json = serde_json::to_string(&WebResponse::errors("token expired")).unwrap();
        assert_eq!(json, r#"{"errors":"token expired"}"#);
    }
}
