//! HTTP response envelope shared by all Sharegrid services.

use serde::{Deserialize, Serialize};

/// REST API result envelope. `code == 0` means success.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestResult<T> {
    pub code: i32,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> RestResult<T> {
    /// Create a successful result with data
    pub fn ok(data: T) -> Self {
        RestResult {
            code: 0,
            message: Some("success".to_string()),
            data: Some(data),
        }
    }

    /// Create an error result
    pub fn err(code: i32, message: &str) -> Self {
        RestResult {
            code,
            message: Some(message.to_string()),
            data: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == 0
    }

    /// Unwrap the payload of a successful result, turning error envelopes
    /// into `SharegridError::NetworkError`.
    pub fn into_data(self) -> Result<T, sharegrid_common::SharegridError> {
        if self.is_ok() {
            self.data.ok_or_else(|| {
                sharegrid_common::SharegridError::NetworkError(
                    "success envelope with empty data".to_string(),
                )
            })
        } else {
            Err(sharegrid_common::SharegridError::NetworkError(format!(
                "server returned code {}: {}",
                self.code,
                self.message.unwrap_or_default()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope() {
        let result = RestResult::ok(7u64);
        assert!(result.is_ok());
        assert_eq!(result.into_data().unwrap(), 7);
    }

    #[test]
    fn test_err_envelope() {
        let result: RestResult<u64> = RestResult::err(30000, "boom");
        assert!(!result.is_ok());
        assert!(result.into_data().is_err());
    }

    #[test]
    fn test_envelope_serialization() {
        let result = RestResult::ok("data".to_string());
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"code\":0"));

        let parsed: RestResult<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.into_data().unwrap(), "data");
    }
}
