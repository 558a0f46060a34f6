use thiserror::Error;

/// Errors raised while talking to the Zabbix JSON-RPC endpoint.
#[derive(Debug, Error)]
pub enum ZabbixError {
    /// Network or HTTP-level failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with an `error` envelope.
    #[error("API error {code}: {message}{}", detail_suffix(.data))]
    Api {
        code: i64,
        message: String,
        data: Option<String>,
    },

    /// The response did not match the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),

    /// A lookup that must match something came back empty.
    #[error("not found: {0}")]
    NotFound(String),
}

fn detail_suffix(data: &Option<String>) -> String {
    match data.as_deref() {
        Some(detail) if !detail.is_empty() => format!(" ({detail})"),
        _ => String::new(),
    }
}

impl ZabbixError {
    pub fn is_api(&self) -> bool {
        matches!(self, ZabbixError::Api { .. })
    }
}

impl From<reqwest::Error> for ZabbixError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ZabbixError::Decode(err.to_string())
        } else {
            ZabbixError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ZabbixError {
    fn from(err: serde_json::Error) -> Self {
        ZabbixError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_data_when_present() {
        let err = ZabbixError::Api {
            code: -32602,
            message: "Invalid params.".to_string(),
            data: Some("Incorrect user name or password.".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "API error -32602: Invalid params. (Incorrect user name or password.)"
        );
        assert!(err.is_api());

        let bare = ZabbixError::Api {
            code: -32601,
            message: "Method not found.".to_string(),
            data: None,
        };
        assert_eq!(bare.to_string(), "API error -32601: Method not found.");
    }

    #[test]
    fn serde_errors_map_to_decode() {
        let err: ZabbixError = serde_json::from_str::<u32>("\"x\"").unwrap_err().into();
        assert!(matches!(err, ZabbixError::Decode(_)));
    }
}
