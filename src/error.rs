use thiserror::Error;

/// Failures raised by the remote record and blob stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request to remote store failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote store returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to decode store payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no {table} row with id {id}")]
    NotFound { table: String, id: String },
}

impl StoreError {
    pub fn api(status: reqwest::StatusCode, body: String) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .or_else(|| v.get("error"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or(body);

        StoreError::Api {
            status: status.as_u16(),
            message,
        }
    }
}
