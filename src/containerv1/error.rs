/// Errors returned by the container-cluster API client
use reqwest::StatusCode;
use thiserror::Error;

use super::models::ErrorResponse;

/// Failure of a single API call
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a status outside 2xx
    #[error("API request failed with status {status}: {}", describe(.details, .body))]
    Status {
        status: StatusCode,
        body: String,
        details: Option<ErrorResponse>,
    },

    /// A 2xx response whose body did not match the expected shape
    #[error("failed to parse API response: {source}: {body}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("invalid API endpoint '{0}'")]
    InvalidEndpoint(String),
}

impl ApiError {
    /// Build the error for a non-2xx response from its raw body
    pub(crate) fn from_status(status: StatusCode, body: String) -> Self {
        let details = serde_json::from_str::<ErrorResponse>(&body).ok();
        ApiError::Status {
            status,
            body,
            details,
        }
    }

    /// HTTP status of the response, if one was received
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

fn describe(details: &Option<ErrorResponse>, body: &str) -> String {
    match details {
        Some(d) => match &d.incident_id {
            Some(incident) => format!("{} - {} (incident {})", d.code, d.description, incident),
            None => format!("{} - {}", d.code, d.description),
        },
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_keeps_raw_body() {
        let err = ApiError::from_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to create worker pools to cluster".to_string(),
        );

        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!err.is_not_found());
        assert_eq!(
            err.to_string(),
            "API request failed with status 500 Internal Server Error: Failed to create worker pools to cluster"
        );
        match err {
            ApiError::Status { body, details, .. } => {
                assert_eq!(body, "Failed to create worker pools to cluster");
                assert!(details.is_none());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_status_error_parses_error_document() {
        let body = r#"{"incidentID":"4f2c","code":"G0004","description":"The specified worker pool could not be found."}"#;
        let err = ApiError::from_status(StatusCode::NOT_FOUND, body.to_string());

        assert!(err.is_not_found());
        assert!(err
            .to_string()
            .ends_with("G0004 - The specified worker pool could not be found. (incident 4f2c)"));
        match err {
            ApiError::Status { details, body, .. } => {
                let details = details.unwrap();
                assert_eq!(details.incident_id.as_deref(), Some("4f2c"));
                assert!(body.contains("\"G0004\""));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
