//! The shared request pipeline.

use std::sync::Arc;

use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::http::transport::{ApiRequest, ReqwestTransport, Transport};
use crate::http::ApiError;

/// Sends requests through a [`Transport`] and turns responses into typed
/// results.
///
/// The client is stateless: credentials ride on each [`ApiRequest`]. Session
/// handling (attaching the current token, reacting to 401) belongs to
/// [`crate::session::SessionStore`].
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    /// Create a client over any transport.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Create a client that talks HTTP to `base`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if the HTTP client cannot be built.
    pub fn with_base_url(base: Url) -> Result<Self, ApiError> {
        Ok(Self::new(Arc::new(ReqwestTransport::new(base)?)))
    }

    /// Send `request` and decode a 2xx JSON body into `T`.
    ///
    /// # Errors
    ///
    /// See [`ApiError`] for how statuses are classified. An empty 2xx body is
    /// decoded as JSON `null`.
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let method = request.method.clone();
        let path = request.path.clone();
        log::debug!(
            "{} {}{}",
            method,
            path,
            if request.credential.is_some() { " (bearer)" } else { "" }
        );

        let response = self.transport.send(request).await.inspect_err(|e| {
            log::warn!("{method} {path} failed: {e}");
        })?;

        if !(200..300).contains(&response.status) {
            let err = ApiError::from_status(response.status, &response.body);
            log::debug!("{method} {path} -> {err}");
            return Err(err);
        }

        decode(&path, &response.body)
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: &str) -> Result<T, ApiError> {
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| ApiError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::transport::RawResponse;
    use async_trait::async_trait;
    use serde::Deserialize;

    struct Fixed(RawResponse);

    #[async_trait]
    impl Transport for Fixed {
        async fn send(&self, _request: ApiRequest) -> Result<RawResponse, ApiError> {
            Ok(self.0.clone())
        }
    }

    struct Down;

    #[async_trait]
    impl Transport for Down {
        async fn send(&self, _request: ApiRequest) -> Result<RawResponse, ApiError> {
            Err(ApiError::Network("connection refused".into()))
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Message {
        message: String,
    }

    fn client(status: u16, body: &str) -> ApiClient {
        ApiClient::new(Arc::new(Fixed(RawResponse::new(status, body))))
    }

    #[tokio::test]
    async fn test_execute_decodes_success() {
        let msg: Message = client(200, r#"{"message": "Category deleted successfully"}"#)
            .execute(ApiRequest::delete("/admin/question-categories/c1"))
            .await
            .unwrap();
        assert_eq!(msg.message, "Category deleted successfully");
    }

    #[tokio::test]
    async fn test_execute_empty_body_is_null() {
        let value: Option<Message> = client(204, "")
            .execute(ApiRequest::delete("/x"))
            .await
            .unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn test_execute_classifies_errors() {
        let err = client(401, r#"{"detail": "Invalid token"}"#)
            .execute::<Message>(ApiRequest::get("/auth/me"))
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());

        let err = client(400, r#"{"detail": "Cannot delete registration code that has been used"}"#)
            .execute::<Message>(ApiRequest::delete("/admin/registration-codes/1"))
            .await
            .unwrap_err();
        assert_eq!(
            err.detail(),
            Some("Cannot delete registration code that has been used")
        );

        let err = client(200, "not json")
            .execute::<Message>(ApiRequest::get("/trainer/config"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode { ref path, .. } if path == "/trainer/config"));
    }

    #[tokio::test]
    async fn test_execute_network_failure() {
        let err = ApiClient::new(Arc::new(Down))
            .execute::<Message>(ApiRequest::get("/health"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }
}
