//! HTTP webhook transport

use super::{SaleNotice, SaleNotifier};
use async_trait::async_trait;
use shared::{AppError, AppResult, ErrorCode};
use std::time::Duration;

/// POSTs each notice as JSON to a fixed URL
///
/// The reply is not read: any response counts as delivered, only transport
/// failures are errors.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    /// `timeout = None` waits for the remote side indefinitely
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> AppResult<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(AppError::new(ErrorCode::WebhookNotConfigured));
        }
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            AppError::with_message(
                ErrorCode::ConfigError,
                format!("Failed to build webhook client: {}", e),
            )
        })?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl SaleNotifier for WebhookNotifier {
    async fn notify(&self, notice: &SaleNotice) -> AppResult<()> {
        let resp = self
            .client
            .post(&self.url)
            .json(notice)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(url = %self.url, error = %e, "Sales webhook call failed");
                AppError::with_message(
                    ErrorCode::WebhookFailed,
                    format!("Sales webhook call failed: {}", e),
                )
            })?;
        tracing::debug!(url = %self.url, status = %resp.status(), "Sales webhook posted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
    use tokio::sync::mpsc;

    async fn capture(
        State(tx): State<mpsc::UnboundedSender<SaleNotice>>,
        Json(body): Json<SaleNotice>,
    ) -> StatusCode {
        let _ = tx.send(body);
        StatusCode::NO_CONTENT
    }

    async fn refuse() -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/hook", addr)
    }

    fn notice() -> SaleNotice {
        SaleNotice {
            message: "New sale".to_string(),
            timestamp: "2026-10-19T10:00:00+00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn posts_json_body() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let url = serve(Router::new().route("/hook", post(capture)).with_state(tx)).await;

        let notifier = WebhookNotifier::new(url, Some(Duration::from_secs(5))).unwrap();
        notifier.notify(&notice()).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), notice());
    }

    #[tokio::test]
    async fn error_status_still_counts_as_sent() {
        let url = serve(Router::new().route("/hook", post(refuse))).await;
        let notifier = WebhookNotifier::new(url, None).unwrap();
        assert!(notifier.notify(&notice()).await.is_ok());
    }

    #[tokio::test]
    async fn transport_failure_is_an_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let notifier =
            WebhookNotifier::new(format!("http://{}/hook", addr), Some(Duration::from_secs(2)))
                .unwrap();
        let err = notifier.notify(&notice()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::WebhookFailed);
    }

    #[test]
    fn empty_url_is_rejected() {
        let err = WebhookNotifier::new("  ", None).unwrap_err();
        assert_eq!(err.code, ErrorCode::WebhookNotConfigured);
    }
}
