//! Notification sink delivering reports to the operator chat.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::telegram::{ParseMode, TelegramApi, TelegramError};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Telegram delivery failed: {0}")]
    Telegram(#[from] TelegramError),
}

/// Destination for formatted reports
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Sends Markdown messages to the operator's Telegram chat
#[derive(Clone, Debug)]
pub struct TelegramNotifier {
    api: TelegramApi,
    chat_id: i64,
    max_attempts: u32,
    retry_backoff: Duration,
}

impl TelegramNotifier {
    /// Best-effort notifier: a single attempt per message
    pub fn new(api: TelegramApi, chat_id: i64) -> Self {
        Self {
            api,
            chat_id,
            max_attempts: 1,
            retry_backoff: Duration::ZERO,
        }
    }

    /// Retry failed deliveries up to `max_attempts` in total
    pub fn with_retry(mut self, max_attempts: u32, retry_backoff: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_backoff = retry_backoff;
        self
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let mut attempt = 1;
        loop {
            let err = match self
                .api
                .send_message(self.chat_id, text, Some(ParseMode::Markdown))
                .await
            {
                Ok(_) => {
                    debug!(chat_id = self.chat_id, "notification sent");
                    return Ok(());
                }
                Err(err) if attempt >= self.max_attempts => return Err(err.into()),
                Err(err) => err,
            };

            let wait = match &err {
                TelegramError::RateLimited { retry_after_secs } => {
                    Duration::from_secs(*retry_after_secs)
                }
                _ => self.retry_backoff,
            };
            warn!(
                attempt,
                max_attempts = self.max_attempts,
                wait_secs = wait.as_secs(),
                "notification failed, retrying: {err}"
            );
            tokio::time::sleep(wait).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::spawn_stub;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use secrecy::SecretString;
    use serde_json::json;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    // Stub that fails the first `failures` calls, then succeeds
    async fn flaky_bot_api(failures: usize) -> (TelegramApi, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let router = Router::new().route(
            "/bottoken/sendMessage",
            post(move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < failures {
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({"ok": false, "error_code": 500, "description": "Internal"})),
                        )
                    } else {
                        (
                            StatusCode::OK,
                            Json(json!({"ok": true, "result": {"message_id": 1, "chat": {"id": 7}}})),
                        )
                    }
                }
            }),
        );
        let base = spawn_stub(router).await;
        let api = TelegramApi::new(base, SecretString::from("token".to_string())).unwrap();
        (api, calls)
    }

    #[tokio::test]
    async fn test_single_attempt_by_default() {
        let (api, calls) = flaky_bot_api(1).await;
        let notifier = TelegramNotifier::new(api, 7);

        let err = notifier.send("hello").await.unwrap_err();
        assert!(matches!(
            err,
            NotifyError::Telegram(TelegramError::Api { code: 500, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_until_delivered() {
        let (api, calls) = flaky_bot_api(2).await;
        let notifier = TelegramNotifier::new(api, 7).with_retry(3, Duration::ZERO);

        notifier.send("hello").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up() {
        let (api, calls) = flaky_bot_api(5).await;
        let notifier = TelegramNotifier::new(api, 7).with_retry(2, Duration::ZERO);

        assert!(notifier.send("hello").await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
