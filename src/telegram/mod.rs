//! Minimal Telegram Bot API client.
//!
//! Only the two methods the bot needs are implemented: `sendMessage` for
//! delivering reports and `getUpdates` for long polling operator commands.

pub mod errors;
pub mod types;

use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};

pub use errors::TelegramError;
pub use types::{Chat, Message, ParseMode, Update};

use types::{ApiResponse, GetUpdates, SendMessage};

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
// Extra time granted on top of the long poll timeout
const POLL_GRACE: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct TelegramApi {
    client: Client,
    base_url: String,
    token: SecretString,
}

impl TelegramApi {
    pub fn new(base_url: impl Into<String>, token: SecretString) -> Result<Self, TelegramError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Send a text message to `chat_id`
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<Message, TelegramError> {
        let params = SendMessage {
            chat_id,
            text,
            parse_mode,
        };
        self.call("sendMessage", &params, REQUEST_TIMEOUT).await
    }

    /// Long poll for updates newer than `offset`
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TelegramError> {
        let params = GetUpdates {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message"],
        };
        let timeout = Duration::from_secs(timeout_secs) + POLL_GRACE;
        self.call("getUpdates", &params, timeout).await
    }

    async fn call<P, R>(&self, method: &str, params: &P, timeout: Duration) -> Result<R, TelegramError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!(
            "{}/bot{}/{method}",
            self.base_url,
            self.token.expose_secret()
        );

        let response = self
            .client
            .post(&url)
            .json(params)
            .timeout(timeout)
            .send()
            .await
            // reqwest errors carry the URL, which embeds the token
            .map_err(|e| e.without_url())?;
        let status = response.status();
        let body: ApiResponse<R> = response.json().await.map_err(|e| e.without_url())?;

        if body.ok {
            return body.result.ok_or(TelegramError::MissingResult);
        }

        if let Some(retry_after_secs) = body.parameters.and_then(|p| p.retry_after) {
            return Err(TelegramError::RateLimited { retry_after_secs });
        }

        Err(TelegramError::Api {
            code: body.error_code.unwrap_or(status.as_u16()),
            description: body
                .description
                .unwrap_or_else(|| "Unknown Telegram API error".to_string()),
        })
    }
}
