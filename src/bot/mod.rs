//! Operator command surface over Telegram long polling.

pub mod command;

use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, error, info};

pub use command::Command;

use crate::{
    models::VehicleId,
    sweep::Sequencer,
    telegram::{Message, ParseMode, TelegramApi},
    utils::shutdown::Shutdown,
};

pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 60;

// Pause before polling again after a failed getUpdates call
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// What the bot does in response to an operator message
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Reply(&'static str),
    Check(Vec<VehicleId>),
}

pub struct CommandBot {
    api: TelegramApi,
    master_id: i64,
    vehicles: Vec<VehicleId>,
    sequencer: Sequencer,
    cooldown: Duration,
    poll_timeout_secs: u64,
    shutdown: Shutdown,
    // On-demand batches still running
    checks: JoinSet<()>,
}

impl CommandBot {
    pub fn new(
        api: TelegramApi,
        master_id: i64,
        vehicles: Vec<VehicleId>,
        sequencer: Sequencer,
        cooldown: Duration,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            api,
            master_id,
            vehicles,
            sequencer,
            cooldown,
            poll_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
            shutdown,
            checks: JoinSet::new(),
        }
    }

    pub fn with_poll_timeout(mut self, secs: u64) -> Self {
        self.poll_timeout_secs = secs;
        self
    }

    /// Decide how to respond to `message`. Messages from other chats and
    /// plain text are ignored.
    pub fn plan(&self, message: &Message) -> Option<Action> {
        if message.chat.id != self.master_id {
            debug!(chat_id = message.chat.id, "ignoring message from unknown chat");
            return None;
        }

        let action = match Command::parse(message.text.as_deref()?)? {
            Command::Start => Action::Reply(command::START_TEXT),
            Command::Help => Action::Reply(command::HELP_TEXT),
            Command::Check(Some(vehicle)) => Action::Check(vec![vehicle]),
            Command::Check(None) => Action::Check(self.vehicles.clone()),
            Command::Unknown(name) => {
                debug!(command = %name, "unknown command");
                Action::Reply(command::UNKNOWN_COMMAND)
            }
        };
        Some(action)
    }

    /// Poll for updates until shutdown, then wait for on-demand checks that
    /// are still running
    pub async fn run(mut self) {
        info!(master_id = self.master_id, "command loop started");
        let mut offset = 0;

        loop {
            let polled = tokio::select! {
                polled = self.api.get_updates(offset, self.poll_timeout_secs) => polled,
                _ = self.shutdown.wait() => break,
            };

            while let Some(joined) = self.checks.try_join_next() {
                if let Err(e) = joined {
                    error!("on-demand check task failed: {e}");
                }
            }

            match polled {
                Ok(updates) => {
                    for update in updates {
                        offset = update.update_id + 1;
                        if let Some(message) = update.message {
                            self.handle(&message).await;
                        }
                    }
                }
                Err(e) => {
                    error!("failed to fetch updates: {e}");
                    tokio::select! {
                        _ = tokio::time::sleep(POLL_RETRY_DELAY) => {}
                        _ = self.shutdown.wait() => break,
                    }
                }
            }
        }

        info!(pending = self.checks.len(), "command loop shutting down");
        while let Some(joined) = self.checks.join_next().await {
            if let Err(e) = joined {
                error!("on-demand check task failed: {e}");
            }
        }
    }

    async fn handle(&mut self, message: &Message) {
        match self.plan(message) {
            Some(Action::Reply(text)) => self.reply(text, None).await,
            Some(Action::Check(vehicles)) => {
                let text = format!("🔎 Checking {} vehicle(s)...", vehicles.len());
                self.reply(&text, Some(ParseMode::Markdown)).await;

                let sequencer = self.sequencer.clone();
                let cooldown = self.cooldown;
                self.checks.spawn(async move {
                    sequencer.run(&vehicles, cooldown).await;
                });
            }
            None => {}
        }
    }

    async fn reply(&self, text: &str, parse_mode: Option<ParseMode>) {
        if let Err(e) = self.api.send_message(self.master_id, text, parse_mode).await {
            error!("failed to send reply: {e}");
        }
    }
}
