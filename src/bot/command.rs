use crate::models::VehicleId;

pub const START_TEXT: &str = "Use /check to check for vehicle road traffic offences or wait for \
vehicle road traffic offences notifications for listed vehicles.";

pub const HELP_TEXT: &str = "Commands for this bot are:

/start  start the bot
/help  show this message
/check  check all listed vehicles
/check <REG>  check a specific vehicle e.g. /check T945CEP";

pub const UNKNOWN_COMMAND: &str = "I don't know that command";

/// Operator command parsed from a chat message
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    /// Check one vehicle, or the whole configured list when `None`
    Check(Option<VehicleId>),
    Unknown(String),
}

impl Command {
    /// Parse `/name[@bot] [args]`. Returns `None` for text that is not a command.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim_start();
        let rest = text.strip_prefix('/')?;
        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (rest, ""),
        };
        let name = head.split('@').next().unwrap_or_default();
        if name.is_empty() {
            return None;
        }

        let command = match name {
            "start" => Command::Start,
            "help" => Command::Help,
            "check" => Command::Check(args.parse().ok()),
            other => Command::Unknown(other.to_string()),
        };
        Some(command)
    }
}
