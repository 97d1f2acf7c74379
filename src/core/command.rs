//! Command parser for the : command system

use crate::domain::history::HistoryFilter;

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Wallet
    Connect,
    Disconnect,
    Network(String),

    // Contract
    Store(String),
    Retrieve,
    Cancel,

    // History
    Reload,
    Filter(HistoryFilter),
    Page(usize),
    Next,
    Prev,

    Help,
    Quit,

    // Unknown command
    Unknown(String),
}

/// Parse a command string (without the leading :)
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    let mut parts = input.splitn(2, ' ');
    let cmd = parts.next().unwrap_or("");
    let args = parts.next().map(|s| s.trim().to_string());

    match cmd.to_lowercase().as_str() {
        "connect" | "conn" => Command::Connect,
        "disconnect" | "dc" => Command::Disconnect,
        "network" | "net" | "switch" => match args {
            Some(key) if !key.is_empty() => Command::Network(key.to_lowercase()),
            _ => Command::Unknown(input.to_string()),
        },

        // Validation happens in the controller so empty input gets its message
        "store" | "set" => Command::Store(args.unwrap_or_default()),
        "retrieve" | "get" => Command::Retrieve,
        "cancel" => Command::Cancel,

        "history" | "reload" | "refresh" => Command::Reload,
        "filter" | "f" => match args.as_deref().and_then(HistoryFilter::parse) {
            Some(filter) => Command::Filter(filter),
            None => Command::Unknown(input.to_string()),
        },
        "page" | "p" => match args.and_then(|s| s.parse().ok()) {
            Some(n) => Command::Page(n),
            None => Command::Unknown(input.to_string()),
        },
        "next" | "n" => Command::Next,
        "prev" | "previous" => Command::Prev,

        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,

        _ => Command::Unknown(input.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wallet_commands() {
        assert_eq!(parse_command("connect"), Command::Connect);
        assert_eq!(parse_command("dc"), Command::Disconnect);
        assert_eq!(
            parse_command("network Sepolia"),
            Command::Network("sepolia".to_string())
        );
        assert_eq!(
            parse_command("network"),
            Command::Unknown("network".to_string())
        );
    }

    #[test]
    fn test_parse_contract_commands() {
        assert_eq!(parse_command("store 42"), Command::Store("42".to_string()));
        assert_eq!(parse_command("store"), Command::Store(String::new()));
        assert_eq!(parse_command("get"), Command::Retrieve);
        assert_eq!(parse_command("cancel"), Command::Cancel);
    }

    #[test]
    fn test_parse_history_commands() {
        assert_eq!(parse_command("reload"), Command::Reload);
        assert_eq!(
            parse_command("filter mine"),
            Command::Filter(HistoryFilter::Mine)
        );
        assert_eq!(parse_command("page 3"), Command::Page(3));
        assert_eq!(
            parse_command("page x"),
            Command::Unknown("page x".to_string())
        );
        assert_eq!(parse_command("next"), Command::Next);
        assert_eq!(parse_command("prev"), Command::Prev);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            parse_command("notacommand"),
            Command::Unknown("notacommand".to_string())
        );
        assert_eq!(
            parse_command("filter pending"),
            Command::Unknown("filter pending".to_string())
        );
    }
}
