//! Module `commands`
//!
//! Parses a received line into either chat text or a control command.
//! Parsing is purely syntactic; argument validation happens in the
//! handlers, so every line starting with the command prefix is reported as
//! a command even when it turns out to be malformed.

use crate::protocol::responses::COMMAND_PREFIX;

/// Result of parsing one line of client input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    /// Plain chat text, broadcast verbatim.
    Message(String),
    Command(Command),
}

/// A control command. Command words are case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    List,
    /// `/name <new>`; a bare `/name` carries an empty name.
    Name(String),
    /// `/pm <user> <message>`, split at the first space after the target.
    Pm { target: String, message: String },
    /// `/pm` without a space separating target and message.
    PmMissingParameter,
    Unknown(String),
}

/// Represents the outcome of interpreting one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The line was chat text and has been broadcast.
    PlainMessage,
    /// The line was a command, valid or not, and has been answered.
    CommandHandled,
    /// The sender has quit and been removed from the registry.
    ClientLeaving,
}

/// Parses a line (without its line terminator) into chat text or a command.
pub fn parse_input(line: &str) -> ChatInput {
    let Some(body) = line.strip_prefix(COMMAND_PREFIX) else {
        return ChatInput::Message(line.to_string());
    };

    let command = match body {
        "quit" => Command::Quit,
        "list" => Command::List,
        "name" => Command::Name(String::new()),
        "pm" => Command::PmMissingParameter,
        _ => {
            if let Some(new_name) = body.strip_prefix("name ") {
                Command::Name(new_name.to_string())
            } else if let Some(args) = body.strip_prefix("pm ") {
                match args.split_once(' ') {
                    Some((target, message)) => Command::Pm {
                        target: target.to_string(),
                        message: message.to_string(),
                    },
                    None => Command::PmMissingParameter,
                }
            } else {
                let word = body.split_whitespace().next().unwrap_or("");
                Command::Unknown(word.to_string())
            }
        }
    };

    ChatInput::Command(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(line: &str) -> Command {
        match parse_input(line) {
            ChatInput::Command(command) => command,
            ChatInput::Message(text) => panic!("expected a command, got message {text:?}"),
        }
    }

    #[test]
    fn test_plain_text_is_message() {
        assert_eq!(
            parse_input("hello everyone"),
            ChatInput::Message("hello everyone".into())
        );
        assert_eq!(parse_input(" /quit"), ChatInput::Message(" /quit".into()));
    }

    #[test]
    fn test_exact_commands() {
        assert_eq!(command("/quit"), Command::Quit);
        assert_eq!(command("/list"), Command::List);
    }

    #[test]
    fn test_command_words_are_exact_and_case_sensitive() {
        assert_eq!(command("/QUIT"), Command::Unknown("QUIT".into()));
        assert_eq!(command("/list all"), Command::Unknown("list".into()));
        assert_eq!(command("/quitnow"), Command::Unknown("quitnow".into()));
        assert_eq!(command("/"), Command::Unknown(String::new()));
    }

    #[test]
    fn test_name_command() {
        assert_eq!(command("/name bob"), Command::Name("bob".into()));
        assert_eq!(command("/name"), Command::Name(String::new()));
        assert_eq!(command("/name two words"), Command::Name("two words".into()));
    }

    #[test]
    fn test_pm_command() {
        assert_eq!(
            command("/pm bob Hello there"),
            Command::Pm {
                target: "bob".into(),
                message: "Hello there".into()
            }
        );
        assert_eq!(
            command("/pm bob "),
            Command::Pm {
                target: "bob".into(),
                message: String::new()
            }
        );
    }

    #[test]
    fn test_pm_missing_parameters() {
        assert_eq!(command("/pm"), Command::PmMissingParameter);
        assert_eq!(command("/pm bob"), Command::PmMissingParameter);
    }
}
