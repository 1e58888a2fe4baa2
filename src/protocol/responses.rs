//! Chat protocol responses
//!
//! Every line the server sends. Clients and test fixtures match on this
//! exact wording, so it must not change.

/// Prefix marking a line as a control command
pub const COMMAND_PREFIX: char = '/';

// Join handshake signals
pub const NOT_FULL: &str = "Server is not full\n";
pub const FULL: &str = "Server is full. Please try again later.\n";
pub const NAME_UNIQUE: &str = "Username is unique\n";
pub const NAME_NOT_UNIQUE: &str = "Username is not unique\n";
pub const NAME_INVALID: &str = "Username is invalid\n";
pub const WELCOME: &str = "Welcome to the server!\n";

pub const GOODBYE: &str = "Goodbye!\n";
pub const NAME_TAKEN: &str = "Username already taken.\n";
pub const MISSING_PARAMETER: &str =
    "Missing parameter/s. Use /help for details on correct usage.\n";
pub const USER_NOT_FOUND: &str = "Specified user not found.\n";
pub const PM_SELF: &str = "Cannot send private message to self.\n";
pub const PM_EMPTY: &str = "Cannot send empty message.\n";
pub const PM_SENT: &str = "The PM was sent.\n";
pub const INVALID_COMMAND: &str =
    "Invalid command entered. Use /help for a list of valid commands.\n";

/// Client notice whose suffix carries the client's new name
pub const RENAMED_PREFIX: &str = "You have changed your username to ";

pub fn joined(name: &str) -> String {
    format!("{name} has joined.\n")
}

pub fn left(name: &str) -> String {
    format!("{name} has left.\n")
}

pub fn chat(sender: &str, text: &str) -> String {
    format!("{sender}: {text}\n")
}

pub fn private_message(sender: &str, text: &str) -> String {
    format!("PM from {sender}: {text}\n")
}

pub fn already_current_name(name: &str) -> String {
    format!("{name} is already your current username.\n")
}

pub fn renamed_self(new: &str) -> String {
    format!("{RENAMED_PREFIX}{new}.\n")
}

pub fn renamed_other(old: &str, new: &str) -> String {
    format!("{old} has changed their username to {new}.\n")
}

fn name_rule(max_name_length: usize) -> String {
    format!(
        "Username must have at least one character, at most {max_name_length} characters, \
         and must contain only alphanumeric characters.\n"
    )
}

pub fn invalid_name_entered(max_name_length: usize) -> String {
    format!("Invalid username entered. {}", name_rule(max_name_length))
}

pub fn invalid_name_specified(max_name_length: usize) -> String {
    format!("Invalid username specified. {}", name_rule(max_name_length))
}

pub fn message_length(buffer_size: usize) -> String {
    format!(
        "Message must have at least one character and at most {buffer_size} characters. \
         Please try again.\n"
    )
}

/// Member list header plus names in join order
pub fn member_list(names: &[String]) -> String {
    let header = if names.len() == 1 {
        "There is 1 member currently in the server:\n".to_string()
    } else {
        format!("There are {} members currently in the server:\n", names.len())
    };
    format!("{header}{}\n", names.join(", "))
}

/// Client-side help text; `/help` is never sent to the server.
pub const HELP: &str = "Valid commands are:\n\
- /help                   Show a list of all valid commands\n\
- /quit                   Leave the server\n\
- /list                   Show a list of all members in the server\n\
- /name <new name>        Change username to <new name>\n\
- /pm <user> <message>    Send private <message> to <user>\n";
