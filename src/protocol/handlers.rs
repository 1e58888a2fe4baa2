//! Command handlers module for the chat server.
//!
//! Interprets one line from a joined client: chat text is broadcast to
//! everyone else, commands are validated and executed against the registry
//! and router. Protocol errors never change state; each one is answered with
//! exactly one reply line to the sender.

use log::{error, info};

use crate::client::{ClientSession, RenameOutcome};
use crate::error::{CommandError, TransportError, error_response};
use crate::protocol::commands::{ChatInput, Command, CommandOutcome, parse_input};
use crate::protocol::responses;
use crate::protocol::validation::is_valid_name;

/// Interprets one line (without its terminator) from a joined client.
///
/// Only a failure to write to the sender itself is returned as an error.
pub async fn handle_input(
    session: &ClientSession,
    line: &str,
) -> Result<CommandOutcome, TransportError> {
    match parse_input(line) {
        ChatInput::Message(text) => {
            handle_chat_message(session, &text).await;
            Ok(CommandOutcome::PlainMessage)
        }
        ChatInput::Command(command) => handle_command(session, &command).await,
    }
}

/// Dispatches a parsed command to its handler and answers the sender.
pub async fn handle_command(
    session: &ClientSession,
    command: &Command,
) -> Result<CommandOutcome, TransportError> {
    let result = match command {
        Command::Quit => return handle_cmd_quit(session).await,
        Command::List => handle_cmd_list(session).await,
        Command::Name(new_name) => handle_cmd_name(session, new_name).await,
        Command::Pm { target, message } => handle_cmd_pm(session, target, message).await,
        Command::PmMissingParameter => Err(CommandError::MissingParameter),
        Command::Unknown(_) => Err(CommandError::InvalidCommand),
    };

    match result {
        Ok(reply) => session.reply(&reply).await?,
        Err(CommandError::NotRegistered) => {
            error!("{} issued {:?} after leaving the registry", session.id(), command);
            return Ok(CommandOutcome::ClientLeaving);
        }
        Err(e) => {
            info!("Rejected {:?} from {}: {}", command, session.id(), e);
            session
                .reply(&error_response(&e, session.max_name_length()))
                .await?;
        }
    }

    Ok(CommandOutcome::CommandHandled)
}

/// Broadcasts chat text, prefixed with the sender's name.
async fn handle_chat_message(session: &ClientSession, text: &str) {
    let name = session.name().await;
    info!("{}: {}", name, text);
    session
        .router()
        .broadcast_except(session.id(), &responses::chat(&name, text))
        .await;
}

/// Handles `/quit`: announces the departure, removes the client and says goodbye.
async fn handle_cmd_quit(session: &ClientSession) -> Result<CommandOutcome, TransportError> {
    let id = session.id();
    let name = session.name().await;
    let registry = session.registry();

    registry.mark_leaving(id).await;
    session
        .router()
        .broadcast_except(id, &responses::left(&name))
        .await;
    registry.remove(id).await;
    info!("{} has left.", name);

    session.reply(responses::GOODBYE).await?;
    Ok(CommandOutcome::ClientLeaving)
}

/// Handles `/list`: replies with the member list in join order.
async fn handle_cmd_list(session: &ClientSession) -> Result<String, CommandError> {
    info!(
        "Sending a list of all members in the server to {}.",
        session.name().await
    );
    Ok(session.router().list_members().await)
}

/// Handles `/name <new>`: renames the client and tells everyone else.
async fn handle_cmd_name(session: &ClientSession, new_name: &str) -> Result<String, CommandError> {
    match session.registry().rename(session.id(), new_name).await? {
        RenameOutcome::Unchanged => Ok(responses::already_current_name(new_name)),
        RenameOutcome::Renamed { old, new } => {
            let notice = responses::renamed_other(&old, &new);
            info!("{}", notice.trim_end());
            session
                .router()
                .broadcast_except(session.id(), &notice)
                .await;
            Ok(responses::renamed_self(&new))
        }
    }
}

/// Handles `/pm <user> <message>`: delivers a private message to one client.
async fn handle_cmd_pm(
    session: &ClientSession,
    target: &str,
    message: &str,
) -> Result<String, CommandError> {
    if !is_valid_name(target, session.max_name_length()) {
        return Err(CommandError::InvalidTarget);
    }

    if session.registry().find(target).await.is_none() {
        return Err(CommandError::TargetNotFound);
    }

    let sender = session.name().await;
    if target == sender {
        return Err(CommandError::SelfTarget);
    }

    if message.trim().is_empty() {
        return Err(CommandError::EmptyMessage);
    }

    session
        .router()
        .unicast(target, &responses::private_message(&sender, message))
        .await
        .map_err(|e| {
            info!("PM from {} to {} failed: {}", sender, target, e);
            CommandError::TargetNotFound
        })?;

    info!("PM from {} to {}: {}", sender, target, message);
    Ok(responses::PM_SENT.to_string())
}
