// SPDX-FileCopyrightText: 2026 Crescent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crescent_core::{ConversationOrder, Role};

/// Crescent - a local chat history store.
#[derive(Parser, Debug)]
#[command(name = "crescent", version, about, long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the usual hierarchy.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the local HTTP API.
    Serve(ServeArgs),
    /// Inspect and remove conversations.
    #[command(subcommand)]
    Conversations(ConversationsCommand),
    /// Append messages to a conversation.
    #[command(subcommand)]
    Messages(MessagesCommand),
    /// Read or change the completion endpoint settings.
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Print the effective configuration as TOML.
    Config,
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Override `server.host`.
    #[arg(long)]
    pub host: Option<String>,
    /// Override `server.port`.
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Subcommand, Debug)]
pub enum ConversationsCommand {
    /// Start a conversation from its first message.
    New {
        content: String,
        /// Print the new conversation as JSON instead of its id.
        #[arg(long)]
        json: bool,
    },
    /// List conversations, newest first.
    List {
        /// Sort by `created` or `updated` time.
        #[arg(long, default_value = "created")]
        order: ConversationOrder,
        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Show one conversation with its messages.
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Delete one conversation (and its messages), or all of them.
    Delete {
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        id: Option<String>,
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum MessagesCommand {
    /// Add a message to an existing conversation.
    Add {
        conversation_id: String,
        content: String,
        #[arg(long, default_value = "user")]
        role: Role,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print the stored endpoint settings.
    Show,
    /// Replace the endpoint settings. Omitted values are cleared.
    SetEndpoint {
        #[arg(long)]
        endpoint: Option<String>,
        #[arg(long)]
        model: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_list_with_order() {
        let cli = Cli::try_parse_from(["crescent", "conversations", "list", "--order", "updated"])
            .unwrap();
        match cli.command {
            Some(Commands::Conversations(ConversationsCommand::List { order, json })) => {
                assert_eq!(order, ConversationOrder::UpdatedDesc);
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn new_takes_first_message_content() {
        let cli = Cli::try_parse_from(["crescent", "conversations", "new", "hello there"]).unwrap();
        match cli.command {
            Some(Commands::Conversations(ConversationsCommand::New { content, json })) => {
                assert_eq!(content, "hello there");
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(Cli::try_parse_from(["crescent", "conversations", "new"]).is_err());
    }

    #[test]
    fn delete_needs_id_or_all() {
        assert!(Cli::try_parse_from(["crescent", "conversations", "delete"]).is_err());
        let both = ["crescent", "conversations", "delete", "c1", "--all"];
        assert!(Cli::try_parse_from(both).is_err());
        assert!(Cli::try_parse_from(["crescent", "conversations", "delete", "--all"]).is_ok());
    }

    #[test]
    fn message_role_is_validated() {
        let args = ["crescent", "messages", "add", "c1", "hi", "--role", "assistant"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Messages(MessagesCommand::Add { role: Role::Assistant, .. }))
        ));
        let args = ["crescent", "messages", "add", "c1", "hi", "--role", "system"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["crescent", "config", "--config", "/tmp/c.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
    }
}
