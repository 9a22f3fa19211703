//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the
//! appropriate subcommands.

pub mod chapter_list;
pub mod index;

use std::error::Error;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cli::chapter_list::list_chapters;
use crate::cli::index::{create_index, index_status};
use crate::core::config::Config;
use crate::ui::chapter_picker::run_chapter_picker;
use crate::ui::chat_loop::run_chat;

#[derive(Parser)]
#[command(name = "ragbook")]
#[command(about = "A terminal chat interface for RAG textbook question answering")]
#[command(
    long_about = "Ragbook is a full-screen terminal client for a textbook-assistant backend. \
It answers questions about textbook content with retrieved sources and lets you \
pick which chapters to focus on.\n\n\
Configuration:\n\
  Use 'ragbook set base-url <url>' to point at your backend, and\n\
  'ragbook set user <id>' to enable saved preferences.\n\n\
Environment Variables:\n\
  RAGBOOK_BASE_URL  Backend origin (overrides the config file)\n\n\
Controls (chat):\n\
  Type              Enter your question in the input field\n\
  Enter             Send the question\n\
  Up/Down/Mouse     Scroll through chat history\n\
  Ctrl+C            Quit the application\n\n\
Controls (chapters):\n\
  Up/Down           Move the cursor\n\
  Space             Toggle a chapter\n\
  s                 Save the selection\n\
  q                 Quit"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Textbook to work with (falls back to the configured default)
    #[arg(short = 't', long, global = true, value_name = "TEXTBOOK")]
    pub textbook: Option<String>,

    /// User identity for preferences and personalized queries
    #[arg(short = 'u', long, global = true, value_name = "USER")]
    pub user: Option<String>,

    /// Backend base URL (overrides environment and config file)
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Enable transcript logging to the specified file
    #[arg(short = 'l', long, global = true)]
    pub log: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Open the interactive chapter-focus picker
    Chapters,
    /// Print the chapter catalog for a textbook
    ListChapters {
        /// Only list chapters matching the user's saved focus preferences
        #[arg(long)]
        focused: bool,
    },
    /// Administer the textbook's RAG index
    Index {
        #[command(subcommand)]
        action: IndexAction,
    },
    /// Set configuration values
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key
        value: Option<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

#[derive(Subcommand)]
pub enum IndexAction {
    /// Request construction of a RAG index
    Create {
        /// Embedding model to use (defaults to the configured or built-in model)
        #[arg(long, value_name = "MODEL")]
        embedding_model: Option<String>,
    },
    /// Show the index status (placeholder until the backend exposes one)
    Status,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()
        .unwrap()
        .block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    // Quiet unless RUST_LOG asks for output; the TUI owns the screen.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::load()?;

    let base_url = config.resolve_base_url(args.base_url.as_deref());
    let user = config.resolve_user(args.user.as_deref());

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let textbook = require_textbook(&config, args.textbook)?;
            run_chat(textbook, user, base_url, args.log).await
        }
        Commands::Chapters => {
            let textbook = require_textbook(&config, args.textbook)?;
            run_chapter_picker(textbook, user, base_url).await
        }
        Commands::ListChapters { focused } => {
            let textbook = require_textbook(&config, args.textbook)?;
            list_chapters(&base_url, &textbook, user.as_deref(), focused).await
        }
        Commands::Index { action } => {
            let textbook = require_textbook(&config, args.textbook)?;
            match action {
                IndexAction::Create { embedding_model } => {
                    let model = embedding_model.or_else(|| config.embedding_model.clone());
                    create_index(&base_url, &textbook, model.as_deref()).await
                }
                IndexAction::Status => index_status(&base_url, &textbook).await,
            }
        }
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            let Some(value) = value else {
                config.print_all();
                return Ok(());
            };
            match key.as_str() {
                "base-url" => {
                    config.base_url = Some(value.clone());
                    config.save()?;
                    println!("✅ Set base-url to: {value}");
                }
                "user" => {
                    config.user = Some(value.clone());
                    config.save()?;
                    println!("✅ Set user to: {value}");
                }
                "default-textbook" => {
                    config.default_textbook = Some(value.clone());
                    config.save()?;
                    println!("✅ Set default-textbook to: {value}");
                }
                "embedding-model" => {
                    config.embedding_model = Some(value.clone());
                    config.save()?;
                    println!("✅ Set embedding-model to: {value}");
                }
                _ => {
                    eprintln!("❌ Unknown config key: {key}");
                    std::process::exit(1);
                }
            }
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            match key.as_str() {
                "base-url" => config.base_url = None,
                "user" => config.user = None,
                "default-textbook" => config.default_textbook = None,
                "embedding-model" => config.embedding_model = None,
                _ => {
                    eprintln!("❌ Unknown config key: {key}");
                    std::process::exit(1);
                }
            }
            config.save()?;
            println!("✅ Unset {key}");
            Ok(())
        }
    }
}

fn require_textbook(
    config: &Config,
    flag: Option<String>,
) -> Result<String, Box<dyn Error>> {
    flag.or_else(|| config.default_textbook.clone()).ok_or_else(|| {
        "❌ No textbook specified. Pass --textbook or run 'ragbook set default-textbook <id>'."
            .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn chat_is_the_default_subcommand() {
        let args = Args::parse_from(["ragbook", "--textbook", "robotics-101"]);
        assert!(args.command.is_none());
        assert_eq!(args.textbook.as_deref(), Some("robotics-101"));
    }

    #[test]
    fn require_textbook_prefers_flag_then_config() {
        let config = Config {
            default_textbook: Some("from-config".to_string()),
            ..Default::default()
        };
        assert_eq!(
            require_textbook(&config, Some("from-flag".to_string())).unwrap(),
            "from-flag"
        );
        assert_eq!(require_textbook(&config, None).unwrap(), "from-config");
        assert!(require_textbook(&Config::default(), None).is_err());
    }
}
