//! Ragbook is a terminal-first client for a remote RAG textbook-assistant API.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`api`] defines the HTTP/JSON payloads and the client wrappers for the
//!   query, chapter catalog, and preference endpoints.
//! - [`core`] owns runtime state: configuration, the chat transcript
//!   controller, and the chapter-focus selector.
//! - [`ui`] renders the terminal interface and runs the interactive event
//!   loops for the chat session and the chapter picker.
//! - [`cli`] parses command-line arguments and dispatches subcommands.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
