pub mod chat;
pub mod config;
pub mod message;
pub mod selection;
