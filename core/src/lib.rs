//! reelchat Core - Catalog-Grounded Chat Orchestration
//!
//! This crate holds everything a reelchat surface needs to run a conversation
//! about the movie/TV catalog, independent of any UI framework.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     Presentation Surface (TUI)                    │
//! │          handle_input(line) ▼           ▲ SessionUpdate           │
//! └─────────────────────────────┼───────────┼────────────────────────┘
//!                               │           │
//! ┌─────────────────────────────┼───────────┼────────────────────────┐
//! │                      ChatSession                                  │
//! │  ┌───────────┐  ┌─────────────┐  ┌──────────────┐  ┌───────────┐ │
//! │  │  Context  │─►│   Prompt    │─►│   Response   │─►│  Reveal   │ │
//! │  │ Selector  │  │   Builder   │  │   Gateway    │  │ Scheduler │ │
//! │  └───────────┘  └─────────────┘  └──────────────┘  └───────────┘ │
//! │        ▲                                │                         │
//! │    Catalog                  ConversationHistory                   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`ChatSession`]: The state machine that owns a conversation
//! - [`SessionUpdate`]: Messages sent from the session to the surface
//! - [`Catalog`]: The built-in titles used for grounding
//! - [`CompletionGateway`]: One request, one complete reply
//! - [`RevealScheduler`]: Character-by-character presentation of a reply
//!
//! # Quick Start
//!
//! ```ignore
//! use reelchat_core::{config, ChatSession};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = config::load_config()?;
//!     let (tx, mut rx) = mpsc::unbounded_channel();
//!     let mut session = ChatSession::new(config.http_gateway(), config.chat_config(), tx);
//!
//!     session.submit("what is queen's gambit about")?;
//!     session.run_until_idle().await;
//!
//!     while let Ok(update) = rx.try_recv() {
//!         // Render update
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`catalog`]: The static title catalog
//! - [`context`]: Picks which catalog entries ground a query
//! - [`prompt`]: Builds the system instruction
//! - [`conversation`]: Message history and its wire form
//! - [`gateway`]: Completion gateway abstraction and HTTP implementation
//! - [`reveal`]: Paced reveal of completed replies
//! - [`messages`]: Messages from the session to surfaces
//! - [`chat`]: The session itself
//! - [`config`]: TOML/env/CLI configuration
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod chat;
pub mod config;
pub mod context;
pub mod conversation;
pub mod gateway;
pub mod messages;
pub mod prompt;
pub mod reveal;

// Re-exports for convenience
pub use catalog::{Catalog, CatalogEntry};
pub use chat::{ChatConfig, ChatSession, ValidationError};
pub use config::{ConfigError, ConfigOverrides, ConfigSource, ReelchatConfig};
pub use context::{select_context, Selection};
pub use conversation::{ConversationHistory, Message, Role};
pub use gateway::{CompletionGateway, GatewayError, GatewayRequest, HttpGateway, RetryPolicy};
pub use messages::{ChatState, NotifyLevel, SessionUpdate};
pub use prompt::build_system_instruction;
pub use reveal::{RevealEvent, RevealScheduler, RevealState};
