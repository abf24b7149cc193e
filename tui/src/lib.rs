//! reelchat TUI - Terminal chat surface for the catalog assistant
//!
//! A full-screen terminal UI that renders a [`reelchat_core::ChatSession`].
//!
//! # Architecture
//!
//! - **App**: Event loop, input handling and rendering
//! - **SessionClient**: Embedded session, polled every frame
//! - **Display**: State derived from session updates
//! - **Theme**: Colors

pub mod app;
pub mod display;
pub mod session_client;
pub mod theme;

pub use app::App;
