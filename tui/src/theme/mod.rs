//! Theme and Colors
//!
//! A muted cinema palette: warm gold for the assistant, green for the user.

use ratatui::style::Color;

// ============================================================================
// Conversation Colors
// ============================================================================

/// Assistant text - marquee gold
pub const ASSISTANT_GOLD: Color = Color::Rgb(240, 200, 110);

/// User input green
pub const USER_GREEN: Color = Color::Rgb(130, 220, 130);

/// System notices and dim text
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Gateway failures
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

// ============================================================================
// Chrome Colors
// ============================================================================

/// Separator above the input box
pub const SEPARATOR_GRAY: Color = Color::DarkGray;

/// Status bar while a request is in flight
pub const BUSY_AMBER: Color = Color::Rgb(255, 176, 80);

/// Scroll fade, outermost line
pub const FADE_FAR: Color = Color::Rgb(80, 80, 80);

/// Scroll fade, inner line
pub const FADE_NEAR: Color = Color::Rgb(120, 120, 120);
