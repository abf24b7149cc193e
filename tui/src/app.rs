//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, resize)
//! - SessionClient for orchestration
//! - DisplayState for rendering
//!
//! Each loop iteration waits for a terminal event or the next frame tick,
//! polls the session, applies its updates and redraws.

use std::io;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::{Frame, Terminal};
use tokio::time::MissedTickBehavior;

use reelchat_core::{ChatState, ReelchatConfig, SessionUpdate, ValidationError};

use crate::display::{DisplayRole, DisplayState};
use crate::session_client::SessionClient;
use crate::theme::{
    ASSISTANT_GOLD, BUSY_AMBER, DIM_GRAY, ERROR_RED, FADE_FAR, FADE_NEAR, SEPARATOR_GRAY,
    USER_GREEN,
};

/// Input box height (lines) for text wrapping
const INPUT_HEIGHT: u16 = 5;

/// Redraw cadence, a bit faster than the default reveal interval
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Main application state
pub struct App {
    // === Core State ===
    /// Is the app still running?
    running: bool,

    // === Session Integration ===
    /// Client for the embedded chat session
    client: SessionClient,
    /// Display state derived from SessionUpdates
    display: DisplayState,

    // === Input State ===
    /// User input buffer
    input_buffer: String,
    /// Scroll offset (lines from bottom, 0 = latest)
    scroll_offset: usize,
    /// Total rendered lines (for scroll bounds)
    total_lines: usize,

    // === Misc State ===
    /// Terminal size
    size: (u16, u16),
}

impl App {
    /// Create a new App instance
    pub fn new(config: &ReelchatConfig) -> anyhow::Result<Self> {
        let size = crossterm::terminal::size()?;

        tracing::info!(
            endpoint = %config.endpoint,
            reveal_ms = config.reveal_interval.as_millis() as u64,
            "Starting chat surface"
        );

        Ok(Self {
            running: true,
            client: SessionClient::new(config),
            display: DisplayState::new(),
            input_buffer: String::new(),
            scroll_offset: 0,
            total_lines: 0,
            size,
        })
    }

    /// Main event loop
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let mut event_stream = EventStream::new();
        let mut frames = tokio::time::interval(FRAME_INTERVAL);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // Render initial frame immediately so user sees UI
        terminal.draw(|frame| self.draw(frame))?;

        while self.running {
            tokio::select! {
                biased;

                // Terminal events - highest priority
                maybe_event = event_stream.next() => match maybe_event {
                    Some(Ok(event)) => self.handle_event(event),
                    Some(Err(e)) => tracing::warn!("Terminal event error: {}", e),
                    None => self.running = false,
                },

                // Frame tick
                _ = frames.tick() => {}
            }

            // Advance the gateway call and reveal
            self.client.poll();

            self.process_session_updates();

            terminal.draw(|frame| self.draw(frame))?;
        }

        self.client.request_quit();
        Ok(())
    }

    /// Process all pending updates from the session
    fn process_session_updates(&mut self) {
        for update in self.client.recv_all() {
            if matches!(update, SessionUpdate::Closed) {
                self.running = false;
            }
            self.display.apply_update(update);
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            // Only handle Press events (not Release or Repeat)
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Resize(w, h) => self.size = (w, h),
            _ => {}
        }
    }

    /// Handle keyboard input
    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            // Quit
            KeyCode::Esc => self.quit(),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => self.quit(),

            // Submit message or command
            KeyCode::Enter => self.submit(),

            // Typing
            KeyCode::Char(c) => self.input_buffer.push(c),
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }

            // Conversation scrolling
            KeyCode::PageUp => self.scroll_up(self.page_size()),
            KeyCode::PageDown => self.scroll_down(self.page_size()),
            KeyCode::Home if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.scroll_offset = self.total_lines.saturating_sub(1);
            }
            KeyCode::End if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.scroll_offset = 0;
            }

            _ => {}
        }
    }

    fn submit(&mut self) {
        let line = std::mem::take(&mut self.input_buffer);
        match self.client.send_input(&line) {
            Ok(()) => self.scroll_offset = 0,
            // Keep the draft so it can be sent once the reply lands
            Err(ValidationError::Busy(_) | ValidationError::TooLong(_)) => {
                self.input_buffer = line;
            }
            Err(ValidationError::Empty | ValidationError::Closed) => {}
        }
    }

    fn quit(&mut self) {
        self.client.request_quit();
        self.running = false;
    }

    fn page_size(&self) -> usize {
        usize::from(self.size.1.saturating_sub(INPUT_HEIGHT + 1) / 2)
    }

    fn scroll_up(&mut self, lines: usize) {
        let max_scroll = self.total_lines.saturating_sub(1);
        self.scroll_offset = (self.scroll_offset + lines).min(max_scroll);
    }

    fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    fn draw(&mut self, frame: &mut Frame) {
        let [conversation, input, status] = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let buf = frame.buffer_mut();
        self.render_conversation(buf, conversation);
        self.render_input(buf, input);
        self.render_status(buf, status);
    }

    /// Render conversation area
    fn render_conversation(&mut self, buf: &mut Buffer, area: Rect) {
        let width = usize::from(area.width.saturating_sub(2));
        let height = usize::from(area.height);
        if width < 10 || height < 3 {
            return;
        }

        let all_lines = conversation_lines(&self.display, width);
        self.total_lines = all_lines.len();

        // Clamp scroll offset
        let max_scroll = self.total_lines.saturating_sub(height);
        if self.scroll_offset > max_scroll {
            self.scroll_offset = max_scroll;
        }

        let visible_end = self.total_lines.saturating_sub(self.scroll_offset);
        let visible_start = visible_end.saturating_sub(height);

        let has_content_above = visible_start > 0;
        let has_content_below = self.scroll_offset > 0;

        for (i, (line, style)) in all_lines[visible_start..visible_end].iter().enumerate() {
            // Fade the edges when there is more to scroll to
            let final_style = if has_content_above && i < 2 {
                Style::default().fg(if i == 0 { FADE_FAR } else { FADE_NEAR })
            } else if has_content_below && i >= height.saturating_sub(2) {
                let dist_from_bottom = height.saturating_sub(1).saturating_sub(i);
                Style::default().fg(if dist_from_bottom == 0 { FADE_FAR } else { FADE_NEAR })
            } else {
                *style
            };

            let y = area.y + i as u16;
            let display_line: String = line.chars().take(usize::from(area.width)).collect();
            buf.set_string(area.x, y, &display_line, final_style);
        }
    }

    /// Render input area
    fn render_input(&self, buf: &mut Buffer, area: Rect) {
        let separator = "-".repeat(usize::from(area.width));
        buf.set_string(area.x, area.y, &separator, Style::default().fg(SEPARATOR_GRAY));

        let text_height = usize::from(area.height.saturating_sub(1));
        let text_width = usize::from(area.width.saturating_sub(1));
        if text_width < 5 || text_height < 1 {
            return;
        }

        let full_input = format!("You: {}_", self.input_buffer);
        let wrapped_lines: Vec<String> = textwrap::wrap(&full_input, text_width)
            .iter()
            .map(ToString::to_string)
            .collect();

        let skip = wrapped_lines.len().saturating_sub(text_height);
        for (i, line) in wrapped_lines.iter().skip(skip).enumerate() {
            let y = area.y + 1 + i as u16;
            buf.set_string(area.x, y, line, Style::default().fg(USER_GREEN));
        }

        if skip > 0 {
            buf.set_string(
                area.x + area.width.saturating_sub(3),
                area.y,
                "^",
                Style::default().fg(BUSY_AMBER),
            );
        }
    }

    /// Render status bar
    fn render_status(&self, buf: &mut Buffer, area: Rect) {
        let status_style = match self.display.chat_state {
            ChatState::Idle => Style::default().fg(DIM_GRAY),
            ChatState::AwaitingGateway | ChatState::Revealing => Style::default().fg(BUSY_AMBER),
        };

        let scroll_info = if self.scroll_offset > 0 {
            format!(" [^{} lines - PgDn to scroll]", self.scroll_offset)
        } else {
            String::new()
        };

        let status = format!(
            " {} | /help | Esc to quit | PgUp/PgDn scroll{}",
            self.display.chat_state.description(),
            scroll_info,
        );

        buf.set_string(area.x, area.y, &status, status_style);
    }
}

/// Wrap the conversation into styled lines of at most `width` columns
fn conversation_lines(display: &DisplayState, width: usize) -> Vec<(String, Style)> {
    let mut lines = Vec::new();

    for msg in &display.messages {
        let style = match msg.role {
            DisplayRole::User => Style::default().fg(USER_GREEN),
            DisplayRole::Assistant => Style::default().fg(ASSISTANT_GOLD),
            DisplayRole::System => Style::default().fg(DIM_GRAY),
        };

        let content = if msg.revealing {
            format!("{}{}_", msg.role.prefix(), msg.content)
        } else {
            format!("{}{}", msg.role.prefix(), msg.content)
        };

        for line in textwrap::wrap(&content, width) {
            lines.push((line.to_string(), style));
        }
        lines.push((String::new(), Style::default()));
    }

    if display.chat_state == ChatState::AwaitingGateway {
        lines.push((
            format!("{}...", DisplayRole::Assistant.prefix()),
            Style::default().fg(DIM_GRAY),
        ));
    }

    if let Some(ref error) = display.error {
        for line in textwrap::wrap(&format!("Error: {error}"), width) {
            lines.push((line.to_string(), Style::default().fg(ERROR_RED)));
        }
    }

    lines
}
