//! Full-screen chat session
//!
//! Runs the interactive event loop: renders the transcript and input line,
//! forwards keystrokes to the chat controller, and spawns the single
//! in-flight query whose outcome comes back over an mpsc channel.

use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::{error::Error, io, sync::Arc, time::Duration};
use tokio::sync::{mpsc, Mutex};
use tracing::warn;

use crate::api::rag::RagClient;
use crate::api::{ApiError, QueryResponse};
use crate::core::chat::{ChatController, SubmitOutcome};
use crate::core::message::Sender;
use crate::utils::logging::TranscriptLog;

const WELCOME_MESSAGE: &str = "Hello! I'm your textbook assistant. Ask me anything about this \
textbook, and I'll provide answers based on the content.";

struct ChatApp {
    controller: ChatController,
    textbook_id: String,
    user_id: Option<String>,
    log: TranscriptLog,
    log_error_reported: bool,
    scroll_offset: u16,
    auto_scroll: bool,
}

impl ChatApp {
    fn new(
        textbook_id: String,
        user_id: Option<String>,
        log: TranscriptLog,
    ) -> Self {
        Self {
            controller: ChatController::new(),
            textbook_id,
            user_id,
            log,
            log_error_reported: false,
            scroll_offset: 0,
            auto_scroll: true,
        }
    }

    fn build_display_lines(&self) -> Vec<Line> {
        let mut lines = Vec::new();

        if self.controller.messages().is_empty() {
            for welcome_line in WELCOME_MESSAGE.lines() {
                lines.push(Line::from(Span::styled(
                    welcome_line,
                    Style::default().fg(Color::DarkGray),
                )));
            }
            lines.push(Line::from(""));
        }

        for msg in self.controller.messages() {
            match msg.sender {
                Sender::User => {
                    lines.push(Line::from(vec![
                        Span::styled(
                            "You: ",
                            Style::default()
                                .fg(Color::Cyan)
                                .add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(msg.text.as_str(), Style::default().fg(Color::Cyan)),
                    ]));
                }
                Sender::Bot => {
                    for content_line in msg.text.lines() {
                        if content_line.trim().is_empty() {
                            lines.push(Line::from(""));
                        } else {
                            lines.push(Line::from(Span::styled(
                                content_line,
                                Style::default().fg(Color::White),
                            )));
                        }
                    }
                    if !msg.sources.is_empty() {
                        lines.push(Line::from(Span::styled(
                            "Sources:",
                            Style::default().add_modifier(Modifier::BOLD),
                        )));
                        for source in &msg.sources {
                            lines.push(Line::from(Span::styled(
                                format!("  - {} ({})", source.chapter_title, source.page_reference),
                                Style::default().fg(Color::Gray),
                            )));
                        }
                    }
                    if let Some(confidence) = msg.confidence_label() {
                        lines.push(Line::from(Span::styled(
                            confidence,
                            Style::default().fg(Color::DarkGray),
                        )));
                    }
                }
            }
            lines.push(Line::from(""));
        }

        if self.controller.is_awaiting_response() {
            lines.push(Line::from(Span::styled(
                "Thinking...",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
        }

        lines
    }

    fn calculate_max_scroll_offset(&self, available_height: u16) -> u16 {
        let total_lines = self.build_display_lines().len() as u16;
        total_lines.saturating_sub(available_height)
    }

    /// Pin the viewport to the newest entry while auto-scroll is engaged.
    fn stick_to_bottom(&mut self, available_height: u16) {
        if self.auto_scroll {
            self.scroll_offset = self.calculate_max_scroll_offset(available_height);
        }
    }

    fn log_last_turn(&mut self) {
        let Some(message) = self.controller.messages().last() else {
            return;
        };
        if let Err(error) = self.log.log_message(message) {
            if !self.log_error_reported {
                warn!(%error, "transcript logging failed; further failures suppressed");
                self.log_error_reported = true;
            }
        }
    }
}

fn ui(f: &mut Frame, app: &ChatApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    let lines = app.build_display_lines();

    let available_height = chunks[0].height.saturating_sub(1);
    let total_lines = lines.len() as u16;
    let max_offset = total_lines.saturating_sub(available_height);
    let scroll_offset = app.scroll_offset.min(max_offset);

    let title = format!("Textbook Assistant - {}", app.textbook_id);
    let messages_paragraph = Paragraph::new(lines)
        .block(Block::default().title(title))
        .wrap(Wrap { trim: true })
        .scroll((scroll_offset, 0));

    f.render_widget(messages_paragraph, chunks[0]);

    let input_title = if app.controller.is_awaiting_response() {
        "Waiting for answer... (Ctrl+C to quit)"
    } else {
        "Ask a question about the textbook (Enter to send, Ctrl+C to quit)"
    };

    let input = Paragraph::new(app.controller.input())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(input_title))
        .wrap(Wrap { trim: true });

    f.render_widget(input, chunks[1]);

    f.set_cursor_position((
        chunks[1].x + app.controller.input().len() as u16 + 1,
        chunks[1].y + 1,
    ));
}

fn chat_area_height(terminal_height: u16) -> u16 {
    // 3 rows for the input area, 1 for the transcript title.
    terminal_height.saturating_sub(3).saturating_sub(1)
}

pub async fn run_chat(
    textbook_id: String,
    user_id: Option<String>,
    base_url: String,
    log_file: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let log = TranscriptLog::new(log_file)?;
    let client = Arc::new(RagClient::new(&base_url));
    let app = Arc::new(Mutex::new(ChatApp::new(textbook_id, user_id, log)));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Outcome of the single in-flight query.
    let (tx, mut rx) = mpsc::unbounded_channel::<Result<QueryResponse, ApiError>>();

    let result = loop {
        {
            let app_guard = app.lock().await;
            terminal.draw(|f| ui(f, &app_guard))?;
        }

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        break Ok(());
                    }
                    KeyCode::Enter => {
                        let mut app_guard = app.lock().await;
                        if let SubmitOutcome::Submitted { query } = app_guard.controller.submit() {
                            app_guard.log_last_turn();
                            let terminal_height = terminal.size().map(|s| s.height).unwrap_or(0);
                            app_guard.stick_to_bottom(chat_area_height(terminal_height));

                            let client = Arc::clone(&client);
                            let textbook_id = app_guard.textbook_id.clone();
                            let user_id = app_guard.user_id.clone();
                            let tx = tx.clone();
                            tokio::spawn(async move {
                                let outcome = client
                                    .query(&textbook_id, &query, user_id.as_deref())
                                    .await;
                                let _ = tx.send(outcome);
                            });
                        }
                    }
                    KeyCode::Char(c) => {
                        let mut app_guard = app.lock().await;
                        app_guard.controller.push_input(c);
                    }
                    KeyCode::Backspace => {
                        let mut app_guard = app.lock().await;
                        app_guard.controller.backspace();
                    }
                    KeyCode::Up => {
                        let mut app_guard = app.lock().await;
                        app_guard.auto_scroll = false;
                        app_guard.scroll_offset = app_guard.scroll_offset.saturating_sub(1);
                    }
                    KeyCode::Down => {
                        let mut app_guard = app.lock().await;
                        let terminal_height = terminal.size().map(|s| s.height).unwrap_or(0);
                        let max_scroll = app_guard
                            .calculate_max_scroll_offset(chat_area_height(terminal_height));
                        app_guard.scroll_offset =
                            app_guard.scroll_offset.saturating_add(1).min(max_scroll);
                        if app_guard.scroll_offset >= max_scroll {
                            app_guard.auto_scroll = true;
                        }
                    }
                    _ => {}
                },
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => {
                        let mut app_guard = app.lock().await;
                        app_guard.auto_scroll = false;
                        app_guard.scroll_offset = app_guard.scroll_offset.saturating_sub(3);
                    }
                    MouseEventKind::ScrollDown => {
                        let mut app_guard = app.lock().await;
                        let terminal_height = terminal.size().map(|s| s.height).unwrap_or(0);
                        let max_scroll = app_guard
                            .calculate_max_scroll_offset(chat_area_height(terminal_height));
                        app_guard.scroll_offset =
                            app_guard.scroll_offset.saturating_add(3).min(max_scroll);
                        if app_guard.scroll_offset >= max_scroll {
                            app_guard.auto_scroll = true;
                        }
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        while let Ok(outcome) = rx.try_recv() {
            let mut app_guard = app.lock().await;
            app_guard.controller.resolve(outcome);
            app_guard.log_last_turn();
            let terminal_height = terminal.size().map(|s| s.height).unwrap_or(0);
            app_guard.stick_to_bottom(chat_area_height(terminal_height));
        }
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SourceRef;

    fn app_with_turns() -> ChatApp {
        let log = TranscriptLog::new(None).expect("Failed to create log");
        let mut app = ChatApp::new("robotics-101".to_string(), None, log);
        for c in "what is ROS2?".chars() {
            app.controller.push_input(c);
        }
        assert!(matches!(
            app.controller.submit(),
            SubmitOutcome::Submitted { .. }
        ));
        app.controller.resolve(Ok(QueryResponse {
            response: "ROS2 is...".to_string(),
            sources: vec![SourceRef {
                chapter_title: "ROS2".to_string(),
                page_reference: "p.12".to_string(),
            }],
            confidence: Some(0.92),
        }));
        app
    }

    fn rendered(app: &ChatApp) -> String {
        app.build_display_lines()
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn empty_transcript_shows_the_welcome_message() {
        let log = TranscriptLog::new(None).expect("Failed to create log");
        let app = ChatApp::new("robotics-101".to_string(), None, log);
        assert!(rendered(&app).contains("textbook assistant"));
    }

    #[test]
    fn bot_turn_renders_text_sources_and_confidence() {
        let app = app_with_turns();
        let text = rendered(&app);
        assert!(text.contains("You: what is ROS2?"));
        assert!(text.contains("ROS2 is..."));
        assert!(text.contains("- ROS2 (p.12)"));
        assert!(text.contains("Confidence: 92.0%"));
    }

    #[test]
    fn awaiting_response_shows_the_thinking_placeholder() {
        let log = TranscriptLog::new(None).expect("Failed to create log");
        let mut app = ChatApp::new("robotics-101".to_string(), None, log);
        app.controller.push_input('x');
        let _ = app.controller.submit();
        assert!(rendered(&app).contains("Thinking..."));
    }

    #[test]
    fn absent_confidence_renders_no_confidence_line() {
        let log = TranscriptLog::new(None).expect("Failed to create log");
        let mut app = ChatApp::new("robotics-101".to_string(), None, log);
        app.controller.push_input('x');
        let _ = app.controller.submit();
        app.controller.resolve(Ok(QueryResponse {
            response: "plain answer".to_string(),
            sources: Vec::new(),
            confidence: None,
        }));
        assert!(!rendered(&app).contains("Confidence:"));
    }

    #[test]
    fn auto_scroll_pins_viewport_to_newest_entry() {
        let mut app = app_with_turns();
        app.stick_to_bottom(2);
        assert_eq!(app.scroll_offset, app.calculate_max_scroll_offset(2));

        app.auto_scroll = false;
        app.scroll_offset = 0;
        app.stick_to_bottom(2);
        assert_eq!(app.scroll_offset, 0);
    }
}
