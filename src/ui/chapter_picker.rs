//! Full-screen chapter-focus picker
//!
//! Lists the chapter catalog with checkboxes, toggles membership with Space,
//! and persists the selection with `s`. The catalog fetch and the saved
//! preference fetch run independently; neither blocks the other.

use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::{error::Error, io, sync::Arc, time::Duration};
use tokio::sync::{mpsc, Mutex};
use tracing::warn;

use crate::api::preferences::PreferenceClient;
use crate::api::textbook::fetch_chapters;
use crate::api::{ApiError, Chapter, PreferenceRecord};
use crate::core::selection::{ChapterSelector, SaveOutcome, SaveRequest};

const LOGIN_PROMPT: &str =
    "Please log in to save your preferences (ragbook set user <id>)";

#[derive(Debug)]
enum PickerEvent {
    Catalog(Result<Vec<Chapter>, ApiError>),
    Preferences(Option<PreferenceRecord>),
    SaveDone(Result<(), ApiError>),
}

struct PickerApp {
    selector: ChapterSelector,
    cursor: usize,
    status: Option<String>,
}

impl PickerApp {
    fn new(user_id: Option<String>) -> Self {
        Self {
            selector: ChapterSelector::new(user_id),
            cursor: 0,
            status: None,
        }
    }

    fn move_up(&mut self) {
        let len = self.selector.catalog().len();
        if len > 0 {
            self.cursor = if self.cursor == 0 {
                len - 1
            } else {
                self.cursor - 1
            };
        }
    }

    fn move_down(&mut self) {
        let len = self.selector.catalog().len();
        if len > 0 {
            self.cursor = (self.cursor + 1) % len;
        }
    }

    fn toggle_at_cursor(&mut self) {
        if let Some(chapter) = self.selector.catalog().get(self.cursor) {
            let id = chapter.id;
            self.selector.toggle(id);
        }
    }

    fn status_line(&self) -> String {
        if self.selector.is_loading() {
            return "Loading chapters...".to_string();
        }
        if self.selector.is_saving() {
            return "Saving...".to_string();
        }
        if let Some(status) = &self.status {
            return status.clone();
        }
        format!("{} chapter(s) selected", self.selector.selected().len())
    }
}

fn ui(f: &mut Frame, app: &PickerApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    let mut lines = Vec::new();
    if app.selector.is_loading() {
        lines.push(Line::from("Loading chapters..."));
    } else if app.selector.catalog().is_empty() {
        lines.push(Line::from("No chapters available."));
    } else {
        for (index, chapter) in app.selector.catalog().iter().enumerate() {
            let checkbox = if app.selector.is_selected(chapter.id) {
                "[x]"
            } else {
                "[ ]"
            };
            let label = format!(
                "{} {}. {}",
                checkbox, chapter.chapter_number, chapter.title
            );
            let style = if index == app.cursor {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(label, style)));
        }
    }

    let list = Paragraph::new(lines)
        .block(Block::default().title("Select Your Focus Chapters"));
    f.render_widget(list, chunks[0]);

    let status = Paragraph::new(app.status_line()).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Space: toggle | s: save | q: quit"),
    );
    f.render_widget(status, chunks[1]);
}

pub async fn run_chapter_picker(
    textbook_id: String,
    user_id: Option<String>,
    base_url: String,
) -> Result<(), Box<dyn Error>> {
    let http = reqwest::Client::new();
    let preference_client = Arc::new(PreferenceClient::with_client(http.clone(), &base_url));
    let app = Arc::new(Mutex::new(PickerApp::new(user_id.clone())));

    let (tx, mut rx) = mpsc::unbounded_channel::<PickerEvent>();

    // Catalog fetch. Failure degrades to an empty catalog inside the selector.
    {
        let tx = tx.clone();
        let http = http.clone();
        let base_url = base_url.clone();
        let textbook_id = textbook_id.clone();
        tokio::spawn(async move {
            let outcome = fetch_chapters(&http, &base_url, &textbook_id).await;
            let _ = tx.send(PickerEvent::Catalog(outcome));
        });
    }

    // Preference fetch, only with a known user. Failure is logged and treated
    // the same as an absent record.
    if let Some(user_id) = user_id.clone() {
        let tx = tx.clone();
        let preference_client = Arc::clone(&preference_client);
        let textbook_id = textbook_id.clone();
        tokio::spawn(async move {
            let record = match preference_client.get(&user_id, &textbook_id).await {
                Ok(record) => record,
                Err(error) => {
                    warn!(%error, "failed to fetch saved preferences");
                    None
                }
            };
            let _ = tx.send(PickerEvent::Preferences(record));
        });
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = loop {
        {
            let app_guard = app.lock().await;
            terminal.draw(|f| ui(f, &app_guard))?;
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        break Ok(());
                    }
                    KeyCode::Char('q') | KeyCode::Esc => break Ok(()),
                    KeyCode::Up => app.lock().await.move_up(),
                    KeyCode::Down => app.lock().await.move_down(),
                    KeyCode::Char(' ') => {
                        let mut app_guard = app.lock().await;
                        app_guard.status = None;
                        app_guard.toggle_at_cursor();
                    }
                    KeyCode::Char('s') => {
                        let mut app_guard = app.lock().await;
                        if app_guard.selector.is_saving() {
                            continue;
                        }
                        match app_guard.selector.begin_save() {
                            SaveRequest::NeedsLogin => {
                                app_guard.status = Some(LOGIN_PROMPT.to_string());
                            }
                            SaveRequest::Start { selected } => {
                                app_guard.status = None;
                                let user = app_guard
                                    .selector
                                    .user_id()
                                    .expect("begin_save requires a user")
                                    .to_string();
                                let tx = tx.clone();
                                let preference_client = Arc::clone(&preference_client);
                                let textbook_id = textbook_id.clone();
                                tokio::spawn(async move {
                                    let outcome = preference_client
                                        .set(&user, &textbook_id, &selected)
                                        .await
                                        .map(|_| ());
                                    let _ = tx.send(PickerEvent::SaveDone(outcome));
                                });
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        while let Ok(event) = rx.try_recv() {
            let mut app_guard = app.lock().await;
            match event {
                PickerEvent::Catalog(outcome) => {
                    app_guard.selector.catalog_loaded(outcome);
                    app_guard.cursor = 0;
                }
                PickerEvent::Preferences(record) => {
                    app_guard.selector.preferences_loaded(record);
                }
                PickerEvent::SaveDone(outcome) => {
                    let status = match app_guard.selector.save_finished(outcome) {
                        SaveOutcome::Saved(_) => "Preferences saved successfully!".to_string(),
                        SaveOutcome::Failed(_) => {
                            "Error saving preferences. Please try again.".to_string()
                        }
                    };
                    app_guard.status = Some(status);
                }
            }
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

    fn ready_app() -> PickerApp {
        let mut app = PickerApp::new(Some("user-1".to_string()));
        app.selector.catalog_loaded(Ok(vec![
            Chapter {
                id: 1,
                chapter_number: 1,
                title: "Intro".to_string(),
            },
            Chapter {
                id: 2,
                chapter_number: 2,
                title: "Basics".to_string(),
            },
        ]));
        app
    }

    #[test]
    fn cursor_wraps_around_the_catalog() {
        let mut app = ready_app();
        app.move_up();
        assert_eq!(app.cursor, 1);
        app.move_down();
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn toggle_at_cursor_flips_the_highlighted_chapter() {
        let mut app = ready_app();
        app.move_down();
        app.toggle_at_cursor();
        assert!(app.selector.is_selected(2));
        app.toggle_at_cursor();
        assert!(!app.selector.is_selected(2));
    }

    #[test]
    fn status_line_reflects_loading_saving_and_selection_count() {
        let mut app = PickerApp::new(None);
        assert_eq!(app.status_line(), "Loading chapters...");

        app.selector.catalog_loaded(Ok(Vec::new()));
        assert_eq!(app.status_line(), "0 chapter(s) selected");

        app.status = Some(LOGIN_PROMPT.to_string());
        assert_eq!(app.status_line(), LOGIN_PROMPT);
    }

    #[test]
    fn empty_catalog_keeps_toggle_and_cursor_safe() {
        let mut app = PickerApp::new(None);
        app.selector.catalog_loaded(Ok(Vec::new()));
        app.move_down();
        app.toggle_at_cursor();
        assert_eq!(app.cursor, 0);
        assert!(app.selector.selected().is_empty());
    }
}
