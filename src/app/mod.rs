use std::io::Stdout;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::ListState;
use ratatui::Terminal;

use crate::config::AppConfig;
use crate::feed::{self, RecordStore};
use crate::prefs::PreferenceStore;
use crate::ui;

pub mod state;

pub use state::{DashboardState, EmptyReason};

const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(5);

enum Action {
    Quit,
    SelectNext,
    SelectPrevious,
    ToggleView,
    ToggleFilters,
    StartSearch,
    ClearFilters,
    NextCategory,
    PrevCategory,
    NextWeek,
    PrevWeek,
    Reload,
}

pub struct App {
    pub config: Arc<AppConfig>,
    prefs: PreferenceStore,
    state: DashboardState,
    list_state: ListState,
    should_quit: bool,
    tick_rate: Duration,
    status_set_at: Option<Instant>,
    feed_path: Option<PathBuf>,
}

impl App {
    pub fn new(
        config: Arc<AppConfig>,
        prefs: PreferenceStore,
        store: RecordStore,
        feed_path: Option<PathBuf>,
    ) -> Self {
        let view = prefs.view_mode_or(config.default_view);
        let mut state = DashboardState::new(store, view);
        let mut list_state = ListState::default();
        if state.visible_len() > 0 {
            list_state.select(Some(state.selected));
        }
        state.set_status_message(Some(format!(
            "{} update(s) loaded",
            state.store().len()
        )));
        Self {
            config,
            prefs,
            state,
            list_state,
            should_quit: false,
            tick_rate: Duration::from_millis(250),
            status_set_at: Some(Instant::now()),
            feed_path,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = self.event_loop(&mut terminal);
        restore_terminal(&mut terminal)?;
        result
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut last_tick = Instant::now();
        loop {
            terminal
                .draw(|frame| {
                    if self.state.visible_len() > 0 {
                        self.list_state.select(Some(self.state.selected));
                    } else {
                        self.list_state.select(None);
                    }
                    ui::draw_app(frame, &self.state, &mut self.list_state, &self.config);
                })
                .context("rendering frame")?;

            if self.should_quit {
                break;
            }

            let timeout = self
                .tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_millis(0));

            if event::poll(timeout).context("polling for terminal events")? {
                match event::read().context("reading terminal event")? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Resize(_, _) => {
                        // no-op: next draw adapts to the new size
                    }
                    _ => {}
                }
            }

            if last_tick.elapsed() >= self.tick_rate {
                self.on_tick();
                last_tick = Instant::now();
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.state.search_active {
            match key.code {
                KeyCode::Esc => {
                    self.state.cancel_search();
                    return;
                }
                KeyCode::Enter => {
                    self.state.finish_search();
                    return;
                }
                KeyCode::Backspace => {
                    self.state.pop_search_char();
                    return;
                }
                KeyCode::Char(ch)
                    if !key.modifiers.intersects(
                        KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER,
                    ) =>
                {
                    self.state.push_search_char(ch);
                    return;
                }
                _ => {}
            }
        }

        let action = match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::Quit)
            }
            KeyCode::Char('j') | KeyCode::Down => Some(Action::SelectNext),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::SelectPrevious),
            KeyCode::Char('v') => Some(Action::ToggleView),
            KeyCode::Char('f') => Some(Action::ToggleFilters),
            KeyCode::Char('/') => Some(Action::StartSearch),
            KeyCode::Char('x') => Some(Action::ClearFilters),
            KeyCode::Char('c') => Some(Action::NextCategory),
            KeyCode::Char('C') => Some(Action::PrevCategory),
            KeyCode::Char('w') => Some(Action::NextWeek),
            KeyCode::Char('W') => Some(Action::PrevWeek),
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::Reload)
            }
            KeyCode::Esc if self.state.filters_open => Some(Action::ToggleFilters),
            _ => None,
        };

        if let Some(action) = action {
            self.handle_action(action);
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::SelectNext => self.state.move_selection(1),
            Action::SelectPrevious => self.state.move_selection(-1),
            Action::ToggleView => {
                let mode = self.state.toggle_view();
                if let Err(err) = self.prefs.set_view_mode(mode) {
                    tracing::error!(?err, "failed to persist view mode");
                }
                self.set_status(format!("{mode} view"));
            }
            Action::ToggleFilters => self.state.toggle_filters_panel(),
            Action::StartSearch => self.state.begin_search(),
            Action::ClearFilters => {
                self.state.clear_filters();
                self.set_status("Filters cleared");
            }
            Action::NextCategory => self.state.cycle_category(1),
            Action::PrevCategory => self.state.cycle_category(-1),
            Action::NextWeek => self.state.cycle_week(1),
            Action::PrevWeek => self.state.cycle_week(-1),
            Action::Reload => self.reload_feed(),
        }
    }

    fn reload_feed(&mut self) {
        let Some(path) = self.feed_path.clone() else {
            self.set_status("No feed path configured");
            return;
        };
        match feed::load_feed(&path) {
            Ok(records) => {
                if let Err(err) = self.prefs.cache_feed(&records) {
                    tracing::warn!(?err, "failed to refresh the feed cache");
                }
                let count = records.len();
                self.state.replace_store(RecordStore::new(records));
                self.set_status(format!("Reloaded {count} update(s)"));
            }
            Err(err) => {
                tracing::error!(?err, "feed reload failed");
                self.set_status(format!("Reload failed: {err:#}"));
            }
        }
    }

    fn set_status<S: Into<String>>(&mut self, message: S) {
        self.state.set_status_message(Some(message.into()));
        self.status_set_at = Some(Instant::now());
    }

    fn on_tick(&mut self) {
        if let Some(set_at) = self.status_set_at {
            if set_at.elapsed() >= STATUS_MESSAGE_TTL {
                self.state.set_status_message(None::<String>);
                self.status_set_at = None;
            }
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("creating terminal")
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("disabling raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).context("leaving alternate screen")?;
    terminal.show_cursor().context("restoring cursor")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::prefs::ViewMode;

    use super::*;

    #[test]
    fn config_default_view_applies_until_a_preference_is_saved() {
        let dir = tempfile::tempdir().expect("tempdir");
        let prefs = PreferenceStore::open(dir.path()).expect("open prefs");
        let config = Arc::new(AppConfig {
            default_view: ViewMode::Timeline,
            ..AppConfig::default()
        });

        let app = App::new(config.clone(), prefs, RecordStore::default(), None);
        assert_eq!(app.state().view, ViewMode::Timeline);

        // A persisted preference wins over the configured default.
        let prefs = PreferenceStore::open(dir.path()).expect("reopen prefs");
        prefs.set_view_mode(ViewMode::Grid).expect("persist");
        let app = App::new(config, prefs, RecordStore::default(), None);
        assert_eq!(app.state().view, ViewMode::Grid);
    }
}
