use crate::app::{load_current, update, AppMsg, Effect};
use crate::deck_core::focus::{NavigationState, View};
use crate::model::{AppConfig, RequestRecord};
use crate::nav::cursor::BoundedCursor;
use crate::nav::pages::PaneGroup;
use crate::services::store::{SqliteStore, Store};
use crate::services::transport::{spawn_send, TransportMsg};
use crate::theme::Theme;
use crate::widgets::response::{draw_history_options, draw_response, draw_status_line, ResponsePanels};
use crate::widgets::request_bar::draw_request_bar;
use crate::widgets::request_list::draw_sidebar;
use crate::widgets::settings::{draw_settings_bar, draw_settings_content, draw_settings_options};
use crate::widgets::status_bar::{draw_debug, draw_footer};
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

const TICK_MS: u64 = 200;
const TICKS_PER_SEC: u64 = 1000 / TICK_MS;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

pub struct Toast {
    pub text: String,
    pub level: ToastLevel,
    pub expires_at_tick: u64,
}

pub struct AppState {
    pub config: AppConfig,
    pub nav: NavigationState,
    pub requests: Vec<RequestRecord>,
    pub request_cursor: BoundedCursor,
    pub draft: crate::app::draft::Draft,
    pub request_pages: PaneGroup,
    pub response_pages: PaneGroup,
    /// Cursor over the current request's responses while the history list is open.
    pub history: BoundedCursor,
    pub response: ResponsePanels,
    pub in_flight: HashSet<i64>,
    pub store: Option<Box<dyn Store>>,
    pub tick: u64,
    pub toast: Option<Toast>,
    pub debug_log: VecDeque<String>,
    pub theme: Theme,
    pub should_quit: bool,
    pub tx: Option<Sender<TransportMsg>>,
    pub rx: Option<Receiver<TransportMsg>>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Option<Box<dyn Store>>) -> Self {
        Self {
            theme: Theme::from_name(config.theme.as_deref()),
            config,
            nav: NavigationState::default(),
            requests: Vec::new(),
            request_cursor: BoundedCursor::new(0),
            draft: Default::default(),
            request_pages: PaneGroup::request_settings(),
            response_pages: PaneGroup::response(),
            history: BoundedCursor::new(0),
            response: ResponsePanels::default(),
            in_flight: HashSet::new(),
            store,
            tick: 0,
            toast: None,
            debug_log: VecDeque::new(),
            should_quit: false,
            tx: None,
            rx: None,
        }
    }

    pub fn dbg(&mut self, msg: impl Into<String>) {
        const MAX_LOG_LINES: usize = 200;
        if self.debug_log.len() >= MAX_LOG_LINES {
            self.debug_log.pop_front();
        }
        self.debug_log.push_back(msg.into());
    }

    pub fn set_requests(&mut self, requests: Vec<RequestRecord>) {
        self.request_cursor = BoundedCursor::new(requests.len());
        self.requests = requests;
        self.nav = NavigationState::default();
        load_current(self);
    }

    pub fn show_toast(&mut self, text: impl Into<String>, level: ToastLevel, seconds: u64) {
        self.toast = Some(Toast {
            text: text.into(),
            level,
            expires_at_tick: self
                .tick
                .saturating_add(seconds.max(1).saturating_mul(TICKS_PER_SEC)),
        });
    }

    /// Load persisted requests; a failed store still yields a usable (empty) editor.
    fn load_from_store(&mut self) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        match store.list_requests() {
            Ok(loaded) => {
                for w in &loaded.warnings {
                    tracing::warn!(warning = %w, "skipped undecodable request");
                }
                let skipped = loaded.warnings.len();
                self.set_requests(loaded.requests);
                if skipped > 0 {
                    let secs = self.config.toast_secs;
                    self.show_toast(
                        format!("{skipped} stored request(s) could not be read"),
                        ToastLevel::Error,
                        secs,
                    );
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "listing requests failed");
                let secs = self.config.toast_secs;
                self.show_toast(format!("Load failed: {e}"), ToastLevel::Error, secs);
            }
        }
    }
}

pub fn run_effects(state: &mut AppState, effects: Vec<Effect>) {
    for eff in effects {
        match eff {
            Effect::Send(req) => {
                state.dbg(format!("spawn send #{}", req.request_id));
                if let Some(tx) = &state.tx {
                    spawn_send(
                        req,
                        Duration::from_secs(state.config.timeout_secs),
                        tx.clone(),
                    );
                }
            }
            Effect::Copy { text, what } => {
                let secs = state.config.toast_secs;
                match arboard::Clipboard::new().and_then(|mut c| c.set_text(text)) {
                    Ok(()) => state.show_toast(format!("Copied {what}"), ToastLevel::Success, secs),
                    Err(e) => {
                        tracing::warn!(error = %e, "clipboard unavailable");
                        state.show_toast(format!("Copy failed: {e}"), ToastLevel::Error, secs)
                    }
                }
            }
            Effect::ShowToast {
                text,
                level,
                seconds,
            } => state.show_toast(text, level, seconds),
        }
    }
}

fn drain_responses(state: &mut AppState) {
    let mut drained: Vec<TransportMsg> = Vec::new();
    if let Some(rx) = &state.rx {
        while let Ok(msg) = rx.try_recv() {
            drained.push(msg);
        }
    }
    for msg in drained {
        let effects = update(state, AppMsg::Response(msg));
        run_effects(state, effects);
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(false)
}

pub fn run(cfg: AppConfig) -> Result<()> {
    let store: Option<Box<dyn Store>> = match SqliteStore::open(&cfg.db_path) {
        Ok(s) => Some(Box::new(s)),
        Err(e) => {
            tracing::error!(db = %cfg.db_path, error = %e, "opening store failed");
            None
        }
    };
    let store_ok = store.is_some();
    let mut state = AppState::new(cfg, store);
    let (tx, rx) = mpsc::channel::<TransportMsg>();
    state.tx = Some(tx);
    state.rx = Some(rx);
    state.load_from_store();
    if !store_ok {
        let secs = state.config.toast_secs;
        let msg = format!("Cannot open {}; changes will not be saved", state.config.db_path);
        state.show_toast(msg, ToastLevel::Error, secs);
    }

    if env_flag("REQDECK_HEADLESS") {
        let ticks: u64 = std::env::var("REQDECK_TICKS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(10);
        return run_headless(&mut state, ticks, store_ok);
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let res = event_loop(&mut terminal, &mut state);
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    tracing::info!("exiting");
    res
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, state: &mut AppState) -> Result<()> {
    let tick_rate = Duration::from_millis(TICK_MS);
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| ui(f, state))?;
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let effects = update(state, AppMsg::Key(key));
                    run_effects(state, effects);
                }
            }
        }
        drain_responses(state);
        if state.should_quit {
            return Ok(());
        }
        if last_tick.elapsed() >= tick_rate {
            state.tick = state.tick.wrapping_add(1);
            last_tick = Instant::now();
        }
    }
}

fn run_headless(state: &mut AppState, ticks: u64, store_ok: bool) -> Result<()> {
    let backend = ratatui::backend::TestBackend::new(120, 40);
    let mut terminal = Terminal::new(backend)?;
    for _ in 0..ticks {
        terminal.draw(|f| ui(f, state))?;
        drain_responses(state);
        state.tick = state.tick.wrapping_add(1);
        std::thread::sleep(Duration::from_millis(TICK_MS));
    }
    let summary = serde_json::json!({
        "ok": store_ok,
        "requests": state.requests.len(),
        "nav": state.nav,
        "toast": state.toast.as_ref().map(|t| t.text.clone()),
    });
    println!("{summary}");
    Ok(())
}

fn read_config(path: &Path) -> Result<AppConfig> {
    let s = fs::read_to_string(path).with_context(|| format!("reading {path:?}"))?;
    serde_yaml::from_str(&s).with_context(|| format!("parsing {path:?}"))
}

/// First existing `reqdeck.yaml` in: `$REQDECK_CONFIG_DIR`, the working directory, the user config dir.
fn discover_config() -> Result<Option<PathBuf>> {
    if let Ok(base) = std::env::var("REQDECK_CONFIG_DIR") {
        let entry = PathBuf::from(&base).join("reqdeck.yaml");
        if !entry.exists() {
            anyhow::bail!("REQDECK_CONFIG_DIR is set but {entry:?} does not exist");
        }
        return Ok(Some(entry));
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let candidates = [
        Some(cwd.join("reqdeck.yaml")),
        dirs::config_dir().map(|d| d.join("reqdeck").join("reqdeck.yaml")),
    ];
    Ok(candidates.into_iter().flatten().find(|p| p.exists()))
}

pub(crate) fn apply_env_overrides(
    mut cfg: AppConfig,
    var: impl Fn(&str) -> Option<String>,
) -> Result<AppConfig> {
    if let Some(db) = var("REQDECK_DB").filter(|s| !s.trim().is_empty()) {
        cfg.db_path = db;
    }
    if let Some(t) = var("REQDECK_TIMEOUT_SECS") {
        cfg.timeout_secs = t
            .trim()
            .parse()
            .with_context(|| format!("REQDECK_TIMEOUT_SECS={t:?} is not a number"))?;
    }
    Ok(cfg)
}

pub fn load_config() -> Result<AppConfig> {
    let cfg = match discover_config()? {
        Some(path) => read_config(&path)?,
        None => AppConfig::default(),
    };
    apply_env_overrides(cfg, |k| std::env::var(k).ok())
}

pub fn ui(f: &mut Frame, state: &mut AppState) {
    if let Some(t) = &state.toast {
        if state.tick >= t.expires_at_tick {
            state.toast = None;
        }
    }
    let screen = f.area();
    f.render_widget(Block::default().style(state.theme.base_style()), screen);

    let debug_h = if state.config.debug { 5 } else { 0 };
    let rows = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(debug_h),
        Constraint::Length(1),
    ])
    .split(screen);
    let cols = Layout::horizontal([Constraint::Percentage(25), Constraint::Percentage(75)])
        .split(rows[0]);
    draw_sidebar(f, cols[0], state);

    let right = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Percentage(40),
        Constraint::Length(3),
        Constraint::Min(3),
    ])
    .split(cols[1]);
    let method_rect = draw_request_bar(f, right[0], state);
    let settings_anchor = draw_settings_bar(f, right[1], state);
    draw_settings_content(f, right[2], state);
    draw_status_line(f, right[3], state);
    draw_response(f, right[4], state);

    // Overlays last so they sit on top of the panes below them.
    match state.nav.view {
        View::MethodOptions => {
            let rect = crate::widgets::chrome::dropdown_rect(
                method_rect,
                state.draft.method.options().len() as u16 + 2,
                cols[1],
            );
            crate::widgets::chrome::draw_options(
                f,
                rect,
                state.draft.method.options(),
                state.draft.method.selected(),
                state.draft.method.highlighted(),
                &state.theme,
            );
        }
        View::BodyOptions | View::AuthOptions => {
            draw_settings_options(f, settings_anchor, cols[1], state)
        }
        View::HistoryOptions => draw_history_options(f, right[3], cols[1], state),
        _ => {}
    }

    if debug_h > 0 {
        draw_debug(f, rows[1], state);
    }
    draw_footer(f, rows[2], state);
}
