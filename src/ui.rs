use crate::app::{update, AppMsg, Effect};
use crate::form_core::{FormController, FormValues};
use crate::model::{field_value_from_yaml, validate_app_config, AppConfig};
use crate::nav::focus::{FocusState, Pane};
use crate::theme::Theme;
use crate::widgets::form_widget::FormWidget;
use crate::widgets::json_viewer::JsonViewerWidget;
use crate::widgets::status_bar::draw_footer;
use crate::widgets::Widget;
use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

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
    pub(crate) config: AppConfig,
    pub(crate) theme: Theme,
    pub(crate) tick: u64,
    pub(crate) form: FormWidget,
    pub(crate) preview: JsonViewerWidget,
    // Where the preview was last drawn; used to route wheel events
    pub(crate) preview_area: Option<Rect>,
    pub(crate) focus: FocusState,
    pub(crate) toast: Option<Toast>,
    // Debug log (rendered in bottom debug pane)
    pub(crate) debug_log: VecDeque<String>,
    pub(crate) last_submitted: Option<FormValues>,
    pub(crate) submissions: u64,
    pub(crate) should_quit: bool,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let theme = Theme::from_name(config.theme);
        let controller = FormController::new(config.success_ticks());
        let form = FormWidget::new(config.title.clone(), controller, theme.clone());
        let preview =
            JsonViewerWidget::from_text("Values", form.values().to_pretty_json(), theme.clone());
        let focus = FocusState::new(config.show_preview);
        Self {
            config,
            theme,
            tick: 0,
            form,
            preview,
            preview_area: None,
            focus,
            toast: None,
            debug_log: VecDeque::new(),
            last_submitted: None,
            submissions: 0,
            should_quit: false,
        }
    }

    pub fn dbg(&mut self, msg: impl Into<String>) {
        const MAX_LOG_LINES: usize = 200;
        if self.debug_log.len() >= MAX_LOG_LINES {
            self.debug_log.pop_front();
        }
        self.debug_log.push_back(msg.into());
    }

    /// Fill in the configured startup values through the by-name setter.
    pub(crate) fn apply_initial_values(&mut self) {
        let initial = self.config.initial.clone();
        for (name, raw) in &initial {
            let applied = match field_value_from_yaml(raw) {
                Some(value) => self.form.controller.set_field(name, value),
                None => false,
            };
            if applied {
                self.dbg(format!("initial value set: {name}"));
            } else {
                self.dbg(format!("initial value ignored: {name}"));
            }
        }
    }

    fn show_toast(&mut self, text: impl Into<String>, level: ToastLevel, ticks: u64) {
        self.toast = Some(Toast {
            text: text.into(),
            level,
            expires_at_tick: self.tick.saturating_add(ticks.max(1)),
        });
    }
}

pub(crate) fn run_effects(state: &mut AppState, effects: Vec<Effect>) {
    for eff in effects {
        match eff {
            Effect::Submitted { values } => {
                let compact = serde_json::to_string(&values).unwrap_or_default();
                state.dbg(format!("submitted: {compact}"));
                state.submissions += 1;
                state.last_submitted = Some(values);
                let ticks = state.config.success_ticks();
                state.show_toast("Form submitted successfully!", ToastLevel::Success, ticks);
            }
            Effect::ShowToast {
                text,
                level,
                seconds,
            } => {
                let ticks = state.config.ticks_for_seconds(seconds);
                state.show_toast(text, level, ticks);
            }
            Effect::CopyToClipboard { text } => {
                let copied = arboard::Clipboard::new().and_then(|mut c| c.set_text(text));
                let ticks = state.config.ticks_for_seconds(2);
                match copied {
                    Ok(()) => {
                        state.dbg("copied values JSON to clipboard");
                        state.show_toast("Copied to clipboard!", ToastLevel::Info, ticks);
                    }
                    Err(e) => {
                        state.dbg(format!("clipboard error: {e}"));
                        state.show_toast("Clipboard unavailable", ToastLevel::Error, ticks);
                    }
                }
            }
            Effect::Log(msg) => state.dbg(msg),
            Effect::Quit => state.should_quit = true,
        }
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(false)
}

pub fn run() -> Result<()> {
    let (cfg, source) = load_config()?;
    let mut state = AppState::new(cfg);
    state.dbg(format!("config: {source}"));
    state.apply_initial_values();
    // Headless smoke mode
    let headless = env_flag("SKILL_FORM_HEADLESS");
    let headless_ticks: u64 = std::env::var("SKILL_FORM_TICKS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(10);
    let headless_keys: Option<String> = std::env::var("SKILL_FORM_KEYS").ok();
    let headless_summary = env_flag("SKILL_FORM_SMOKE_SUMMARY");
    if headless {
        return run_headless(
            &mut state,
            headless_ticks,
            headless_keys.as_deref(),
            headless_summary,
        );
    }
    // Setup terminal (interactive)
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("entering alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let res = run_loop(&mut terminal, &mut state);
    // Restore terminal before reporting any loop error
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    res
}

fn run_loop<B: Backend>(terminal: &mut Terminal<B>, state: &mut AppState) -> Result<()> {
    let tick_rate = Duration::from_millis(state.config.tick_ms);
    let mut last_tick = Instant::now();
    while !state.should_quit {
        terminal.draw(|f| ui(f, state)).context("drawing frame")?;
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));
        if event::poll(timeout)? {
            let msg = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppMsg::Key {
                    code: key.code,
                    modifiers: key.modifiers,
                }),
                Event::Mouse(ev) => Some(AppMsg::Mouse(ev)),
                _ => None,
            };
            if let Some(msg) = msg {
                let effects = update(state, msg);
                run_effects(state, effects);
            }
        }
        if last_tick.elapsed() >= tick_rate {
            let effects = update(state, AppMsg::Tick);
            run_effects(state, effects);
            last_tick = Instant::now();
        }
    }
    Ok(())
}

fn run_headless(
    state: &mut AppState,
    ticks: u64,
    keys: Option<&str>,
    summary: bool,
) -> Result<()> {
    let backend = ratatui::backend::TestBackend::new(80, 24);
    let mut terminal = Terminal::new(backend)?;
    // One draw first so mouse-free key handling sees laid-out widgets
    terminal.draw(|f| ui(f, state))?;
    let script = keys.map(parse_key_script).unwrap_or_default();
    let keys_sent = script.len();
    for (code, modifiers) in script {
        let effects = update(state, AppMsg::Key { code, modifiers });
        run_effects(state, effects);
        terminal.draw(|f| ui(f, state))?;
    }
    let tick_rate = Duration::from_millis(state.config.tick_ms);
    for _ in 0..ticks {
        if state.should_quit {
            break;
        }
        terminal.draw(|f| ui(f, state))?;
        let effects = update(state, AppMsg::Tick);
        run_effects(state, effects);
        std::thread::sleep(std::cmp::min(tick_rate, Duration::from_millis(200)));
    }
    if summary {
        let summary = serde_json::json!({
            "ok": true,
            "ticks": state.tick,
            "keys": keys_sent,
            "submissions": state.submissions,
            "submitted": state.last_submitted,
            "success_pending": state.form.controller.is_submitted(),
            "errors": state.form.controller.errors().len(),
            "values": state.form.values(),
        });
        println!("{summary}");
    }
    Ok(())
}

/// Parse a headless key script: plain characters are typed as-is, named keys
/// go in angle brackets (`<Enter>`, `<Down>`, `<C-y>`). `<<` types a literal `<`.
pub(crate) fn parse_key_script(script: &str) -> Vec<(KeyCode, KeyModifiers)> {
    let mut out = Vec::new();
    let mut chars = script.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '<' {
            out.push((KeyCode::Char(c), KeyModifiers::NONE));
            continue;
        }
        if chars.peek() == Some(&'<') {
            chars.next();
            out.push((KeyCode::Char('<'), KeyModifiers::NONE));
            continue;
        }
        let mut name = String::new();
        for n in chars.by_ref() {
            if n == '>' {
                break;
            }
            name.push(n);
        }
        if let Some(key) = named_key(&name) {
            out.push(key);
        }
    }
    out
}

fn named_key(name: &str) -> Option<(KeyCode, KeyModifiers)> {
    if let Some(rest) = name.strip_prefix("C-") {
        let c = rest.chars().next()?;
        return Some((KeyCode::Char(c), KeyModifiers::CONTROL));
    }
    let code = match name.to_ascii_lowercase().as_str() {
        "enter" | "cr" => KeyCode::Enter,
        "esc" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "space" => KeyCode::Char(' '),
        "bs" | "backspace" => KeyCode::Backspace,
        "del" | "delete" => KeyCode::Delete,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        _ => return None,
    };
    Some((code, KeyModifiers::NONE))
}

pub(crate) fn parse_config(text: &str, origin: &str) -> Result<AppConfig> {
    // An empty file means "all defaults"
    let cfg: AppConfig = if text.trim().is_empty() {
        AppConfig::default()
    } else {
        serde_yaml::from_str(text).with_context(|| format!("parsing {origin}"))?
    };
    validate_app_config(&cfg).map_err(|e| anyhow::anyhow!("{origin}: {e}"))?;
    Ok(cfg)
}

fn read_config(path: &PathBuf) -> Result<AppConfig> {
    let s = fs::read_to_string(path).with_context(|| format!("reading {path:?}"))?;
    parse_config(&s, &format!("{path:?}"))
}

fn load_config() -> Result<(AppConfig, String)> {
    // 1) Explicit file wins and must load
    if let Ok(p) = std::env::var("SKILL_FORM_CONFIG") {
        let path = PathBuf::from(p);
        let cfg = read_config(&path)?;
        return Ok((cfg, path.display().to_string()));
    }
    // 2) Discover from CWD
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let candidates = [
        cwd.join("skill-form.yaml"),
        cwd.join(".tui").join("skill-form.yaml"),
    ];
    for p in &candidates {
        if p.exists() {
            let cfg = read_config(p)?;
            return Ok((cfg, p.display().to_string()));
        }
    }
    Ok((AppConfig::default(), "built-in defaults".to_string()))
}

fn help_text(state: &AppState) -> &'static str {
    if state.form.is_editing() {
        "type to edit  Enter commit  Esc cancel"
    } else if state.form.is_dragging() {
        "↑/↓ move  Enter drop  Esc cancel"
    } else if state.focus.pane == Pane::Preview {
        "↑/↓ scroll  PgUp/PgDn  Home/End  w wrap  Tab focus  ^Y copy  q quit"
    } else {
        "↑/↓ select  Enter edit/press  g grab  + add  x remove  Tab focus  q quit"
    }
}

pub(crate) fn ui(f: &mut Frame, state: &mut AppState) {
    // Clear expired toast
    if let Some(t) = &state.toast {
        if state.tick >= t.expires_at_tick {
            state.toast = None;
        }
    }

    // Fill entire screen with theme background
    let screen = f.area();
    let bg = Block::default().style(state.theme.base_style());
    f.render_widget(bg, screen);

    const DEBUG_H: u16 = 4;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(DEBUG_H),
            Constraint::Length(1),
        ])
        .split(screen);
    let main = chunks[0];

    // The preview needs some width to be useful; below that the form gets it all
    let show_preview = state.config.show_preview && main.width >= 60;
    let (form_area, preview_area) = if show_preview {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(main);
        (cols[0], Some(cols[1]))
    } else {
        (main, None)
    };
    if preview_area.is_none() && state.focus.pane == Pane::Preview {
        state.focus.pane = Pane::Form;
    }
    state.focus.preview_visible = preview_area.is_some();

    let form_focused = state.focus.pane == Pane::Form;
    state.form.render(f, form_area, form_focused, state.tick);
    if let Some(area) = preview_area {
        state.preview.set_text(state.form.values().to_pretty_json());
        state.preview.render(f, area, !form_focused, state.tick);
    }
    state.preview_area = preview_area;

    draw_debug(f, chunks[1], state);
    draw_footer(f, chunks[2], state, help_text(state));
}

fn draw_debug(f: &mut Frame, area: Rect, state: &AppState) {
    let b = Block::default()
        .borders(Borders::TOP)
        .border_style(state.theme.text_muted())
        .title(Span::styled(
            "Debug",
            state.theme.text_muted().add_modifier(Modifier::BOLD),
        ));
    // Take last lines that fit below the title border
    let h = area.height.saturating_sub(1) as usize;
    let total = state.debug_log.len();
    let start = total.saturating_sub(h);
    let lines: Vec<Line> = state
        .debug_log
        .iter()
        .skip(start)
        .map(|s| Line::raw(s.clone()))
        .collect();
    let p = Paragraph::new(lines)
        .style(state.theme.text_muted())
        .block(b)
        .wrap(Wrap { trim: true });
    f.render_widget(p, area);
}
