use crate::form_core::FormValues;
use crate::nav::focus::Pane;
use crate::ui::{AppState, ToastLevel};
use crate::widgets::Widget;
use crossterm::event::{KeyCode, KeyModifiers, MouseEvent, MouseEventKind};

pub enum AppMsg {
    Tick,
    Key {
        code: KeyCode,
        modifiers: KeyModifiers,
    },
    Mouse(MouseEvent),
}

#[derive(Debug)]
pub enum Effect {
    /// Valid values handed over by a successful submit.
    Submitted {
        values: FormValues,
    },
    ShowToast {
        text: String,
        level: ToastLevel,
        seconds: u64,
    },
    CopyToClipboard {
        text: String,
    },
    Log(String),
    Quit,
}

pub fn update(state: &mut AppState, msg: AppMsg) -> Vec<Effect> {
    match msg {
        AppMsg::Tick => {
            state.tick = state.tick.wrapping_add(1);
            if state.form.on_tick(state.tick) {
                state.dbg("success timer fired; form reset");
            }
            Vec::new()
        }
        AppMsg::Key { code, modifiers } => on_key(state, code, modifiers),
        AppMsg::Mouse(ev) => on_mouse(state, ev),
    }
}

fn on_key(state: &mut AppState, code: KeyCode, modifiers: KeyModifiers) -> Vec<Effect> {
    let busy = state.form.is_editing() || state.form.is_dragging();
    if modifiers.contains(KeyModifiers::CONTROL) {
        match code {
            KeyCode::Char('c') => return vec![Effect::Quit],
            KeyCode::Char('y') => {
                return vec![Effect::CopyToClipboard {
                    text: state.form.values().to_pretty_json(),
                }]
            }
            _ => {}
        }
    }
    if busy {
        return state.form.on_key(code);
    }
    match code {
        KeyCode::Char('q') => vec![Effect::Quit],
        KeyCode::Tab | KeyCode::BackTab => {
            state.focus.toggle();
            Vec::new()
        }
        _ => match state.focus.pane {
            Pane::Form => state.form.on_key(code),
            Pane::Preview => state.preview.on_key(code),
        },
    }
}

fn on_mouse(state: &mut AppState, ev: MouseEvent) -> Vec<Effect> {
    let over_preview = state
        .preview_area
        .map(|r| r.contains((ev.column, ev.row).into()))
        .unwrap_or(false);
    if over_preview && !state.form.is_dragging() {
        match ev.kind {
            MouseEventKind::ScrollUp => {
                return state.preview.on_key(KeyCode::Up);
            }
            MouseEventKind::ScrollDown => {
                return state.preview.on_key(KeyCode::Down);
            }
            MouseEventKind::Down(_) => {
                if state.focus.preview_visible {
                    state.focus.pane = Pane::Preview;
                }
                return Vec::new();
            }
            _ => {}
        }
    }
    if matches!(ev.kind, MouseEventKind::Down(_)) {
        state.focus.pane = Pane::Form;
    }
    state.form.on_mouse(ev)
}
