use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::*;

use crate::ui::{AppState, ToastLevel};

pub fn draw_footer(f: &mut Frame, area: Rect, state: &AppState, help_text: &str) {
    let mut spans: Vec<Span> = Vec::new();
    if let Some(t) = &state.toast {
        let color = state.theme.toast_color(t.level);
        let tag = match t.level {
            ToastLevel::Success => "[OK]",
            ToastLevel::Error => "[ERROR]",
            ToastLevel::Info => "[INFO]",
        };
        spans.push(Span::styled(
            format!("{tag} "),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!("{}  |  ", t.text),
            Style::default().fg(color),
        ));
    }
    let focus = match state.focus.pane {
        crate::nav::focus::Pane::Form => "form",
        crate::nav::focus::Pane::Preview => "preview",
    };
    spans.push(Span::styled(
        format!("focus: {focus}"),
        Style::default().fg(Color::Magenta),
    ));
    if state.form.is_editing() {
        spans.push(Span::raw("  |  editing"));
    } else if state.form.is_dragging() {
        spans.push(Span::raw("  |  dragging"));
    }
    if state.submissions > 0 {
        spans.push(Span::raw(format!("  |  submitted: {}", state.submissions)));
    }
    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(help_text.to_string(), state.theme.text_muted()));
    let p = Paragraph::new(Line::from(spans));
    f.render_widget(p, area);
}
