use crate::app::Effect;
use crate::form_core::{FieldPath, FieldValue, FormController, FormValues};
use crate::theme::Theme;
use crate::ui::ToastLevel;
use crate::widgets::form::{draw_form, hit_test, rows, DragState, FormView, HitBox, HitTarget, Row};
use crossterm::event::{KeyCode, MouseButton, MouseEvent, MouseEventKind};
use ratatui::crossterm::event as rt_event;
use ratatui::prelude::*;
use tui_textarea::TextArea;

struct Editor {
    path: FieldPath,
    ta: TextArea<'static>,
    // value before editing started, restored on Esc
    original: String,
}

pub struct FormWidget {
    pub controller: FormController,
    pub title: String,
    pub selected: Row,
    pub message: Option<String>,
    theme: Theme,
    editor: Option<Editor>,
    drag: Option<DragState>,
    hits: Vec<HitBox>,
    now: u64,
}

impl FormWidget {
    pub fn new(title: impl Into<String>, controller: FormController, theme: Theme) -> Self {
        Self {
            controller,
            title: title.into(),
            selected: Row::Name,
            message: None,
            theme,
            editor: None,
            drag: None,
            hits: Vec::new(),
            now: 0,
        }
    }

    pub fn values(&self) -> &FormValues {
        self.controller.values()
    }
    pub fn is_editing(&self) -> bool {
        self.editor.is_some()
    }
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Advance the clock. Returns `true` when the success timer reset the form.
    pub fn on_tick(&mut self, now: u64) -> bool {
        self.now = now;
        if self.controller.tick(now) {
            self.editor = None;
            self.drag = None;
            self.message = None;
            self.selected = Row::Name;
            return true;
        }
        false
    }

    fn clamp_selection(&mut self) {
        let len = self.controller.values().skills.len();
        if let Row::Skill(i) = self.selected {
            if i >= len {
                self.selected = Row::Skill(len.saturating_sub(1));
            }
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let all = rows(self.controller.values().skills.len());
        let cur = all.iter().position(|r| *r == self.selected).unwrap_or(0);
        let next = (cur as isize + delta).clamp(0, all.len() as isize - 1) as usize;
        self.selected = all[next];
    }

    fn start_edit(&mut self, path: FieldPath) -> Vec<Effect> {
        if self.controller.is_locked() {
            return vec![Effect::Log(format!("edit {path} ignored: form submitted"))];
        }
        let values = self.controller.values();
        let current = match path {
            FieldPath::Name => values.name.clone(),
            FieldPath::Email => values.email.clone(),
            FieldPath::Skill(i) => match values.skills.get(i) {
                Some(s) => s.clone(),
                None => return Vec::new(),
            },
            _ => return Vec::new(),
        };
        let mut ta = TextArea::default();
        if !current.is_empty() {
            ta.insert_str(&current);
        }
        ta.set_block(
            ratatui::widgets::Block::default()
                .borders(ratatui::widgets::Borders::ALL)
                .border_style(self.theme.border_focused())
                .title(format!("Editing: {} (Enter save, Esc cancel)", label_for(path))),
        );
        self.editor = Some(Editor {
            path,
            ta,
            original: current,
        });
        Vec::new()
    }

    fn on_edit_key(&mut self, key: KeyCode) -> Vec<Effect> {
        let Some(ed) = self.editor.as_mut() else {
            return Vec::new();
        };
        match key {
            KeyCode::Enter | KeyCode::Tab => {
                self.editor = None;
            }
            KeyCode::Esc => {
                let path = ed.path;
                let original = std::mem::take(&mut ed.original);
                self.editor = None;
                self.controller.set_path(path, FieldValue::Text(original));
            }
            other => {
                if let Some(code) = to_rt_key(other) {
                    let _ = ed.ta.input(rt_event::KeyEvent::new(
                        code,
                        rt_event::KeyModifiers::NONE,
                    ));
                    let text = ed.ta.lines().join("");
                    let path = ed.path;
                    self.controller.set_path(path, FieldValue::Text(text));
                }
            }
        }
        Vec::new()
    }

    fn start_drag(&mut self, source: usize) {
        if self.controller.is_locked() || self.controller.values().skills.len() < 2 {
            return;
        }
        self.drag = Some(DragState {
            source,
            target: Some(source),
        });
        self.message = Some("Drag: ↑/↓ choose slot • Enter drop • Esc cancel".into());
    }

    fn finish_drag(&mut self, dest: Option<usize>) -> Vec<Effect> {
        let Some(d) = self.drag.take() else {
            return Vec::new();
        };
        self.message = None;
        if dest == Some(d.source) {
            return Vec::new();
        }
        if self.controller.reorder_skills(d.source, dest) {
            let last = self.controller.values().skills.len().saturating_sub(1);
            let to = dest.unwrap_or(d.source).min(last);
            self.selected = Row::Skill(to);
            vec![Effect::Log(format!("moved skill {} -> {}", d.source + 1, to + 1))]
        } else {
            vec![Effect::Log(format!("drag of skill {} cancelled", d.source + 1))]
        }
    }

    fn on_drag_key(&mut self, key: KeyCode) -> Vec<Effect> {
        let len = self.controller.values().skills.len();
        let Some(d) = self.drag.as_mut() else {
            return Vec::new();
        };
        match key {
            KeyCode::Up => {
                d.target = Some(d.target.unwrap_or(d.source).saturating_sub(1));
                Vec::new()
            }
            KeyCode::Down => {
                let next = d.target.unwrap_or(d.source) + 1;
                d.target = Some(next.min(len.saturating_sub(1)));
                Vec::new()
            }
            KeyCode::Enter => {
                let dest = d.target;
                self.finish_drag(dest)
            }
            KeyCode::Esc => self.finish_drag(None),
            _ => Vec::new(),
        }
    }

    fn remove(&mut self, index: usize) -> Vec<Effect> {
        if self.controller.remove_skill(index) {
            self.clamp_selection();
            vec![Effect::Log(format!("removed skill {}", index + 1))]
        } else {
            vec![Effect::Log(format!("remove skill {} ignored", index + 1))]
        }
    }

    fn submit(&mut self) -> Vec<Effect> {
        if self.controller.is_locked() {
            return Vec::new();
        }
        match self.controller.submit(self.now) {
            Some(values) => {
                self.message = None;
                vec![Effect::Submitted { values }]
            }
            None => {
                let n = self.controller.errors().len();
                self.message = Some("Please fix the highlighted errors".into());
                vec![
                    Effect::Log(format!("submit rejected: {n} error(s)")),
                    Effect::ShowToast {
                        text: "Please fix the highlighted errors".into(),
                        level: ToastLevel::Error,
                        seconds: 2,
                    },
                ]
            }
        }
    }

    fn reset(&mut self) -> Vec<Effect> {
        self.controller.reset();
        self.editor = None;
        self.drag = None;
        self.message = None;
        self.selected = Row::Name;
        vec![
            Effect::Log("form reset".into()),
            Effect::ShowToast {
                text: "Reset".into(),
                level: ToastLevel::Info,
                seconds: 2,
            },
        ]
    }

    fn activate(&mut self, row: Row) -> Vec<Effect> {
        match row {
            Row::Name | Row::Email | Row::Skill(_) => match row.field() {
                Some(path) => self.start_edit(path),
                None => Vec::new(),
            },
            Row::AddSkill => {
                if self.controller.add_skill() {
                    let len = self.controller.values().skills.len();
                    self.selected = Row::Skill(len - 1);
                    vec![Effect::Log(format!("added skill {len}"))]
                } else {
                    Vec::new()
                }
            }
            Row::RememberMe => {
                let next = !self.controller.values().remember_me;
                self.controller
                    .set_path(FieldPath::RememberMe, FieldValue::Bool(next));
                Vec::new()
            }
            Row::Submit => self.submit(),
            Row::Reset => self.reset(),
        }
    }
}

impl crate::widgets::Widget for FormWidget {
    fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, tick: u64) {
        let view = FormView {
            title: &self.title,
            selected: self.selected,
            editing: self.editor.as_ref().map(|e| e.path),
            drag: self.drag,
            message: self.message.as_deref(),
            // the overlay editor draws its own cursor
            cursor_on: self.editor.is_none() && tick % 2 == 0,
            theme: &self.theme,
        };
        self.hits = draw_form(f, area, &self.controller, &view, focused);
        if let Some(ed) = &self.editor {
            let rect = editor_rect(area);
            f.render_widget(ratatui::widgets::Clear, rect);
            f.render_widget(&ed.ta, rect);
        }
    }

    fn on_key(&mut self, key: KeyCode) -> Vec<Effect> {
        if self.editor.is_some() {
            return self.on_edit_key(key);
        }
        if self.drag.is_some() {
            return self.on_drag_key(key);
        }
        match key {
            KeyCode::Up => {
                self.move_selection(-1);
                Vec::new()
            }
            KeyCode::Down => {
                self.move_selection(1);
                Vec::new()
            }
            KeyCode::Left if self.selected == Row::Reset => {
                self.selected = Row::Submit;
                Vec::new()
            }
            KeyCode::Right if self.selected == Row::Submit => {
                self.selected = Row::Reset;
                Vec::new()
            }
            KeyCode::Enter => self.activate(self.selected),
            KeyCode::Char(' ') if self.selected == Row::RememberMe => {
                self.activate(Row::RememberMe)
            }
            KeyCode::Delete | KeyCode::Char('x') => match self.selected {
                Row::Skill(i) => self.remove(i),
                _ => Vec::new(),
            },
            KeyCode::Char('g') => {
                if let Row::Skill(i) = self.selected {
                    self.start_drag(i);
                }
                Vec::new()
            }
            KeyCode::Char('+') => self.activate(Row::AddSkill),
            _ => Vec::new(),
        }
    }

    fn on_mouse(&mut self, ev: MouseEvent) -> Vec<Effect> {
        let target = hit_test(&self.hits, ev.column, ev.row);
        match ev.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                // a press during a keyboard grab drops it; indices may not survive the click
                if self.drag.is_some() {
                    return self.finish_drag(None);
                }
                // a click elsewhere commits the open editor
                self.editor = None;
                match target {
                    Some(HitTarget::RemoveSkill(i)) => self.remove(i),
                    Some(HitTarget::Row(Row::Skill(i))) => {
                        self.selected = Row::Skill(i);
                        self.start_drag(i);
                        if self.drag.is_none() {
                            // nothing to reorder: a press is just a click
                            return self.start_edit(FieldPath::Skill(i));
                        }
                        Vec::new()
                    }
                    Some(HitTarget::Row(row)) => {
                        self.selected = row;
                        self.activate(row)
                    }
                    None => Vec::new(),
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(d) = self.drag.as_mut() {
                    d.target = skill_at(target);
                }
                Vec::new()
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let Some(d) = self.drag else {
                    return Vec::new();
                };
                let dest = skill_at(target);
                if dest == Some(d.source) {
                    // press and release on the same row is a click: edit it
                    self.drag = None;
                    self.message = None;
                    return self.start_edit(FieldPath::Skill(d.source));
                }
                self.finish_drag(dest)
            }
            MouseEventKind::ScrollUp if self.drag.is_none() => {
                self.move_selection(-1);
                Vec::new()
            }
            MouseEventKind::ScrollDown if self.drag.is_none() => {
                self.move_selection(1);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }
}

fn skill_at(target: Option<HitTarget>) -> Option<usize> {
    match target {
        Some(HitTarget::Row(Row::Skill(i))) | Some(HitTarget::RemoveSkill(i)) => Some(i),
        _ => None,
    }
}

fn label_for(path: FieldPath) -> String {
    match path {
        FieldPath::Name => "Name".into(),
        FieldPath::Email => "Email".into(),
        FieldPath::Skill(i) => format!("Skill {}", i + 1),
        other => other.to_string(),
    }
}

fn to_rt_key(key: KeyCode) -> Option<rt_event::KeyCode> {
    Some(match key {
        KeyCode::Char(c) => rt_event::KeyCode::Char(c),
        KeyCode::Backspace => rt_event::KeyCode::Backspace,
        KeyCode::Delete => rt_event::KeyCode::Delete,
        KeyCode::Left => rt_event::KeyCode::Left,
        KeyCode::Right => rt_event::KeyCode::Right,
        KeyCode::Home => rt_event::KeyCode::Home,
        KeyCode::End => rt_event::KeyCode::End,
        _ => return None,
    })
}

// Single-line editor box, horizontally centered on the form.
fn editor_rect(area: Rect) -> Rect {
    let h = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(10),
            Constraint::Percentage(80),
            Constraint::Percentage(10),
        ])
        .split(area);
    let col = h[1];
    let height = 3.min(col.height);
    Rect {
        x: col.x,
        y: col.y + col.height.saturating_sub(height) / 2,
        width: col.width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::Widget;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn widget() -> FormWidget {
        FormWidget::new("Form", FormController::default(), Theme::default())
    }

    fn type_text(w: &mut FormWidget, s: &str) {
        for c in s.chars() {
            w.on_key(KeyCode::Char(c));
        }
    }

    fn draw(w: &mut FormWidget) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(60, 24)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                w.render(f, area, true, 1);
            })
            .unwrap();
        let buf = terminal.backend().buffer().clone();
        (0..buf.area.height)
            .map(|y| {
                (0..buf.area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect()
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn typing_updates_value_and_validates_live() {
        let mut w = widget();
        w.selected = Row::Email;
        w.on_key(KeyCode::Enter);
        assert!(w.is_editing());
        type_text(&mut w, "ann@");
        assert_eq!(w.values().email, "ann@");
        assert_eq!(
            w.controller.errors().get(FieldPath::Email),
            Some("Invalid email format")
        );
        type_text(&mut w, "example.com");
        assert!(w.controller.errors().is_empty());
        w.on_key(KeyCode::Enter);
        assert!(!w.is_editing());
    }

    #[test]
    fn esc_restores_previous_value() {
        let mut w = widget();
        w.on_key(KeyCode::Enter);
        type_text(&mut w, "Ann");
        w.on_key(KeyCode::Enter);
        w.on_key(KeyCode::Enter);
        type_text(&mut w, "ie");
        assert_eq!(w.values().name, "Annie");
        w.on_key(KeyCode::Esc);
        assert_eq!(w.values().name, "Ann");
    }

    #[test]
    fn keyboard_drag_moves_skill() {
        let mut w = widget();
        w.controller.set_field(
            "skills",
            FieldValue::List(vec!["Go".into(), "Rust".into(), "Zig".into()]),
        );
        w.selected = Row::Skill(0);
        w.on_key(KeyCode::Char('g'));
        assert!(w.is_dragging());
        w.on_key(KeyCode::Down);
        w.on_key(KeyCode::Down);
        w.on_key(KeyCode::Down);
        let effects = w.on_key(KeyCode::Enter);
        assert!(matches!(effects.as_slice(), [Effect::Log(_)]));
        assert_eq!(w.values().skills, vec!["Rust", "Zig", "Go"]);
        assert_eq!(w.selected, Row::Skill(2));
    }

    #[test]
    fn keyboard_drag_esc_cancels() {
        let mut w = widget();
        w.controller
            .set_field("skills", FieldValue::List(vec!["Go".into(), "Rust".into()]));
        w.selected = Row::Skill(1);
        w.on_key(KeyCode::Char('g'));
        w.on_key(KeyCode::Up);
        w.on_key(KeyCode::Esc);
        assert!(!w.is_dragging());
        assert_eq!(w.values().skills, vec!["Go", "Rust"]);
    }

    #[test]
    fn mouse_drag_reorders_and_drop_outside_cancels() {
        let mut w = widget();
        w.controller
            .set_field("skills", FieldValue::List(vec!["Go".into(), "Rust".into()]));
        let lines = draw(&mut w);
        let y0 = lines.iter().position(|l| l.contains("1. Go")).unwrap() as u16;
        let y1 = lines.iter().position(|l| l.contains("2. Rust")).unwrap() as u16;

        w.on_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 6, y0));
        w.on_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 6, 0));
        w.on_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 6, 0));
        assert_eq!(w.values().skills, vec!["Go", "Rust"]);

        w.on_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 6, y0));
        w.on_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 6, y1));
        w.on_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 6, y1));
        assert_eq!(w.values().skills, vec!["Rust", "Go"]);
    }

    #[test]
    fn click_during_keyboard_grab_cancels_it() {
        let mut w = widget();
        w.controller.set_field(
            "skills",
            FieldValue::List(vec!["A".into(), "B".into(), "C".into()]),
        );
        let lines = draw(&mut w);
        let y = lines.iter().position(|l| l.contains("1. A")).unwrap();
        let x = lines[y].find("[Remove]").unwrap();
        let col = lines[y][..x].chars().count() as u16 + 1;

        w.selected = Row::Skill(2);
        w.on_key(KeyCode::Char('g'));
        w.on_key(KeyCode::Up);
        w.on_key(KeyCode::Up);
        let effects = w.on_mouse(mouse(MouseEventKind::Down(MouseButton::Left), col, y as u16));
        assert!(matches!(effects.as_slice(), [Effect::Log(_)]));
        assert!(!w.is_dragging());
        assert_eq!(w.values().skills, vec!["A", "B", "C"]);

        // a fresh grab works on the current list
        w.on_key(KeyCode::Char('g'));
        w.on_key(KeyCode::Up);
        w.on_key(KeyCode::Up);
        w.on_key(KeyCode::Enter);
        assert_eq!(w.values().skills, vec!["C", "A", "B"]);
    }

    #[test]
    fn remove_is_refused_for_last_skill() {
        let mut w = widget();
        w.selected = Row::Skill(0);
        w.on_key(KeyCode::Delete);
        assert_eq!(w.values().skills.len(), 1);
        w.on_key(KeyCode::Char('+'));
        assert_eq!(w.selected, Row::Skill(1));
        w.on_key(KeyCode::Delete);
        assert_eq!(w.values().skills.len(), 1);
        assert_eq!(w.selected, Row::Skill(0));
    }

    #[test]
    fn submit_then_timer_resets_form() {
        let mut w = FormWidget::new("Form", FormController::new(3), Theme::default());
        w.controller.set_field("name", FieldValue::Text("Ann".into()));
        w.controller
            .set_field("email", FieldValue::Text("ann@example.com".into()));
        w.controller.set_field("skills.0", FieldValue::Text("Go".into()));
        w.on_tick(10);
        w.selected = Row::Submit;
        let effects = w.on_key(KeyCode::Enter);
        match effects.as_slice() {
            [Effect::Submitted { values }] => assert_eq!(values.name, "Ann"),
            _ => panic!("expected Submitted"),
        }
        assert!(draw(&mut w).join("\n").contains("Form submitted successfully!"));
        assert!(!w.on_tick(12));
        assert!(w.on_tick(13));
        assert_eq!(w.values(), &FormValues::default());
        assert!(!w.controller.is_submitted());
    }

    #[test]
    fn invalid_submit_reports_errors() {
        let mut w = widget();
        w.selected = Row::Submit;
        let effects = w.on_key(KeyCode::Enter);
        assert!(effects
            .iter()
            .any(|e| matches!(e, Effect::ShowToast { level: ToastLevel::Error, .. })));
        assert_eq!(w.message.as_deref(), Some("Please fix the highlighted errors"));
        assert!(!w.controller.is_submitted());
    }
}
