use crate::form_core::{FieldPath, FormController};
use crate::theme::Theme;
use crate::widgets::chrome::panel_block;
use ratatui::prelude::*;
use ratatui::widgets::*;

/// Focusable rows of the form, top to bottom.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Row {
    Name,
    Email,
    Skill(usize),
    AddSkill,
    RememberMe,
    Submit,
    Reset,
}

impl Row {
    pub fn field(&self) -> Option<FieldPath> {
        match self {
            Row::Name => Some(FieldPath::Name),
            Row::Email => Some(FieldPath::Email),
            Row::Skill(i) => Some(FieldPath::Skill(*i)),
            _ => None,
        }
    }
}

pub fn rows(skill_count: usize) -> Vec<Row> {
    let mut out = vec![Row::Name, Row::Email];
    out.extend((0..skill_count).map(Row::Skill));
    out.extend([Row::AddSkill, Row::RememberMe, Row::Submit, Row::Reset]);
    out
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitTarget {
    Row(Row),
    RemoveSkill(usize),
}

/// Screen region of a clickable element, filled in on every render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HitBox {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub target: HitTarget,
}

impl HitBox {
    pub fn contains(&self, column: u16, row: u16) -> bool {
        row == self.y && column >= self.x && column < self.x.saturating_add(self.width)
    }
}

/// Remove buttons sit on top of their skill row and win over it.
pub fn hit_test(hits: &[HitBox], column: u16, row: u16) -> Option<HitTarget> {
    let mut found = None;
    for h in hits.iter().filter(|h| h.contains(column, row)) {
        match h.target {
            HitTarget::RemoveSkill(_) => return Some(h.target),
            HitTarget::Row(_) => found = Some(h.target),
        }
    }
    found
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DragState {
    pub source: usize,
    pub target: Option<usize>,
}

pub struct FormView<'a> {
    pub title: &'a str,
    pub selected: Row,
    pub editing: Option<FieldPath>,
    pub drag: Option<DragState>,
    pub message: Option<&'a str>,
    pub cursor_on: bool,
    pub theme: &'a Theme,
}

// Whole-line rows stretch to the right edge of the panel.
const FULL_WIDTH: u16 = u16::MAX;

#[derive(Default)]
struct Painted {
    lines: Vec<Line<'static>>,
    hits: Vec<Vec<(u16, u16, HitTarget)>>,
    selected_line: usize,
}

impl Painted {
    fn push(&mut self, line: Line<'static>, hits: Vec<(u16, u16, HitTarget)>) {
        self.lines.push(line);
        self.hits.push(hits);
    }

    fn push_row(&mut self, view: &FormView, row: Row, line: Line<'static>) {
        if view.selected == row {
            self.selected_line = self.lines.len();
        }
        self.push(line, vec![(0, FULL_WIDTH, HitTarget::Row(row))]);
    }

    fn push_error(&mut self, theme: &Theme, err: Option<&str>) {
        if let Some(err) = err {
            self.push(
                Line::from(Span::styled(format!("    ! {err}"), theme.text_error())),
                Vec::new(),
            );
        }
    }
}

// Display columns, so wide characters shift the hit boxes that follow them
fn width_of(s: &str) -> u16 {
    Span::raw(s).width() as u16
}

fn sel_mark(view: &FormView, row: Row) -> char {
    if view.selected == row {
        '›'
    } else {
        ' '
    }
}

fn value_span(view: &FormView, row: Row, value: &str, placeholder: &str) -> Span<'static> {
    let theme = view.theme;
    let editing = row.field().is_some() && view.editing == row.field();
    if value.is_empty() && !editing {
        return Span::styled(placeholder.to_string(), theme.text_muted());
    }
    let mut val = value.to_string();
    if editing && view.cursor_on {
        val.push('▏');
    }
    let style = if editing {
        theme.text_editing_bold()
    } else if view.selected == row {
        theme.text_active_bold()
    } else {
        Style::default()
    };
    Span::styled(val, style)
}

fn paint(ctl: &FormController, view: &FormView) -> Painted {
    let theme = view.theme;
    let values = ctl.values();
    let errors = ctl.errors();
    let mut p = Painted::default();

    if ctl.is_submitted() {
        p.push(
            Line::from(Span::styled(
                "  ✔ Form submitted successfully!",
                theme.text_success(),
            )),
            Vec::new(),
        );
        p.push(Line::from(""), Vec::new());
    }

    for (row, label, value) in [
        (Row::Name, "Name", values.name.as_str()),
        (Row::Email, "Email", values.email.as_str()),
    ] {
        let line = Line::from(vec![
            Span::raw(format!("{} {label} *: ", sel_mark(view, row))),
            value_span(view, row, value, label),
        ]);
        p.push_row(view, row, line);
        p.push_error(theme, row.field().and_then(|f| errors.get(f)));
    }

    p.push(Line::from("  Skills *:"), Vec::new());
    let can_remove = ctl.can_remove_skill();
    for (i, skill) in values.skills.iter().enumerate() {
        let row = Row::Skill(i);
        let grip = match view.drag {
            Some(d) if d.source == i => "⇅",
            _ => "≡",
        };
        let head = format!("{}   {grip} {}. ", sel_mark(view, row), i + 1);
        let body = value_span(view, row, skill, "Skill");
        let gap = "  ";
        let remove_x = width_of(&head) + width_of(&body.content) + width_of(gap);
        let remove_style = if can_remove {
            Style::default().fg(theme.error)
        } else {
            theme.text_muted()
        };
        let mut line = Line::from(vec![
            Span::raw(head),
            body,
            Span::raw(gap),
            Span::styled("[Remove]", remove_style),
        ]);
        if let Some(d) = view.drag {
            if d.target == Some(i) {
                line = line.patch_style(theme.drop_target_style());
            } else if d.source == i {
                line = line.patch_style(Style::default().add_modifier(Modifier::DIM));
            }
        }
        if view.selected == row {
            p.selected_line = p.lines.len();
        }
        p.push(
            line,
            vec![
                (remove_x, width_of("[Remove]"), HitTarget::RemoveSkill(i)),
                (0, FULL_WIDTH, HitTarget::Row(row)),
            ],
        );
        p.push_error(theme, errors.get(FieldPath::Skill(i)));
    }
    p.push_error(theme, errors.get(FieldPath::Skills));

    let add_style = if ctl.is_locked() {
        theme.text_muted()
    } else if view.selected == Row::AddSkill {
        theme.text_active_bold()
    } else {
        Style::default().fg(theme.accent)
    };
    p.push_row(
        view,
        Row::AddSkill,
        Line::from(vec![
            Span::raw(format!("{}   ", sel_mark(view, Row::AddSkill))),
            Span::styled("[+ Add Skill]", add_style),
        ]),
    );

    let check = if values.remember_me { "[x]" } else { "[ ]" };
    let check_style = if view.selected == Row::RememberMe {
        theme.text_active_bold()
    } else {
        Style::default()
    };
    p.push_row(
        view,
        Row::RememberMe,
        Line::from(vec![
            Span::raw(format!("{} ", sel_mark(view, Row::RememberMe))),
            Span::styled(check, check_style),
            Span::raw(" Remember me"),
        ]),
    );

    p.push(Line::from(""), Vec::new());
    let submit_label = "[ Submit ]";
    let reset_label = "[ Reset ]";
    let submit_style = if ctl.is_locked() {
        theme.text_muted()
    } else if view.selected == Row::Submit {
        theme.list_cursor_style()
    } else {
        theme.text_active_bold()
    };
    let reset_style = if view.selected == Row::Reset {
        theme.list_cursor_style()
    } else {
        Style::default().fg(theme.accent)
    };
    if matches!(view.selected, Row::Submit | Row::Reset) {
        p.selected_line = p.lines.len();
    }
    let submit_x = 2;
    let reset_x = submit_x + width_of(submit_label) + 2;
    p.push(
        Line::from(vec![
            Span::raw("  "),
            Span::styled(submit_label, submit_style),
            Span::raw("  "),
            Span::styled(reset_label, reset_style),
        ]),
        vec![
            (
                submit_x,
                width_of(submit_label),
                HitTarget::Row(Row::Submit),
            ),
            (reset_x, width_of(reset_label), HitTarget::Row(Row::Reset)),
        ],
    );
    if let Some(msg) = view.message {
        p.push(
            Line::from(Span::styled(msg.to_string(), theme.text_muted())),
            Vec::new(),
        );
    }
    p
}

/// First and one-past-last visible line so `selected` stays in view.
pub(crate) fn compute_scroll_window(total: usize, selected: usize, inner_h: u16) -> (usize, usize) {
    if inner_h == 0 || total == 0 {
        return (0, 0);
    }
    let ih = inner_h as usize;
    let sel = selected.min(total.saturating_sub(1));
    let start = if sel >= ih.saturating_sub(1) {
        sel - ih.saturating_sub(1)
    } else {
        0
    };
    let end = (start + ih).min(total);
    (start, end)
}

/// Render the form and return the hit boxes of what ended up on screen.
pub fn draw_form(
    f: &mut Frame,
    area: Rect,
    ctl: &FormController,
    view: &FormView,
    highlight: bool,
) -> Vec<HitBox> {
    let painted = paint(ctl, view);
    let title = if view.editing.is_some() {
        format!("{} (editing)", view.title)
    } else if view.drag.is_some() {
        format!("{} (dragging)", view.title)
    } else {
        view.title.to_string()
    };
    let block = panel_block(&title, highlight, view.theme);
    let inner = block.inner(area);
    let (start, end) =
        compute_scroll_window(painted.lines.len(), painted.selected_line, inner.height);
    let visible: Vec<Line> = painted.lines[start..end].to_vec();
    f.render_widget(Paragraph::new(visible).block(block), area);

    let mut hits = Vec::new();
    for (off, line_hits) in painted.hits[start..end].iter().enumerate() {
        for (x, w, target) in line_hits {
            let x = inner.x.saturating_add(*x);
            let right = inner.x.saturating_add(inner.width);
            hits.push(HitBox {
                x,
                y: inner.y + off as u16,
                width: (*w).min(right.saturating_sub(x)),
                target: *target,
            });
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form_core::FieldValue;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn render(ctl: &FormController, view: &FormView, w: u16, h: u16) -> (Vec<String>, Vec<HitBox>) {
        let backend = TestBackend::new(w, h);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut hits = Vec::new();
        terminal
            .draw(|f| {
                let area = f.area();
                hits = draw_form(f, area, ctl, view, true);
            })
            .unwrap();
        let buf = terminal.backend().buffer().clone();
        let mut lines = Vec::new();
        for y in 0..buf.area.height {
            let mut line = String::new();
            for x in 0..buf.area.width {
                line.push_str(buf[(x, y)].symbol());
            }
            lines.push(line.trim_end().to_string());
        }
        (lines, hits)
    }

    fn view(theme: &Theme, selected: Row) -> FormView<'_> {
        FormView {
            title: "Form",
            selected,
            editing: None,
            drag: None,
            message: None,
            cursor_on: false,
            theme,
        }
    }

    #[test]
    fn rows_cover_every_skill() {
        assert_eq!(
            rows(2),
            vec![
                Row::Name,
                Row::Email,
                Row::Skill(0),
                Row::Skill(1),
                Row::AddSkill,
                Row::RememberMe,
                Row::Submit,
                Row::Reset
            ]
        );
    }

    #[test]
    fn failed_submit_shows_messages_under_fields() {
        let theme = Theme::default();
        let mut ctl = FormController::default();
        ctl.set_field("email", FieldValue::Text("x".into()));
        ctl.submit(0);
        let (lines, _) = render(&ctl, &view(&theme, Row::Name), 50, 20);
        let text = lines.join("\n");
        assert!(text.contains("! Name is required"));
        assert!(text.contains("! Invalid email format"));
        assert!(text.contains("! Skill is required"));
        assert!(!text.contains("submitted successfully"));
    }

    #[test]
    fn success_banner_and_disabled_remove() {
        let theme = Theme::default();
        let mut ctl = FormController::default();
        ctl.set_field("name", FieldValue::Text("Ann".into()));
        ctl.set_field("email", FieldValue::Text("ann@example.com".into()));
        ctl.set_field("skills.0", FieldValue::Text("Go".into()));
        assert!(ctl.submit(0).is_some());
        let (lines, _) = render(&ctl, &view(&theme, Row::Name), 50, 20);
        assert!(lines[1].contains("✔ Form submitted successfully!"));
        assert!(lines.iter().any(|l| l.contains("1. Go  [Remove]")));
    }

    #[test]
    fn hit_boxes_map_skill_rows_and_remove_buttons() {
        let theme = Theme::default();
        let mut ctl = FormController::default();
        ctl.set_field("skills", FieldValue::List(vec!["Go".into(), "Rust".into()]));
        let (lines, hits) = render(&ctl, &view(&theme, Row::Name), 50, 20);
        let y = lines.iter().position(|l| l.contains("2. Rust")).unwrap() as u16;
        assert_eq!(hit_test(&hits, 5, y), Some(HitTarget::Row(Row::Skill(1))));
        let x = lines[y as usize].find("[Remove]").unwrap();
        let col = lines[y as usize][..x].chars().count() as u16;
        assert_eq!(hit_test(&hits, col + 1, y), Some(HitTarget::RemoveSkill(1)));
        let by = lines.iter().position(|l| l.contains("[ Submit ]")).unwrap() as u16;
        assert_eq!(hit_test(&hits, 4, by), Some(HitTarget::Row(Row::Submit)));
    }

    #[test]
    fn remove_hit_box_follows_wide_characters() {
        let theme = Theme::default();
        let mut ctl = FormController::default();
        ctl.set_field("skills", FieldValue::List(vec!["日本語".into(), "Go".into()]));
        let (lines, hits) = render(&ctl, &view(&theme, Row::Name), 50, 20);
        let y = lines.iter().position(|l| l.contains('日')).unwrap();
        // one buffer cell per symbol, so counting symbols gives the column
        let x = lines[y].find("[Remove]").unwrap();
        let col = lines[y][..x].chars().count() as u16;
        let y = y as u16;
        assert_eq!(hit_test(&hits, col, y), Some(HitTarget::RemoveSkill(0)));
        assert_eq!(hit_test(&hits, col + 7, y), Some(HitTarget::RemoveSkill(0)));
        assert_eq!(hit_test(&hits, col - 1, y), Some(HitTarget::Row(Row::Skill(0))));
    }

    #[test]
    fn scroll_window_keeps_selected_visible() {
        assert_eq!(compute_scroll_window(12, 0, 4), (0, 4));
        assert_eq!(compute_scroll_window(12, 3, 4), (0, 4));
        assert_eq!(compute_scroll_window(12, 4, 4), (1, 5));
        assert_eq!(compute_scroll_window(12, 11, 4), (8, 12));
        assert_eq!(compute_scroll_window(0, 0, 4), (0, 0));
    }

    #[test]
    fn small_panel_scrolls_to_buttons() {
        let theme = Theme::default();
        let ctl = FormController::default();
        let (lines, hits) = render(&ctl, &view(&theme, Row::Reset), 40, 6);
        assert!(lines.iter().any(|l| l.contains("[ Reset ]")));
        assert!(!lines.iter().any(|l| l.contains("Name *")));
        assert!(hits
            .iter()
            .any(|h| h.target == HitTarget::Row(Row::Reset)));
    }
}
