use crate::app::Effect;
use crate::theme::Theme;
use crate::widgets::chrome::panel_block;
use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::sync::OnceLock;

use syntect::easy::HighlightLines;
use syntect::highlighting::{Style as SynStyle, Theme as SynTheme, ThemeSet};
use syntect::parsing::SyntaxSet;

/// Read-only, scrollable JSON view of the current form values.
pub struct JsonViewerWidget {
    pub title: String,
    pub text: String,
    pub scroll_y: u16,
    pub wrap: bool,
    lines: Vec<Line<'static>>,
    theme: Theme,
    last_viewport_h: u16,
}

impl JsonViewerWidget {
    pub fn from_text(title: impl Into<String>, text: impl Into<String>, theme: Theme) -> Self {
        let mut w = Self {
            title: title.into(),
            text: String::new(),
            scroll_y: 0,
            wrap: false,
            lines: Vec::new(),
            theme,
            last_viewport_h: 0,
        };
        w.set_text(text);
        w
    }

    /// Replace the content; highlighting is redone only when the text changed.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.text && !self.lines.is_empty() {
            return;
        }
        self.lines = highlight_json(&text);
        self.text = text;
    }
}

// ---------------- Syntax highlighting helpers ----------------
static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
static SYN_THEME: OnceLock<SynTheme> = OnceLock::new();

fn get_syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn get_theme() -> &'static SynTheme {
    SYN_THEME.get_or_init(|| {
        let ts = THEME_SET.get_or_init(ThemeSet::load_defaults);
        ts.themes
            .get("base16-ocean.dark")
            .cloned()
            .unwrap_or_else(|| ts.themes.values().next().cloned().unwrap_or_default())
    })
}

fn syn_to_tui_color(c: syntect::highlighting::Color) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

fn highlight_json(text: &str) -> Vec<Line<'static>> {
    let ps = get_syntax_set();
    let syn = ps
        .find_syntax_by_token("json")
        .unwrap_or_else(|| ps.find_syntax_plain_text());
    let mut high = HighlightLines::new(syn, get_theme());
    let mut out: Vec<Line<'static>> = Vec::new();
    for line in text.lines() {
        let regions: Vec<(SynStyle, &str)> = high.highlight_line(line, ps).unwrap_or_default();
        if regions.is_empty() {
            out.push(Line::from(line.to_string()));
            continue;
        }
        let spans: Vec<Span<'static>> = regions
            .into_iter()
            .map(|(st, seg)| {
                Span::styled(
                    seg.to_string(),
                    Style::default().fg(syn_to_tui_color(st.foreground)),
                )
            })
            .collect();
        out.push(Line::from(spans));
    }
    out
}

impl crate::widgets::Widget for JsonViewerWidget {
    fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, _tick: u64) {
        self.last_viewport_h = area.height.saturating_sub(2);
        let total_lines = self.lines.len() as u16;
        let max_scroll = total_lines.saturating_sub(self.last_viewport_h);
        if self.scroll_y > max_scroll {
            self.scroll_y = max_scroll;
        }
        let block = panel_block(&self.title, focused, &self.theme);
        let mut p = Paragraph::new(self.lines.clone())
            .block(block)
            .scroll((self.scroll_y, 0));
        if self.wrap {
            p = p.wrap(Wrap { trim: false });
        }
        f.render_widget(p, area);
    }

    fn on_key(&mut self, key: KeyCode) -> Vec<Effect> {
        match key {
            KeyCode::Up => {
                self.scroll_y = self.scroll_y.saturating_sub(1);
            }
            KeyCode::Down => {
                self.scroll_y = self.scroll_y.saturating_add(1);
            }
            KeyCode::PageUp => {
                self.scroll_y = self.scroll_y.saturating_sub(self.last_viewport_h);
            }
            KeyCode::PageDown => {
                self.scroll_y = self.scroll_y.saturating_add(self.last_viewport_h);
            }
            KeyCode::Home => {
                self.scroll_y = 0;
            }
            KeyCode::End => {
                let total = self.lines.len() as u16;
                self.scroll_y = total.saturating_sub(self.last_viewport_h);
            }
            KeyCode::Char('w') | KeyCode::Char('W') => {
                self.wrap = !self.wrap;
            }
            _ => {}
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form_core::FormValues;
    use crate::widgets::Widget;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    #[test]
    fn shows_values_json_and_scrolls_to_end() {
        let mut w = JsonViewerWidget::from_text(
            "Values",
            FormValues::default().to_pretty_json(),
            Theme::default(),
        );
        let mut terminal = Terminal::new(TestBackend::new(40, 6)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                w.render(f, area, true, 0);
            })
            .unwrap();
        let buf = terminal.backend().buffer().clone();
        let first: String = (1..buf.area.width - 1)
            .map(|x| buf[(x, 1)].symbol().to_string())
            .collect();
        assert_eq!(first.trim_end(), "{");

        let _ = w.on_key(KeyCode::End);
        let expected = (w.lines.len() as u16).saturating_sub(w.last_viewport_h);
        assert_eq!(w.scroll_y, expected);
        let _ = w.on_key(KeyCode::Char('w'));
        assert!(w.wrap);
    }

    #[test]
    fn set_text_rehighlights_on_change_only() {
        let mut w = JsonViewerWidget::from_text("Values", "{}", Theme::default());
        assert_eq!(w.lines.len(), 1);
        w.set_text("{\n  \"name\": \"Ann\"\n}");
        assert_eq!(w.lines.len(), 3);
        assert!(w.text.contains("Ann"));
    }
}
