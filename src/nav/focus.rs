#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Pane {
    #[default]
    Form,
    Preview,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FocusState {
    pub pane: Pane,
    // with the preview hidden, focus never leaves the form
    pub preview_visible: bool,
}

impl FocusState {
    pub fn new(preview_visible: bool) -> Self {
        Self {
            pane: Pane::Form,
            preview_visible,
        }
    }

    pub fn toggle(&mut self) {
        self.pane = match self.pane {
            Pane::Form if self.preview_visible => Pane::Preview,
            _ => Pane::Form,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_between_panes() {
        let mut f = FocusState::new(true);
        f.toggle();
        assert_eq!(f.pane, Pane::Preview);
        f.toggle();
        assert_eq!(f.pane, Pane::Form);
    }

    #[test]
    fn toggle_stays_on_form_without_preview() {
        let mut f = FocusState::new(false);
        f.toggle();
        assert_eq!(f.pane, Pane::Form);
    }
}
