use super::reorder::{move_item, remap_index};
use super::schema::{FieldErrors, Schema};
use super::values::{FieldPath, FieldValue, FormValues};
use std::collections::BTreeSet;

/// 3 seconds at the default 200ms tick.
pub const DEFAULT_SUCCESS_TICKS: u64 = 15;

/// Idle, or showing the success banner until `reset_at` (a tick number).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Succeeded { reset_at: u64 },
}

impl SubmissionState {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionState::Succeeded { .. })
    }
}

/// Owns the values, the visible errors and the pending success timer.
///
/// The timer is plain data advanced by [`FormController::tick`]; nothing
/// outlives the controller, so dropping it cancels the pending reset.
#[derive(Clone, Debug)]
pub struct FormController {
    schema: Schema,
    values: FormValues,
    errors: FieldErrors,
    touched: BTreeSet<FieldPath>,
    submission: SubmissionState,
    success_ticks: u64,
}

impl Default for FormController {
    fn default() -> Self {
        Self::new(DEFAULT_SUCCESS_TICKS)
    }
}

impl FormController {
    pub fn new(success_ticks: u64) -> Self {
        Self::with_schema(Schema::default(), success_ticks)
    }

    pub fn with_schema(schema: Schema, success_ticks: u64) -> Self {
        Self {
            schema,
            values: FormValues::default(),
            errors: FieldErrors::default(),
            touched: BTreeSet::new(),
            submission: SubmissionState::Idle,
            success_ticks: success_ticks.max(1),
        }
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }
    pub fn is_submitted(&self) -> bool {
        self.submission.is_success()
    }
    /// Edits are refused while the success banner holds the submitted values.
    pub fn is_locked(&self) -> bool {
        self.submission.is_success()
    }
    pub fn can_remove_skill(&self) -> bool {
        self.values.skills.len() > 1 && !self.is_locked()
    }

    /// Update a field addressed by name (`name`, `email`, `skills`,
    /// `skills.N`, `rememberMe`). Unknown names and mismatched value kinds are
    /// ignored and reported as `false`.
    pub fn set_field(&mut self, name: &str, value: FieldValue) -> bool {
        match FieldPath::parse(name) {
            Some(path) => self.set_path(path, value),
            None => false,
        }
    }

    pub fn set_path(&mut self, path: FieldPath, value: FieldValue) -> bool {
        if self.is_locked() {
            return false;
        }
        let applied = match (path, value) {
            (FieldPath::Name, FieldValue::Text(s)) => {
                self.values.name = s;
                true
            }
            (FieldPath::Email, FieldValue::Text(s)) => {
                self.values.email = s;
                true
            }
            (FieldPath::RememberMe, FieldValue::Bool(b)) => {
                self.values.remember_me = b;
                true
            }
            (FieldPath::Skill(i), FieldValue::Text(s)) => match self.values.skills.get_mut(i) {
                Some(slot) => {
                    *slot = s;
                    true
                }
                None => false,
            },
            // the list itself is never allowed to become empty
            (FieldPath::Skills, FieldValue::List(items)) if !items.is_empty() => {
                self.values.skills = items;
                true
            }
            _ => false,
        };
        if applied {
            self.touched.insert(path);
            self.revalidate();
        }
        applied
    }

    pub fn add_skill(&mut self) -> bool {
        if self.is_locked() {
            return false;
        }
        self.values.skills.push(String::new());
        self.revalidate();
        true
    }

    pub fn remove_skill(&mut self, index: usize) -> bool {
        if !self.can_remove_skill() || index >= self.values.skills.len() {
            return false;
        }
        self.values.skills.remove(index);
        self.touched = std::mem::take(&mut self.touched)
            .into_iter()
            .filter_map(|p| match p {
                FieldPath::Skill(j) if j == index => None,
                FieldPath::Skill(j) if j > index => Some(FieldPath::Skill(j - 1)),
                other => Some(other),
            })
            .collect();
        self.revalidate();
        true
    }

    /// Drag end. `dest == None` means the drop landed outside the list.
    pub fn reorder_skills(&mut self, source: usize, dest: Option<usize>) -> bool {
        if self.is_locked() {
            return false;
        }
        let len = self.values.skills.len();
        if !move_item(&mut self.values.skills, source, dest) {
            return false;
        }
        let dest = dest.unwrap_or(source);
        self.touched = std::mem::take(&mut self.touched)
            .into_iter()
            .map(|p| match p {
                FieldPath::Skill(j) => FieldPath::Skill(remap_index(j, source, dest, len)),
                other => other,
            })
            .collect();
        self.revalidate();
        true
    }

    /// Validate everything. On success the submitted values are returned and
    /// the reset is scheduled `success_ticks` after `now`.
    pub fn submit(&mut self, now: u64) -> Option<FormValues> {
        if self.is_locked() {
            return None;
        }
        self.touched.extend([
            FieldPath::Name,
            FieldPath::Email,
            FieldPath::Skills,
            FieldPath::RememberMe,
        ]);
        self.errors = self.schema.validate(&self.values);
        if !self.errors.is_empty() {
            return None;
        }
        self.submission = SubmissionState::Succeeded {
            reset_at: now.saturating_add(self.success_ticks),
        };
        Some(self.values.clone())
    }

    /// Back to defaults; also cancels a pending success timer.
    pub fn reset(&mut self) {
        self.values = FormValues::default();
        self.errors.clear();
        self.touched.clear();
        self.submission = SubmissionState::Idle;
    }

    /// Fire the success timer if due. Returns `true` when the form was reset.
    pub fn tick(&mut self, now: u64) -> bool {
        match self.submission {
            SubmissionState::Succeeded { reset_at } if now >= reset_at => {
                self.reset();
                true
            }
            _ => false,
        }
    }

    /// Re-run the rules of every touched field; only touched paths keep
    /// their messages.
    fn revalidate(&mut self) {
        let roots: BTreeSet<FieldPath> = self.touched.iter().map(|p| p.root()).collect();
        let mut errors = FieldErrors::default();
        for root in roots {
            errors.merge(self.schema.validate_field(root, &self.values));
        }
        let touched = &self.touched;
        errors.retain(|p| touched.contains(&p) || touched.contains(&p.root()));
        self.errors = errors;
    }
}
