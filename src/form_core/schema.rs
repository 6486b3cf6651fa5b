use super::values::{FieldPath, FormValues};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

pub fn is_valid_email(s: &str) -> bool {
    email_regex().is_match(s)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Predicate {
    /// Text must be non-empty after trimming.
    Required,
    /// Non-empty text must look like an email address.
    Email,
    /// List must hold at least this many entries.
    MinItems(usize),
    /// Every list entry must be non-empty after trimming.
    EachRequired,
}

impl Predicate {
    /// Paths violating this predicate for `field`.
    fn failures(&self, field: FieldPath, values: &FormValues) -> Vec<FieldPath> {
        match self {
            Predicate::Required => match text_of(field, values) {
                Some(s) if s.trim().is_empty() => vec![field],
                _ => Vec::new(),
            },
            Predicate::Email => match text_of(field, values) {
                // the stored value is what gets submitted, so it is matched as-is
                Some(s) if !s.trim().is_empty() && !is_valid_email(s) => vec![field],
                _ => Vec::new(),
            },
            Predicate::MinItems(n) => match list_of(field, values) {
                Some(items) if items.len() < *n => vec![field],
                _ => Vec::new(),
            },
            Predicate::EachRequired => match list_of(field, values) {
                Some(items) => items
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.trim().is_empty())
                    .map(|(i, _)| FieldPath::Skill(i))
                    .collect(),
                None => Vec::new(),
            },
        }
    }
}

fn text_of(field: FieldPath, values: &FormValues) -> Option<&str> {
    match field {
        FieldPath::Name => Some(values.name.as_str()),
        FieldPath::Email => Some(values.email.as_str()),
        FieldPath::Skill(i) => values.skills.get(i).map(|s| s.as_str()),
        _ => None,
    }
}

fn list_of(field: FieldPath, values: &FormValues) -> Option<&[String]> {
    match field {
        FieldPath::Skills => Some(values.skills.as_slice()),
        _ => None,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    pub predicate: Predicate,
    pub message: String,
}

impl Rule {
    pub fn new(predicate: Predicate, message: impl Into<String>) -> Self {
        Self {
            predicate,
            message: message.into(),
        }
    }
}

/// Per-field validation messages. A path without a violation has no entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<FieldPath, String>);

impl FieldErrors {
    pub fn get(&self, path: FieldPath) -> Option<&str> {
        self.0.get(&path).map(|s| s.as_str())
    }
    pub fn contains(&self, path: FieldPath) -> bool {
        self.0.contains_key(&path)
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    /// Fold in entries from `other`; existing messages win.
    pub fn merge(&mut self, other: FieldErrors) {
        for (path, message) in other.0 {
            self.0.entry(path).or_insert(message);
        }
    }
    pub fn clear(&mut self) {
        self.0.clear();
    }
    pub fn retain(&mut self, mut keep: impl FnMut(FieldPath) -> bool) {
        self.0.retain(|p, _| keep(*p));
    }
    fn insert_first(&mut self, path: FieldPath, message: &str) {
        self.0.entry(path).or_insert_with(|| message.to_string());
    }
}

/// Field -> ordered rules. The first failing rule for a path supplies its
/// message; fields are evaluated independently.
#[derive(Clone, Debug)]
pub struct Schema {
    rules: Vec<(FieldPath, Vec<Rule>)>,
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
            .field(
                FieldPath::Name,
                vec![Rule::new(Predicate::Required, "Name is required")],
            )
            .field(
                FieldPath::Email,
                vec![
                    Rule::new(Predicate::Required, "Email is required"),
                    Rule::new(Predicate::Email, "Invalid email format"),
                ],
            )
            .field(
                FieldPath::Skills,
                vec![
                    Rule::new(Predicate::MinItems(1), "At least one skill is required"),
                    Rule::new(Predicate::EachRequired, "Skill is required"),
                ],
            )
    }
}

impl Schema {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn field(mut self, path: FieldPath, rules: Vec<Rule>) -> Self {
        self.rules.push((path.root(), rules));
        self
    }

    pub fn validate(&self, values: &FormValues) -> FieldErrors {
        let mut errors = FieldErrors::default();
        for (field, _) in &self.rules {
            self.validate_into(*field, values, &mut errors);
        }
        errors
    }

    /// Errors for one top-level field (and its indexed entries).
    pub fn validate_field(&self, field: FieldPath, values: &FormValues) -> FieldErrors {
        let mut errors = FieldErrors::default();
        self.validate_into(field.root(), values, &mut errors);
        errors
    }

    fn validate_into(&self, field: FieldPath, values: &FormValues, errors: &mut FieldErrors) {
        for (f, rules) in self.rules.iter().filter(|(f, _)| *f == field) {
            for rule in rules {
                for path in rule.predicate.failures(*f, values) {
                    errors.insert_first(path, &rule.message);
                }
            }
        }
    }
}
