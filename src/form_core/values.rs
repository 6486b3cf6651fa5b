use serde::Serialize;
use std::fmt;

/// Current contents of the form. Serialized with the same keys the preview
/// pane and the submission log show.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FormValues {
    pub name: String,
    pub email: String,
    pub skills: Vec<String>,
    #[serde(rename = "rememberMe")]
    pub remember_me: bool,
}

impl Default for FormValues {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            skills: vec![String::new()],
            remember_me: false,
        }
    }
}

impl FormValues {
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".into())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
    List(Vec<String>),
}

/// Address of a single field, including indexed skill entries (`skills.2`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldPath {
    Name,
    Email,
    Skills,
    Skill(usize),
    RememberMe,
}

impl FieldPath {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "skills" => Some(Self::Skills),
            "rememberMe" | "remember_me" => Some(Self::RememberMe),
            other => {
                let idx = other.strip_prefix("skills.")?;
                idx.parse::<usize>().ok().map(Self::Skill)
            }
        }
    }

    /// The top-level field whose rules cover this path.
    pub fn root(&self) -> Self {
        match self {
            Self::Skill(_) => Self::Skills,
            other => *other,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Email => write!(f, "email"),
            Self::Skills => write!(f, "skills"),
            Self::Skill(i) => write!(f, "skills.{i}"),
            Self::RememberMe => write!(f, "rememberMe"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_hold_one_empty_skill() {
        let v = FormValues::default();
        assert_eq!(v.skills, vec![String::new()]);
        assert!(v.name.is_empty());
        assert!(!v.remember_me);
    }

    #[test]
    fn parse_accepts_indexed_skills_and_rejects_garbage() {
        assert_eq!(FieldPath::parse("skills.3"), Some(FieldPath::Skill(3)));
        assert_eq!(FieldPath::parse("rememberMe"), Some(FieldPath::RememberMe));
        assert_eq!(FieldPath::parse("skills.x"), None);
        assert_eq!(FieldPath::parse("age"), None);
        assert_eq!(FieldPath::Skill(3).to_string(), "skills.3");
        assert_eq!(FieldPath::Skill(3).root(), FieldPath::Skills);
    }

    #[test]
    fn json_uses_camel_case_remember_me() {
        let v = FormValues {
            name: "Ann".into(),
            email: "ann@example.com".into(),
            skills: vec!["Go".into()],
            remember_me: true,
        };
        let json = v.to_pretty_json();
        assert!(json.contains("\"rememberMe\": true"));
        assert!(json.contains("\"skills\": [\n    \"Go\"\n  ]"));
    }
}
