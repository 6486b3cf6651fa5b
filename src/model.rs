use crate::form_core::FieldValue;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_title")]
    pub title: String,
    // How long the success banner stays up before the form resets
    #[serde(default = "default_success_seconds")]
    pub success_seconds: f64,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default)]
    pub theme: ThemeName,
    // Show the live JSON preview of the values. Default: true.
    #[serde(default = "default_true")]
    pub show_preview: bool,
    // Values filled in at startup, keyed by field name (`name`, `skills`, `skills.1`, ...)
    #[serde(default)]
    pub initial: BTreeMap<String, serde_yaml::Value>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            success_seconds: default_success_seconds(),
            tick_ms: default_tick_ms(),
            theme: ThemeName::Dark,
            show_preview: true,
            initial: BTreeMap::new(),
        }
    }
}

fn default_title() -> String {
    "Form".to_string()
}

fn default_success_seconds() -> f64 {
    3.0
}

fn default_tick_ms() -> u64 {
    200
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Success timeout expressed in UI ticks (at least one).
    pub fn success_ticks(&self) -> u64 {
        let tick = self.tick_ms.max(1) as f64;
        let ticks = (self.success_seconds.max(0.0) * 1000.0 / tick).ceil() as u64;
        ticks.max(1)
    }

    /// Toast lifetime in ticks for a duration in seconds.
    pub fn ticks_for_seconds(&self, seconds: u64) -> u64 {
        seconds.saturating_mul(1000) / self.tick_ms.max(1)
    }
}

/// Map a YAML scalar/sequence onto a form value. `None` for shapes no field takes.
pub(crate) fn field_value_from_yaml(v: &serde_yaml::Value) -> Option<FieldValue> {
    match v {
        serde_yaml::Value::String(s) => Some(FieldValue::Text(s.clone())),
        serde_yaml::Value::Bool(b) => Some(FieldValue::Bool(*b)),
        serde_yaml::Value::Sequence(items) => items
            .iter()
            .map(|i| i.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .map(FieldValue::List),
        _ => None,
    }
}

pub(crate) fn validate_app_config(cfg: &AppConfig) -> Result<(), String> {
    if !cfg.success_seconds.is_finite() || cfg.success_seconds < 0.0 {
        return Err(format!(
            "success_seconds must be a non-negative number, got {}",
            cfg.success_seconds
        ));
    }
    if cfg.tick_ms == 0 {
        return Err("tick_ms must be greater than zero".to_string());
    }
    Ok(())
}
