use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Player preferences that travel with a snapshot.
///
/// Each field is independently optional so that "explicitly false" and
/// "never set" stay distinguishable during a merge. The API key is not
/// here: it belongs to the local configuration and is never synced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_reasoning: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier2_focus: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_info: Option<bool>,
}

/// Settings with every default applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ResolvedSettings {
    pub ai_enabled: bool,
    pub show_reasoning: bool,
    pub tier2_focus: bool,
    pub extended_info: bool,
}

impl Default for ResolvedSettings {
    fn default() -> Self {
        Self {
            ai_enabled: false,
            show_reasoning: true,
            tier2_focus: false,
            extended_info: false,
        }
    }
}

impl Settings {
    pub fn resolve(&self) -> ResolvedSettings {
        let defaults = ResolvedSettings::default();
        ResolvedSettings {
            ai_enabled: self.ai_enabled.unwrap_or(defaults.ai_enabled),
            show_reasoning: self.show_reasoning.unwrap_or(defaults.show_reasoning),
            tier2_focus: self.tier2_focus.unwrap_or(defaults.tier2_focus),
            extended_info: self.extended_info.unwrap_or(defaults.extended_info),
        }
    }
}

impl From<ResolvedSettings> for Settings {
    fn from(resolved: ResolvedSettings) -> Self {
        Self {
            ai_enabled: Some(resolved.ai_enabled),
            show_reasoning: Some(resolved.show_reasoning),
            tier2_focus: Some(resolved.tier2_focus),
            extended_info: Some(resolved.extended_info),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fields_are_dropped() {
        let json = r#"{"aiEnabled":true,"apiKey":"sk-secret","tier2Focus":false}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.ai_enabled, Some(true));
        assert_eq!(settings.tier2_focus, Some(false));
        assert_eq!(settings.show_reasoning, None);

        let round_tripped = serde_json::to_string(&settings).unwrap();
        assert!(!round_tripped.contains("apiKey"));
        assert!(!round_tripped.contains("sk-secret"));
    }

    #[test]
    fn test_resolve_keeps_explicit_false() {
        let settings = Settings {
            show_reasoning: Some(false),
            ..Settings::default()
        };

        let resolved = settings.resolve();
        assert!(!resolved.show_reasoning);
        assert!(!resolved.ai_enabled);
    }
}
