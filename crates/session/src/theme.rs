use serde::{Deserialize, Serialize};

/// Process-wide light/dark choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    Light,
    Dark,
}

impl ThemePreference {
    pub fn toggle(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    /// Label of the button that switches away from the current theme.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Self::Light => "Dark",
            Self::Dark => "Light",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_and_labels_the_other_mode() {
        let theme = ThemePreference::default();
        assert!(!theme.is_dark());
        assert_eq!(theme.toggle_label(), "Dark");

        let toggled = theme.toggle();
        assert!(toggled.is_dark());
        assert_eq!(toggled.toggle_label(), "Light");
        assert_eq!(toggled.toggle(), ThemePreference::Light);
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&ThemePreference::Dark).expect("serialize");
        assert_eq!(json, "\"dark\"");
        let parsed: ThemePreference = serde_json::from_str("\"light\"").expect("parse");
        assert_eq!(parsed, ThemePreference::Light);
    }
}
