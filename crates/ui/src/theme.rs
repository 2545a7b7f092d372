use std::path::PathBuf;

use gpui::{App, Window};
use gpui_component::{Theme, ThemeMode};
use sdm_session::ThemePreference;

/// Directory watched for user theme overrides.
pub fn default_themes_path() -> PathBuf {
    PathBuf::from("./themes")
}

pub fn theme_mode(preference: ThemePreference) -> ThemeMode {
    match preference {
        ThemePreference::Light => ThemeMode::Light,
        ThemePreference::Dark => ThemeMode::Dark,
    }
}

/// Switches the global gpui-component theme. Pass the window to refresh it immediately.
pub fn apply_theme(preference: ThemePreference, window: Option<&mut Window>, cx: &mut App) {
    Theme::change(theme_mode(preference), window, cx);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[::core::prelude::v1::test]
    fn preference_maps_onto_component_mode() {
        assert!(!theme_mode(ThemePreference::Light).is_dark());
        assert!(theme_mode(ThemePreference::Dark).is_dark());
        assert!(theme_mode(ThemePreference::Light.toggle()).is_dark());
    }

    #[::core::prelude::v1::test]
    fn themes_live_next_to_the_binary() {
        assert_eq!(default_themes_path(), PathBuf::from("./themes"));
    }
}
