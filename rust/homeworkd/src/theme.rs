use crate::storage::KeyValueStore;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const THEME_KEY: &str = "homework-tracker-theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    #[default]
    WhiteGold,
    Sunset,
    Ocean,
    Forest,
    Cherry,
    Midnight,
}

impl Theme {
    pub const ALL: [Theme; 6] = [
        Theme::WhiteGold,
        Theme::Sunset,
        Theme::Ocean,
        Theme::Forest,
        Theme::Cherry,
        Theme::Midnight,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::WhiteGold => "white-gold",
            Self::Sunset => "sunset",
            Self::Ocean => "ocean",
            Self::Forest => "forest",
            Self::Cherry => "cherry",
            Self::Midnight => "midnight",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

pub struct ThemePreference<S> {
    storage: S,
}

impl<S: KeyValueStore> ThemePreference<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Stored theme, or the default when nothing valid is stored.
    pub fn load(&self) -> Theme {
        let raw = match self.storage.get(THEME_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Theme::default(),
            Err(e) => {
                warn!(error = %format!("{e:#}"), "error loading theme; using default");
                return Theme::default();
            }
        };
        // Accept both a JSON string and a bare identifier.
        let ident = serde_json::from_str::<String>(&raw).unwrap_or(raw);
        match Theme::parse(&ident) {
            Some(theme) => theme,
            None => {
                warn!(stored = %ident, "ignoring unknown theme");
                Theme::default()
            }
        }
    }

    pub fn save(&self, theme: Theme) -> anyhow::Result<()> {
        let raw = serde_json::to_string(&theme).context("failed to serialize theme")?;
        self.storage
            .set(THEME_KEY, &raw)
            .context("failed to write theme")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryKv;

    #[test]
    fn defaults_when_missing() {
        let pref = ThemePreference::new(MemoryKv::default());
        assert_eq!(pref.load(), Theme::WhiteGold);
    }

    #[test]
    fn save_then_load() {
        let pref = ThemePreference::new(MemoryKv::default());
        pref.save(Theme::Midnight).expect("save");
        assert_eq!(pref.load(), Theme::Midnight);
        assert_eq!(pref.storage.raw(THEME_KEY).as_deref(), Some("\"midnight\""));
    }

    #[test]
    fn bare_identifier_is_accepted() {
        let pref = ThemePreference::new(MemoryKv::with_entry(THEME_KEY, "ocean"));
        assert_eq!(pref.load(), Theme::Ocean);
    }

    #[test]
    fn invalid_value_falls_back_to_default() {
        let pref = ThemePreference::new(MemoryKv::with_entry(THEME_KEY, "\"neon\""));
        assert_eq!(pref.load(), Theme::WhiteGold);
        let pref = ThemePreference::new(MemoryKv::with_entry(THEME_KEY, "42"));
        assert_eq!(pref.load(), Theme::WhiteGold);
    }

    #[test]
    fn identifiers_round_trip_through_parse() {
        for t in Theme::ALL {
            assert_eq!(Theme::parse(t.as_str()), Some(t));
        }
        assert_eq!(Theme::parse("White-Gold"), None);
    }
}
