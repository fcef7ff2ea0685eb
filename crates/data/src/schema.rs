use serde::{Deserialize, Serialize};

pub use runmix_core::{
    Difficulty, DurationRange, DurationTable, GeneratorConfig, KindDuration, KindTransitions,
    Preset, Theme, TransitionTable, WeightedTransition,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Limits {
    pub max_ante: u8,
    pub max_steps: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_ante: runmix_core::DEFAULT_MAX_ANTE,
            max_steps: runmix_core::DEFAULT_MAX_STEPS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThemeTrack {
    pub theme: Theme,
    pub file: String,
}

/// Audio sources behind each theme. The files themselves are never opened
/// here; renderers resolve them against `dir`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackConfig {
    #[serde(default)]
    pub dir: String,
    pub base_length_ms: u64,
    pub themes: Vec<ThemeTrack>,
    #[serde(default)]
    pub pack_sfx: Option<String>,
}

impl TrackConfig {
    pub fn file_for(&self, theme: Theme) -> Option<&str> {
        self.themes
            .iter()
            .find(|entry| entry.theme == theme)
            .map(|entry| entry.file.as_str())
    }
}
