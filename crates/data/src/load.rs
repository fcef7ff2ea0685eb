use crate::schema::{
    Difficulty, DurationTable, GeneratorConfig, Limits, Preset, Theme, TrackConfig,
    TransitionTable,
};
use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const DURATIONS_FILE: &str = "durations.json";
const TRANSITIONS_FILE: &str = "transitions.json";
const DIFFICULTY_FILE: &str = "difficulty.json";
const LIMITS_FILE: &str = "limits.json";
const TRACKS_FILE: &str = "tracks.json";
const PRESETS_DIR: &str = "presets";

/// Load a generator config from a directory of JSON tables.
/// `difficulty.json` and `limits.json` are optional.
pub fn load_generator_config(dir: &Path) -> anyhow::Result<GeneratorConfig> {
    let durations: DurationTable = load_json(dir.join(DURATIONS_FILE))?;
    let transitions: TransitionTable = load_json(dir.join(TRANSITIONS_FILE))?;
    let difficulty: Difficulty = load_optional_json(dir.join(DIFFICULTY_FILE))?.unwrap_or_default();
    let limits: Limits = load_optional_json(dir.join(LIMITS_FILE))?.unwrap_or_default();

    let config = GeneratorConfig {
        durations,
        transitions,
        difficulty,
        max_ante: limits.max_ante,
        max_steps: limits.max_steps,
    };
    config
        .validate()
        .with_context(|| format!("validate generator config in {}", dir.display()))?;
    Ok(config)
}

pub fn preset_dir(assets_dir: &Path, name: &str) -> PathBuf {
    assets_dir.join(PRESETS_DIR).join(name)
}

/// Load `assets/presets/<name>`.
pub fn load_preset(assets_dir: &Path, name: &str) -> anyhow::Result<GeneratorConfig> {
    let dir = preset_dir(assets_dir, name);
    if !dir.is_dir() {
        bail!("preset {name} not found under {}", assets_dir.display());
    }
    debug!(preset = name, dir = %dir.display(), "loading preset");
    load_generator_config(&dir).with_context(|| format!("load preset {name}"))
}

pub fn builtin_preset(preset: Preset) -> GeneratorConfig {
    GeneratorConfig::preset(preset)
}

/// Preset names found on disk, sorted.
pub fn list_presets(assets_dir: &Path) -> anyhow::Result<Vec<String>> {
    let dir = assets_dir.join(PRESETS_DIR);
    let mut names = Vec::new();
    for entry in fs::read_dir(&dir).with_context(|| format!("read {}", dir.display()))? {
        let entry = entry.with_context(|| format!("read {}", dir.display()))?;
        if entry.path().is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

pub fn load_track_config(assets_dir: &Path) -> anyhow::Result<TrackConfig> {
    let path = assets_dir.join(TRACKS_FILE);
    let config: TrackConfig = load_json(&path)?;
    validate_track_config(&config).with_context(|| format!("validate {}", path.display()))?;
    Ok(config)
}

pub fn validate_track_config(config: &TrackConfig) -> anyhow::Result<()> {
    if config.base_length_ms == 0 {
        bail!("base_length_ms must be positive");
    }
    let mut seen = HashSet::new();
    for entry in &config.themes {
        if !seen.insert(entry.theme) {
            bail!("theme {:?} listed twice", entry.theme);
        }
        if entry.file.trim().is_empty() {
            bail!("theme {:?} has an empty file name", entry.theme);
        }
    }
    for theme in Theme::ALL {
        if !seen.contains(&theme) {
            bail!("missing track for theme {theme:?}");
        }
    }
    Ok(())
}

fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}

fn load_optional_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<Option<T>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }
    load_json(path).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ThemeTrack;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let dir = std::env::temp_dir().join(format!(
            "runmix_data_{name}_{}_{nanos}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    fn write_json<T: serde::Serialize>(dir: &Path, file: &str, value: &T) {
        let raw = serde_json::to_string_pretty(value).expect("serialize");
        fs::write(dir.join(file), raw).expect("write json");
    }

    #[test]
    fn round_trips_builtin_tables_through_files() {
        let dir = temp_dir("roundtrip");
        let flat = GeneratorConfig::flat();
        write_json(&dir, DURATIONS_FILE, &flat.durations);
        write_json(&dir, TRANSITIONS_FILE, &flat.transitions);
        let loaded = load_generator_config(&dir).expect("load config");
        assert_eq!(loaded, flat);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_transitions_file_names_the_path() {
        let dir = temp_dir("missing");
        write_json(&dir, DURATIONS_FILE, &DurationTable::default());
        let err = load_generator_config(&dir).expect_err("should fail");
        assert!(format!("{err:#}").contains(TRANSITIONS_FILE));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn invalid_tables_fail_validation() {
        let dir = temp_dir("invalid");
        let mut durations = DurationTable::default();
        durations.loss_pause.step = 0;
        write_json(&dir, DURATIONS_FILE, &durations);
        write_json(&dir, TRANSITIONS_FILE, &TransitionTable::classic());
        let err = load_generator_config(&dir).expect_err("should fail");
        assert!(format!("{err:#}").contains("loss_pause"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn unknown_preset_is_an_error() {
        let dir = temp_dir("nopreset");
        assert!(load_preset(&dir, "v9").is_err());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn track_config_needs_every_theme() {
        let mut config = TrackConfig {
            dir: String::new(),
            base_length_ms: 1_000,
            themes: Theme::ALL
                .iter()
                .map(|theme| ThemeTrack {
                    theme: *theme,
                    file: format!("{theme:?}.mp3"),
                })
                .collect(),
            pack_sfx: None,
        };
        validate_track_config(&config).expect("complete table");
        config.themes.pop();
        assert!(validate_track_config(&config).is_err());
        config.themes.push(config.themes[0].clone());
        assert!(validate_track_config(&config).is_err());
    }
}
