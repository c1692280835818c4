/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::generator::SpawnChances;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub fps: u32,
    /// Fixed layout seed; `None` picks a fresh one per run.
    pub seed: Option<u64>,
    /// Directory holding the BMP images; `None` uses the embedded set.
    pub assets_dir: Option<PathBuf>,
    pub spawn: SpawnChances,
    pub log: LogConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LogConfig {
    /// Log file; `None` disables logging.
    pub file: Option<PathBuf>,
    pub level: String,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    assets: TomlAssets,
    #[serde(default)]
    platforms: TomlPlatforms,
    #[serde(default)]
    log: TomlLog,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_fps")]
    fps: u32,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug, Default)]
struct TomlAssets {
    #[serde(default)]
    dir: String,
}

#[derive(Deserialize, Debug, Default)]
struct TomlPlatforms {
    #[serde(default)]
    boost_chance: f64,
    #[serde(default)]
    temporary_chance: f64,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_file")]
    file: String,
    #[serde(default = "default_log_level")]
    level: String,
}

// ── Defaults ──

const MAX_FPS: u32 = 240;

fn default_fps() -> u32 { 60 }
fn default_log_file() -> String { "birdjumper.log".into() }
fn default_log_level() -> String { "info".into() }

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay { fps: default_fps() }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog {
            file: default_log_file(),
            level: default_log_level(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        resolve(TomlConfig::default(), &[])
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        resolve(toml_cfg, &search_dirs)
    }
}

/// Turn the raw schema into the public config, clamping out-of-range
/// values and resolving relative asset paths against the search dirs.
fn resolve(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> GameConfig {
    let assets_dir = match toml_cfg.assets.dir.trim() {
        "" => None,
        dir => Some(resolve_dir(dir, search_dirs)),
    };

    let log_file = match toml_cfg.log.file.trim() {
        "" => None,
        file => Some(PathBuf::from(file)),
    };

    GameConfig {
        fps: toml_cfg.display.fps.clamp(1, MAX_FPS),
        seed: toml_cfg.general.seed,
        assets_dir,
        spawn: SpawnChances {
            boost: clamp_chance(toml_cfg.platforms.boost_chance),
            temporary: clamp_chance(toml_cfg.platforms.temporary_chance),
        },
        log: LogConfig {
            file: log_file,
            level: toml_cfg.log.level,
        },
    }
}

fn clamp_chance(p: f64) -> f64 {
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}

/// Absolute paths are taken as-is; relative ones are looked up in the
/// search dirs, defaulting to CWD-relative.
fn resolve_dir(dir: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let path = Path::new(dir);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    search_dirs.iter()
        .map(|d| d.join(path))
        .find(|p| p.is_dir())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a linked binary still finds files next to
        // the real one.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> GameConfig {
        resolve(toml::from_str::<TomlConfig>(text).unwrap(), &[])
    }

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = parse("");
        assert_eq!(cfg.fps, 60);
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.assets_dir, None);
        assert_eq!(cfg.spawn, SpawnChances::default());
        assert_eq!(cfg.log.file, Some(PathBuf::from("birdjumper.log")));
        assert_eq!(cfg.log.level, "info");
    }

    #[test]
    fn default_matches_empty_file() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.fps, 60);
        assert_eq!(cfg.log, parse("").log);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = parse("[general]\nseed = 1234\n\n[log]\nlevel = \"debug\"\n");
        assert_eq!(cfg.seed, Some(1234));
        assert_eq!(cfg.fps, 60);
        assert_eq!(cfg.log.level, "debug");
        assert_eq!(cfg.log.file, Some(PathBuf::from("birdjumper.log")));
    }

    #[test]
    fn chances_are_clamped() {
        let cfg = parse("[platforms]\nboost_chance = 1.5\ntemporary_chance = -0.2\n");
        assert_eq!(cfg.spawn.boost, 1.0);
        assert_eq!(cfg.spawn.temporary, 0.0);
    }

    #[test]
    fn fps_is_clamped() {
        assert_eq!(parse("[display]\nfps = 0\n").fps, 1);
        assert_eq!(parse("[display]\nfps = 10000\n").fps, MAX_FPS);
    }

    #[test]
    fn empty_strings_disable_optional_paths() {
        let cfg = parse("[assets]\ndir = \"\"\n[log]\nfile = \"\"\n");
        assert_eq!(cfg.assets_dir, None);
        assert_eq!(cfg.log.file, None);
    }

    #[test]
    fn absolute_assets_dir_kept() {
        let cfg = parse("[assets]\ndir = \"/opt/birdjumper/art\"\n");
        assert_eq!(cfg.assets_dir, Some(PathBuf::from("/opt/birdjumper/art")));
    }

    #[test]
    fn relative_assets_dir_found_in_search_dirs() {
        let base = std::env::temp_dir().join(format!("birdjumper-cfg-{}", std::process::id()));
        std::fs::create_dir_all(base.join("art")).unwrap();
        let toml_cfg = toml::from_str::<TomlConfig>("[assets]\ndir = \"art\"\n").unwrap();
        let cfg = resolve(toml_cfg, &[PathBuf::from("/nonexistent"), base.clone()]);
        assert_eq!(cfg.assets_dir, Some(base.join("art")));
        std::fs::remove_dir_all(&base).unwrap();
    }

    #[test]
    fn malformed_file_is_rejected_by_schema() {
        assert!(toml::from_str::<TomlConfig>("[display]\nfps = \"fast\"\n").is_err());
    }
}
