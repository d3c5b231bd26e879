//! Configuration Vault – reads/writes `~/.kinematic/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted user configuration stored in `~/.kinematic/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Length of the estimator's state vector. The demo arm needs 10.
    #[serde(default = "default_n_state_variables")]
    pub n_state_variables: usize,

    /// Number of sensors feeding the estimator.
    #[serde(default = "default_n_sensors")]
    pub n_sensors: usize,

    /// Joint increment applied by the demo estimator on every `/step`.
    #[serde(default = "default_step_size_rad")]
    pub step_size_rad: f64,

    /// Source frame used by a bare `/tf`.
    #[serde(default = "default_source_frame")]
    pub default_source_frame: String,

    /// Target frame used by a bare `/tf`.
    #[serde(default = "default_target_frame")]
    pub default_target_frame: String,
}

fn default_n_state_variables() -> usize {
    10
}
fn default_n_sensors() -> usize {
    3
}
fn default_step_size_rad() -> f64 {
    0.05
}
fn default_source_frame() -> String {
    "base".to_string()
}
fn default_target_frame() -> String {
    "tool".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            n_state_variables: default_n_state_variables(),
            n_sensors: default_n_sensors(),
            step_size_rad: default_step_size_rad(),
            default_source_frame: default_source_frame(),
            default_target_frame: default_target_frame(),
        }
    }
}

/// Return the path to `~/.kinematic/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".kinematic").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let mut cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `KINEMATIC_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `KINEMATIC_N_STATE_VARIABLES` | `n_state_variables` |
/// | `KINEMATIC_N_SENSORS` | `n_sensors` |
/// | `KINEMATIC_STEP_SIZE_RAD` | `step_size_rad` |
///
/// Values that do not parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("KINEMATIC_N_STATE_VARIABLES")
        && let Ok(n) = v.parse::<usize>()
    {
        cfg.n_state_variables = n;
    }
    if let Ok(v) = std::env::var("KINEMATIC_N_SENSORS")
        && let Ok(n) = v.parse::<usize>()
    {
        cfg.n_sensors = n;
    }
    if let Ok(v) = std::env::var("KINEMATIC_STEP_SIZE_RAD")
        && let Ok(step) = v.parse::<f64>()
        && step.is_finite()
    {
        cfg.step_size_rad = step;
    }
}

/// Save the config to disk, creating `~/.kinematic/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(raw.as_bytes())
            })
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        save_to(&Config::default(), &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.n_state_variables, 10);
        assert_eq!(loaded.default_source_frame, "base");
        assert_eq!(loaded.default_target_frame, "tool");
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_target_frame = \"camera\"\n").expect("write");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.default_target_frame, "camera");
        assert_eq!(loaded.default_source_frame, "base");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "n_sensors = \"three\"\n").expect("write");

        let err = load_from(&path).unwrap_err();
        assert!(err.starts_with("Failed to parse config"));
    }

    #[cfg(unix)]
    #[test]
    fn config_file_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        save_to(&Config::default(), &path).expect("save");

        let file_mode = std::fs::metadata(&path).expect("file metadata").permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600);

        let dir_meta = std::fs::metadata(path.parent().unwrap()).expect("dir metadata");
        assert_eq!(dir_meta.permissions().mode() & 0o777, 0o700);
    }

    #[test]
    fn config_path_points_to_kinematic_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".kinematic"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        assert!(load_from(&path).expect("no error").is_none());
    }

    #[test]
    fn apply_env_overrides_changes_sensor_count() {
        // SAFETY: no other test reads this variable.
        unsafe { std::env::set_var("KINEMATIC_N_SENSORS", "7") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.n_sensors, 7);
        unsafe { std::env::remove_var("KINEMATIC_N_SENSORS") };
    }

    #[test]
    fn apply_env_overrides_changes_step_size() {
        // SAFETY: no other test reads this variable.
        unsafe { std::env::set_var("KINEMATIC_STEP_SIZE_RAD", "0.25") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert!((cfg.step_size_rad - 0.25).abs() < 1e-12);
        unsafe { std::env::remove_var("KINEMATIC_STEP_SIZE_RAD") };
    }

    #[test]
    fn apply_env_overrides_ignores_invalid_state_size() {
        // SAFETY: no other test reads this variable.
        unsafe { std::env::set_var("KINEMATIC_N_STATE_VARIABLES", "lots") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.n_state_variables, 10);
        unsafe { std::env::remove_var("KINEMATIC_N_STATE_VARIABLES") };
    }
}
