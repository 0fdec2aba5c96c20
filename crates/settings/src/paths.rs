use std::path::PathBuf;

/// Overrides the config directory, mostly for portable installs and tests.
pub const HOME_ENV: &str = "NOSILENCE_HOME";

const APP_DIR: &str = "nosilence";

/// `$NOSILENCE_HOME`, else the platform config dir joined with `nosilence`,
/// else the current directory.
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(HOME_ENV) {
        return PathBuf::from(dir);
    }
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn config_file() -> PathBuf {
    config_dir().join("config.json")
}

pub fn secrets_file() -> PathBuf {
    config_dir().join("secrets.json")
}

pub fn token_cache_file() -> PathBuf {
    config_dir().join("token.json")
}

pub fn ensure_dir(path: &std::path::Path) -> std::io::Result<()> {
    std::fs::create_dir_all(path)
}
