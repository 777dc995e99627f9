mod types;

pub use types::*;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// Directory holding the monitor's settings, created on first use.
pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("No config directory on this platform"))?
        .join("tiltmon");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Location of `config.toml` inside [`config_dir`].
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load the monitor config. The first run has no file yet; the defaults are
/// written out so there is a serial port and threshold block to edit.
pub fn load_or_init_config() -> Result<AppConfig> {
    load_or_init_at(&config_path()?)
}

fn load_or_init_at(path: &Path) -> Result<AppConfig> {
    if path.exists() {
        let contents = std::fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        info!(path = %path.display(), "Loaded monitor config");
        Ok(config)
    } else {
        let config = AppConfig::default();
        save_at(path, &config)?;
        info!(path = %path.display(), "Wrote default monitor config");
        Ok(config)
    }
}

fn save_at(path: &Path, config: &AppConfig) -> Result<()> {
    std::fs::write(path, toml::to_string_pretty(config)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("tilt-config-tests");
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn first_run_writes_defaults_then_reloads_them() {
        let path = scratch_file("first_run.toml");
        let _ = std::fs::remove_file(&path);

        let seeded = load_or_init_at(&path).unwrap();
        assert!(path.exists());
        assert_eq!(seeded.serial.baud_rate, 115_200);

        // Second run reads the file the first run wrote.
        let reloaded = load_or_init_at(&path).unwrap();
        assert_eq!(reloaded.serial.port, seeded.serial.port);
        assert_eq!(reloaded.helm.roll_threshold_deg, 15.0);
    }

    #[test]
    fn edited_file_wins_over_defaults() {
        let path = scratch_file("edited.toml");
        std::fs::write(
            &path,
            "[serial]\nport = \"/dev/ttyACM3\"\nbaud_rate = 57600\n",
        )
        .unwrap();

        let config = load_or_init_at(&path).unwrap();
        assert_eq!(config.serial.port, "/dev/ttyACM3");
        assert_eq!(config.serial.baud_rate, 57_600);
        // Sections the file does not mention keep their defaults.
        assert_eq!(config.monitor.refresh_hz, 30);
    }
}
