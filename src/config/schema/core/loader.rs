use super::Config;
use super::types::{CONFIG_FILE_NAME, DATA_DIR_NAME};
use anyhow::{Context, Result};
use directories::UserDirs;
use std::fs;
use std::path::{Path, PathBuf};

impl Config {
    /// Load `~/.nanobanana/config.toml` (or `config_override`), writing the
    /// defaults on first run, then apply environment overrides and validate.
    pub fn load_or_init(config_override: Option<&str>) -> Result<Self> {
        let config_path = match config_override {
            Some(raw) => PathBuf::from(shellexpand::tilde(raw).as_ref()),
            None => {
                let home = UserDirs::new()
                    .map(|u| u.home_dir().to_path_buf())
                    .context("Could not find home directory")?;
                home.join(DATA_DIR_NAME).join(CONFIG_FILE_NAME)
            }
        };

        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides();
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Read `config_path`, creating it with defaults when absent. The data
    /// directory is the file's parent.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let data_dir = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        if !data_dir.exists() {
            fs::create_dir_all(&data_dir).context("Failed to create data directory")?;
        }

        if config_path.exists() {
            let contents = fs::read_to_string(config_path).context("Failed to read config file")?;
            let mut config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            config.config_path = config_path.to_path_buf();
            config.data_dir = data_dir;
            Ok(config)
        } else {
            let config = Self {
                config_path: config_path.to_path_buf(),
                data_dir,
                ..Self::default()
            };
            config.save()?;
            tracing::info!(path = %config_path.display(), "wrote default config");
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }
}
