use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const CONFIG_DIR_NAME: &str = "usage-ledger";
const CONFIG_FILE_NAME: &str = "config.toml";
const DEFAULT_PORT: u16 = 3846;
const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub port: u16,
    /// Falls back to `USAGE_LEDGER_PATH` or the default ledger location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
    pub batch_size: usize,
    pub cache_ttl_secs: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            log_path: None,
            batch_size: ingest::DEFAULT_BATCH_SIZE,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: CliConfig,
    pub paths: ConfigPaths,
    pub created: bool,
}

/// Reads `config.toml`, writing one with defaults on first run.
pub fn load_or_create() -> Result<ConfigLoad, String> {
    let dir = config_dir()?;
    fs::create_dir_all(&dir).map_err(|err| format!("create {}: {}", dir.display(), err))?;
    let paths = ConfigPaths {
        file: dir.join(CONFIG_FILE_NAME),
    };

    let created = !paths.file.exists();
    let config = if created {
        let config = CliConfig::default();
        write_config(&paths, &config)?;
        config
    } else {
        read_config(&paths)?
    };
    Ok(ConfigLoad {
        config,
        paths,
        created,
    })
}

fn read_config(paths: &ConfigPaths) -> Result<CliConfig, String> {
    let file = &paths.file;
    let contents =
        fs::read_to_string(file).map_err(|err| format!("read {}: {}", file.display(), err))?;
    parse_config(&contents).map_err(|err| format!("parse {}: {}", file.display(), err))
}

fn write_config(paths: &ConfigPaths, config: &CliConfig) -> Result<(), String> {
    let contents =
        toml::to_string_pretty(config).map_err(|err| format!("serialize config: {}", err))?;
    fs::write(&paths.file, contents)
        .map_err(|err| format!("write {}: {}", paths.file.display(), err))
}

fn parse_config(contents: &str) -> Result<CliConfig, toml::de::Error> {
    toml::from_str(contents)
}

fn config_dir() -> Result<PathBuf, String> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME))
        .ok_or_else(|| "cannot determine config directory".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = parse_config("port = 4000\n").unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.batch_size, ingest::DEFAULT_BATCH_SIZE);
        assert_eq!(config.cache_ttl_secs, DEFAULT_CACHE_TTL_SECS);
        assert!(config.log_path.is_none());
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let contents = toml::to_string_pretty(&CliConfig::default()).unwrap();
        let parsed = parse_config(&contents).unwrap();
        assert_eq!(parsed.port, DEFAULT_PORT);
        assert!(!contents.contains("log_path"));
    }
}
