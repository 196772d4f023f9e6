use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::seed::DEFAULT_SEED_CSV;
use crate::storage::StoreConfig;
use crate::storage::sqlite::DEFAULT_DATABASE;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HealthdashConfig {
    pub database: Option<String>,
    pub seed_csv: Option<String>,
}

/// Effective locations after merging flags, config file and defaults
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database: PathBuf,
    pub seed_csv: PathBuf,
}

impl Settings {
    /// Flags win over the config file, which wins over defaults
    pub fn resolve(
        config: Option<&HealthdashConfig>,
        database: Option<PathBuf>,
        seed_csv: Option<PathBuf>,
    ) -> Self {
        let file_database = config.and_then(|c| c.database.as_deref()).map(PathBuf::from);
        let file_seed_csv = config.and_then(|c| c.seed_csv.as_deref()).map(PathBuf::from);
        Self {
            database: database
                .or(file_database)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE)),
            seed_csv: seed_csv
                .or(file_seed_csv)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SEED_CSV)),
        }
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(&self.database)
    }

    pub fn to_config(&self) -> HealthdashConfig {
        HealthdashConfig {
            database: Some(self.database.display().to_string()),
            seed_csv: Some(self.seed_csv.display().to_string()),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("healthdash.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<HealthdashConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: HealthdashConfig = toml::from_str(&contents)?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &HealthdashConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}
