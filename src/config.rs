use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::discovery::DEFAULT_MAX_HOPS;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RelgraphConfig {
    pub database: Option<String>,
    pub max_hops: Option<usize>,
}

impl RelgraphConfig {
    pub fn max_hops(&self) -> usize {
        self.max_hops.unwrap_or(DEFAULT_MAX_HOPS)
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("relgraph.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".relgraph").join("relgraph.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<RelgraphConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: RelgraphConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &RelgraphConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("relgraph.toml");

        let config = RelgraphConfig {
            database: Some("catalog.db".into()),
            max_hops: Some(2),
        };
        write_config(&path, &config, false).unwrap();

        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded.database.as_deref(), Some("catalog.db"));
        assert_eq!(loaded.max_hops(), 2);
    }

    #[test]
    fn test_write_refuses_overwrite_without_force() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("relgraph.toml");
        let config = RelgraphConfig::default();

        write_config(&path, &config, false).unwrap();
        assert!(write_config(&path, &config, false).is_err());
        assert!(write_config(&path, &config, true).is_ok());
    }

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(load_config(Some(&path)).unwrap().is_none());
    }
}
