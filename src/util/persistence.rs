use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde_json::Error as SerdeError;
use tracing::{error, info, warn};

use crate::domain::{app_state::PersistedState, RateTable, RateTableError, ServiceDefinition};

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "SailorSkills";
const APP_NAME: &str = "DiveEstimator";

const STATE_FILE: &str = "state.json";
const RATES_FILE: &str = "rates.json";

fn config_file(name: &str) -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME).map(|dirs| dirs.config_dir().join(name))
}

pub fn load_persisted_state() -> Option<PersistedState> {
    load_persisted_state_from(&config_file(STATE_FILE)?)
}

pub fn load_persisted_state_from(path: &Path) -> Option<PersistedState> {
    let data = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&data) {
        Ok(state) => Some(state),
        Err(err) => {
            warn!(path = %path.display(), "ignoring unreadable state file: {err}");
            None
        }
    }
}

pub fn save_persisted_state(state: &PersistedState) -> Result<(), PersistError> {
    let path = config_file(STATE_FILE).ok_or(PersistError::StorageUnavailable)?;
    save_persisted_state_to(&path, state)
}

pub fn save_persisted_state_to(path: &Path, state: &PersistedState) -> Result<(), PersistError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    fs::write(path, json)?;
    Ok(())
}

/// Rate table from `rates.json` in the config dir, or the built-in table.
pub fn load_rate_table() -> RateTable {
    let Some(path) = config_file(RATES_FILE) else {
        return RateTable::default();
    };
    match load_rate_table_override(&path) {
        Ok(Some(table)) => {
            info!(path = %path.display(), services = table.len(), "using rate table override");
            table
        }
        Ok(None) => RateTable::default(),
        Err(err) => {
            error!(path = %path.display(), "rejected rate table override: {err}");
            RateTable::default()
        }
    }
}

/// `Ok(None)` when no override file exists.
pub fn load_rate_table_override(path: &Path) -> Result<Option<RateTable>, PersistError> {
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read_to_string(path)?;
    let services: Vec<ServiceDefinition> = serde_json::from_str(&data)?;
    Ok(Some(RateTable::new(services)?))
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("storage directory unavailable")]
    StorageUnavailable,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
    #[error("invalid rate table: {0}")]
    Rates(#[from] RateTableError),
}
