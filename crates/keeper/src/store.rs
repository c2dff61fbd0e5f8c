//! JSON snapshot of the engine state.

use std::fs;
use std::path::{Path, PathBuf};

use nextcopper_core::{ElasticState, GenesisParams};

use crate::error::{KeeperError, KeeperResult};

#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saved state, or `None` if nothing was saved yet
    pub fn load(&self) -> KeeperResult<Option<ElasticState>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        let state: ElasticState = serde_json::from_str(&content)?;
        if !state.ledger().is_consistent() {
            return Err(KeeperError::StateError(format!(
                "ledger in {} does not sum to its total supply",
                self.path.display()
            )));
        }
        Ok(Some(state))
    }

    pub fn load_or_genesis(&self, params: GenesisParams) -> KeeperResult<ElasticState> {
        match self.load()? {
            Some(state) => {
                log::info!(
                    "Loaded state from {} ({} rebases, supply {})",
                    self.path.display(),
                    state.period().rebase_count(),
                    state.total_supply()
                );
                Ok(state)
            }
            None => {
                log::info!("No saved state at {}, starting from genesis", self.path.display());
                Ok(ElasticState::genesis(params)?)
            }
        }
    }

    /// Write to a sibling temp file, then rename over the snapshot
    pub fn save(&self, state: &ElasticState) -> KeeperResult<()> {
        let content = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        log::debug!("Saved state to {}", self.path.display());
        Ok(())
    }
}
