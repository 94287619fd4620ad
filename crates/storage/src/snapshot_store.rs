//! Two-slot snapshot persistence.
//!
//! The *current* slot is the published output and is rewritten every cycle.
//! The *last-good* slot only receives snapshots computed while the market
//! was open, so it still holds a sane reference after a run of frozen
//! cycles.

use crate::json::JsonFile;
use crate::Result;
use market_data::MarketSnapshot;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    current: JsonFile<MarketSnapshot>,
    last_good: JsonFile<MarketSnapshot>,
}

impl SnapshotStore {
    pub fn new(current_path: impl Into<PathBuf>, last_good_path: impl Into<PathBuf>) -> Self {
        Self {
            current: JsonFile::new(current_path),
            last_good: JsonFile::new(last_good_path),
        }
    }

    pub fn current_path(&self) -> &Path {
        self.current.path()
    }

    pub fn last_good_path(&self) -> &Path {
        self.last_good.path()
    }

    pub fn read_current(&self) -> Result<Option<MarketSnapshot>> {
        self.current.read()
    }

    pub fn read_last_good(&self) -> Result<Option<MarketSnapshot>> {
        self.last_good.read()
    }

    /// Snapshot to carry forward: the current slot, or the last-good slot
    /// when the current one is absent or unreadable.
    pub fn read_previous(&self) -> Result<Option<MarketSnapshot>> {
        match self.read_current() {
            Ok(Some(snapshot)) => Ok(Some(snapshot)),
            Ok(None) => self.read_last_good(),
            Err(current_err) => {
                warn!(error = %current_err, "Current snapshot unreadable, trying last good");
                match self.read_last_good() {
                    Ok(Some(snapshot)) => Ok(Some(snapshot)),
                    _ => Err(current_err),
                }
            }
        }
    }

    /// Persist `snapshot`: always to the current slot, and to the last-good
    /// slot unless it is frozen.
    pub fn commit(&self, snapshot: &MarketSnapshot) -> Result<()> {
        self.current.write(snapshot)?;
        if !snapshot.frozen {
            self.last_good.write(snapshot)?;
        }
        debug!(
            frozen = snapshot.frozen,
            market_date = %snapshot.market_date,
            "Snapshot committed"
        );
        Ok(())
    }
}
