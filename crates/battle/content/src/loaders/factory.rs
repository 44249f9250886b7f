//! Content factory for loading a battle from a data directory.

use std::path::{Path, PathBuf};

use battle_core::BattleConfig;
use tracing::debug;

use crate::loaders::{ConfigLoader, LoadResult, Roster, RosterLoader};

/// Loads battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── battle.toml   (optional)
/// └── roster.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub const CONFIG_FILE: &'static str = "battle.toml";
    pub const ROSTER_FILE: &'static str = "roster.ron";

    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// The data directory shipped with this crate.
    pub fn bundled() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Loads `battle.toml`, falling back to defaults when the file is absent.
    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        let path = self.data_dir.join(Self::CONFIG_FILE);
        if !path.exists() {
            debug!(target: "battle::content", path = %path.display(), "no battle config; using defaults");
            return Ok(BattleConfig::default());
        }
        ConfigLoader::load(&path)
    }

    pub fn load_roster(&self) -> LoadResult<Roster> {
        RosterLoader::load(&self.data_dir.join(Self::ROSTER_FILE))
    }
}
