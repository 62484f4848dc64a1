use crate::input::{ingest_config, QuoterConfig};
use anyhow::Context;
use std::fmt::Debug;
use std::fs::File;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Region whose configuration the quote pages read.
pub const DEFAULT_REGION_ID: &str = "bolivia";

/// Source of the quoter configuration, one document per region.
pub trait ConfigStore: Debug {
    /// Fetch the configuration for a region, or `None` when the region has none.
    fn fetch_quoter_config(&self, region_id: &str) -> anyhow::Result<Option<QuoterConfig>>;
}

/// A store holding each region's configuration as `<region_id>.json` in a directory.
#[derive(Debug)]
pub struct JsonDirectoryStore {
    directory_path: PathBuf,
}

impl JsonDirectoryStore {
    pub fn new(directory_path: impl Into<PathBuf>) -> Self {
        Self {
            directory_path: directory_path.into(),
        }
    }
}

impl ConfigStore for JsonDirectoryStore {
    #[instrument(skip(self))]
    fn fetch_quoter_config(&self, region_id: &str) -> anyhow::Result<Option<QuoterConfig>> {
        let path = self.directory_path.join(format!("{region_id}.json"));
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("No configuration document at {}", path.display());
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        ingest_config(file)
            .with_context(|| format!("Failed to read configuration from {}", path.display()))
            .map(Some)
    }
}

impl<T: ConfigStore> ConfigStore for &T {
    fn fetch_quoter_config(&self, region_id: &str) -> anyhow::Result<Option<QuoterConfig>> {
        <T as ConfigStore>::fetch_quoter_config(self, region_id)
    }
}
