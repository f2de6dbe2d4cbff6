use std::path::PathBuf;

use jukebox_config::{ConfigError, SaveJSONConfiguration, SavedLocations};
use parking_lot::Mutex;

/// Orders writes of the location list.
///
/// Every snapshot gets a version. A write only lands if nothing newer has
/// been written already, and writes never overlap.
#[derive(Default)]
pub struct LocationWriter {
    taken: Mutex<u64>,
    written: tokio::sync::Mutex<u64>,
}

impl LocationWriter {
    /// Versions follow the order the snapshots were taken in.
    pub fn snapshot(&self, take: impl FnOnce() -> SavedLocations) -> (u64, SavedLocations) {
        let mut taken = self.taken.lock();
        *taken += 1;
        (*taken, take())
    }

    pub async fn write(
        &self,
        version: u64,
        saved: SavedLocations,
        path: PathBuf,
    ) -> Result<(), ConfigError> {
        let mut written = self.written.lock().await;
        if version <= *written {
            log::debug!("Skipping save #{version}, #{} is newer", *written);
            return Ok(());
        }
        saved.save(path).await?;
        *written = version;
        Ok(())
    }
}
