//! Sources of compiled zone data and a per-identifier zone cache.
//!
//! Zone construction is a pure function of the bytes handed to it. Where
//! those bytes come from is modeled by [`ZoneDataProvider`], so a zoneinfo
//! directory, embedded data or test fixtures can be swapped freely.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::error::{Result, ZoneError};
use crate::zone::ZoneInfo;

/// Supplies the raw compiled bytes for a zone identifier.
pub trait ZoneDataProvider: Send + Sync {
    /// Return the compiled data for `id`, or [`ZoneError::NotFound`].
    fn bytes_for_zone(&self, id: &str) -> Result<Vec<u8>>;
}

/// Reads compiled zones from a zoneinfo directory such as
/// `/usr/share/zoneinfo`.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    root: PathBuf,
}

impl DirectoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryProvider { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file holding `id`, or `None` if `id` is not a plain relative
    /// path (empty, absolute, or containing `.`/`..` components).
    pub fn zone_path(&self, id: &str) -> Option<PathBuf> {
        let relative = Path::new(id);
        let plain = !id.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        plain.then(|| self.root.join(relative))
    }
}

impl ZoneDataProvider for DirectoryProvider {
    fn bytes_for_zone(&self, id: &str) -> Result<Vec<u8>> {
        let path = self
            .zone_path(id)
            .ok_or_else(|| ZoneError::NotFound(id.to_string()))?;
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::IsADirectory) => {
                Err(ZoneError::NotFound(id.to_string()))
            }
            Err(e) if path.is_dir() => {
                debug!(zone = id, error = %e, "zone path is a directory");
                Err(ZoneError::NotFound(id.to_string()))
            }
            Err(source) => Err(ZoneError::Io {
                zone: id.to_string(),
                source,
            }),
        }
    }
}

/// Serves compiled zones from memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    zones: HashMap<String, Vec<u8>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        MemoryProvider::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, bytes: Vec<u8>) {
        self.zones.insert(id.into(), bytes);
    }

    pub fn with_zone(mut self, id: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(id, bytes);
        self
    }
}

impl ZoneDataProvider for MemoryProvider {
    fn bytes_for_zone(&self, id: &str) -> Result<Vec<u8>> {
        self.zones
            .get(id)
            .cloned()
            .ok_or_else(|| ZoneError::NotFound(id.to_string()))
    }
}

/// Builds each zone at most once and shares it afterwards.
///
/// Concurrent first requests for the same identifier construct the zone
/// only once. Failed constructions are not cached; every request for a
/// broken zone receives the construction error.
#[derive(Debug)]
pub struct ZoneCache<P> {
    provider: P,
    zones: Mutex<HashMap<String, Arc<ZoneInfo>>>,
}

impl<P: ZoneDataProvider> ZoneCache<P> {
    pub fn new(provider: P) -> Self {
        ZoneCache {
            provider,
            zones: Mutex::new(HashMap::new()),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The zone for `id`, constructing it on first use.
    ///
    /// # Errors
    ///
    /// Returns the provider's error for unknown zones and
    /// [`ZoneError::MalformedZoneData`] when the data does not parse.
    pub fn get(&self, id: &str) -> Result<Arc<ZoneInfo>> {
        let mut zones = self.zones.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(zone) = zones.get(id) {
            return Ok(Arc::clone(zone));
        }

        let bytes = self.provider.bytes_for_zone(id)?;
        let zone = Arc::new(ZoneInfo::from_tzif(id, &bytes)?);
        zones.insert(id.to_string(), Arc::clone(&zone));
        debug!(zone = id, cached = zones.len(), "cached zone");
        Ok(zone)
    }

    /// Number of zones constructed so far.
    pub fn len(&self) -> usize {
        self.zones.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
