//! Where users, units and branding come from when rendering on demand.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::model::{BrandingAssets, UnitRecord, UserRecord};

/// Reference data needed alongside a meeting record.
#[async_trait]
pub trait ReferenceSource: Send + Sync {
    async fn users(&self) -> Result<Vec<UserRecord>>;
    async fn units(&self) -> Result<Vec<UnitRecord>>;
    async fn branding(&self) -> Result<BrandingAssets>;
}

/// In-memory snapshots.
#[derive(Clone, Debug, Default)]
pub struct StaticSource {
    pub users: Vec<UserRecord>,
    pub units: Vec<UnitRecord>,
    pub branding: BrandingAssets,
}

#[async_trait]
impl ReferenceSource for StaticSource {
    async fn users(&self) -> Result<Vec<UserRecord>> {
        Ok(self.users.clone())
    }

    async fn units(&self) -> Result<Vec<UnitRecord>> {
        Ok(self.units.clone())
    }

    async fn branding(&self) -> Result<BrandingAssets> {
        Ok(self.branding.clone())
    }
}

/// A directory holding `users.json`, `units.json` and an optional
/// `settings.json`.
#[derive(Clone, Debug)]
pub struct JsonDirSource {
    dir: PathBuf,
}

impl JsonDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn read<T>(&self, file: &str) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let path = self.dir.join(file);
        tokio::task::spawn_blocking(move || -> Result<T> {
            let bytes = std::fs::read(&path)?;
            log::debug!("Read {} ({} bytes)", path.display(), bytes.len());
            Ok(serde_json::from_slice(&bytes)?)
        })
        .await
        .map_err(|e| Error::Render(format!("reader task failed: {e}")))?
    }
}

#[async_trait]
impl ReferenceSource for JsonDirSource {
    async fn users(&self) -> Result<Vec<UserRecord>> {
        self.read("users.json").await
    }

    async fn units(&self) -> Result<Vec<UnitRecord>> {
        self.read("units.json").await
    }

    async fn branding(&self) -> Result<BrandingAssets> {
        match self.read("settings.json").await {
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No settings.json in {}, rendering without logo", self.dir.display());
                Ok(BrandingAssets::default())
            }
            other => other,
        }
    }
}
