// Preset storage kept in memory, optionally mirrored to one JSON file.

use super::{PresetGateway, PresetUpdate};
use crate::error::EngineError;
use chrono::Utc;
use shared::models::{Preset, PresetId, PresetKind, PresetSnapshot, UserId};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct InMemoryPresetStore {
    /// Insertion order, which is creation order.
    presets: RwLock<Vec<Preset>>,
    path: Option<PathBuf>,
}

impl InMemoryPresetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `path` if it exists and rewrites it after every mutation.
    pub async fn with_persistence(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref().to_path_buf();
        let presets = match tokio::fs::read_to_string(&path).await {
            Ok(contents) if contents.trim().is_empty() => Vec::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::info!(path = %path.display(), count = presets.len(), "Loaded preset store");
        Ok(InMemoryPresetStore {
            presets: RwLock::new(presets),
            path: Some(path),
        })
    }

    /// Writes `next` and only then installs it, so a failed write leaves
    /// the store as it was.
    async fn commit(&self, presets: &mut Vec<Preset>, next: Vec<Preset>) -> Result<(), EngineError> {
        self.persist(&next).await?;
        *presets = next;
        Ok(())
    }

    async fn persist(&self, presets: &[Preset]) -> Result<(), EngineError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(presets)?;
        tokio::fs::write(path, json).await?;
        tracing::debug!(path = %path.display(), count = presets.len(), "Persisted preset store");
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<String, EngineError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidPreset("preset name must not be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

fn owned_index(presets: &[Preset], user: &UserId, id: PresetId) -> Result<usize, EngineError> {
    presets
        .iter()
        .position(|p| p.id == id && &p.user_id == user)
        .ok_or(EngineError::PresetNotFound(id))
}

#[tonic::async_trait]
impl PresetGateway for InMemoryPresetStore {
    async fn list(&self, user: &UserId, kind: PresetKind) -> Result<Vec<Preset>, EngineError> {
        let presets = self.presets.read().await;
        Ok(presets
            .iter()
            .filter(|p| &p.user_id == user && p.snapshot.kind() == kind)
            .cloned()
            .collect())
    }

    async fn get(&self, user: &UserId, id: PresetId) -> Result<Preset, EngineError> {
        let presets = self.presets.read().await;
        let index = owned_index(&presets, user, id)?;
        Ok(presets[index].clone())
    }

    async fn create(&self, user: &UserId, name: &str, snapshot: PresetSnapshot) -> Result<Preset, EngineError> {
        let name = validate_name(name)?;
        let now = Utc::now();
        let preset = Preset {
            id: Uuid::new_v4(),
            user_id: user.clone(),
            name,
            snapshot,
            created_at: now,
            updated_at: now,
        };
        let mut presets = self.presets.write().await;
        let mut next = presets.clone();
        next.push(preset.clone());
        self.commit(&mut presets, next).await?;
        tracing::info!(user = %user, preset_id = %preset.id, name = %preset.name, "Created preset");
        Ok(preset)
    }

    async fn update(&self, user: &UserId, id: PresetId, update: PresetUpdate) -> Result<Preset, EngineError> {
        let name = update.name.as_deref().map(validate_name).transpose()?;
        let mut presets = self.presets.write().await;
        let index = owned_index(&presets, user, id)?;
        let mut next = presets.clone();
        let preset = &mut next[index];
        if let Some(snapshot) = update.snapshot {
            if snapshot.kind() != preset.snapshot.kind() {
                return Err(EngineError::InvalidPreset(format!(
                    "cannot replace a {:?} preset with a {:?} snapshot",
                    preset.snapshot.kind(),
                    snapshot.kind()
                )));
            }
            preset.snapshot = snapshot;
        }
        if let Some(name) = name {
            preset.name = name;
        }
        preset.updated_at = Utc::now();
        let updated = preset.clone();
        self.commit(&mut presets, next).await?;
        tracing::info!(user = %user, preset_id = %id, "Updated preset");
        Ok(updated)
    }

    async fn delete(&self, user: &UserId, id: PresetId) -> Result<(), EngineError> {
        let mut presets = self.presets.write().await;
        let index = owned_index(&presets, user, id)?;
        let mut next = presets.clone();
        next.remove(index);
        self.commit(&mut presets, next).await?;
        tracing::info!(user = %user, preset_id = %id, "Deleted preset");
        Ok(())
    }
}
