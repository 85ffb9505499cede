// FICHIER : jsonstore/src/utils/fs.rs

use crate::utils::{json, AppError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::instrument;

// --- RE-EXPORTS (Isolation de la couche OS) ---
pub use std::path::{Component, Path, PathBuf};

/// Vérifie qu'un chemin fourni par l'appelant ne remonte jamais (`..`).
/// `allow_absolute` autorise les chemins absolus (niveau externe uniquement).
pub fn check_sandboxed(raw: &str, allow_absolute: bool) -> Result<&Path> {
    let path = Path::new(raw);
    if raw.trim().is_empty() {
        return Err(AppError::InvalidPath("chemin vide".to_string()));
    }
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(AppError::InvalidPath(format!(
            "remontée '..' interdite : {}",
            raw
        )));
    }
    if !allow_absolute && path.has_root() {
        return Err(AppError::InvalidPath(format!(
            "chemin relatif attendu : {}",
            raw
        )));
    }
    Ok(path)
}

pub async fn exists(path: &Path) -> bool {
    fs::metadata(path).await.is_ok()
}

pub async fn ensure_dir(path: &Path) -> Result<()> {
    if !exists(path).await {
        fs::create_dir_all(path).await?;
    }
    Ok(())
}

pub async fn remove_file(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Lit un fichier JSON. `Ok(None)` si le fichier n'existe pas.
#[instrument(skip(path), fields(path = ?path))]
pub async fn read_json_opt<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match fs::read_to_string(path).await {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let value = json::parse(&content).map_err(|e| AppError::corruption(path, e))?;
    Ok(Some(value))
}

// --- ÉCRITURE ATOMIQUE ---

/// Écriture atomique sécurisée (write -> sync -> rename)
#[instrument(skip(content, path), fields(path = ?path))]
pub async fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent).await?;
    }

    let tmp_path = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&tmp_path).await?;
        file.write_all(content).await?;
        file.flush().await?;
        file.sync_all().await?;
    }

    if let Err(e) = fs::rename(&tmp_path, path).await {
        let _ = remove_file(&tmp_path).await;
        return Err(e.into());
    }
    Ok(())
}

pub async fn write_json_atomic<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let content = json::stringify_pretty(data)?;
    write_atomic(path, content.as_bytes()).await
}
