//! Texture persistence
//!
//! Mesh textures are copied into a folder beside the target scene and
//! referenced from it through a `res://` locator. The exporter only needs the
//! relative path back, so hosts with their own image pipeline can plug in a
//! different [`TextureStore`].

use std::fs;
use std::path::{Path, PathBuf};

use crate::path_utils::{path_to_string, sanitize_filename};
use crate::types::TextureRef;

/// Errors from saving a texture
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    /// The image has no file to save; the mesh is exported without it
    #[error("Texture image '{0}' has no source file")]
    Missing(String),

    #[error("Failed to save texture to {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Saves texture images for the exporter
pub trait TextureStore {
    /// Save `texture` into `folder` and return its path relative to the scene
    fn save(&mut self, texture: &TextureRef, folder: &str) -> Result<String, TextureError>;

    /// Number of images written so far
    fn saved_count(&self) -> usize {
        0
    }
}

/// Copies image files into a folder next to the scene file
#[derive(Debug, Clone)]
pub struct FsTextureStore {
    root: PathBuf,
    saved: Vec<PathBuf>,
}

impl FsTextureStore {
    /// Store rooted at `root`, usually the directory holding the scene
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            saved: Vec::new(),
        }
    }

    /// Store rooted at the directory of `scene_path`
    pub fn beside(scene_path: &Path) -> Self {
        let root = scene_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files written by this store, in order
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }
}

impl TextureStore for FsTextureStore {
    fn save(&mut self, texture: &TextureRef, folder: &str) -> Result<String, TextureError> {
        let source = texture
            .source
            .as_deref()
            .filter(|p| p.is_file())
            .ok_or_else(|| TextureError::Missing(texture.image.clone()))?;

        let file_name = source
            .file_name()
            .map(|n| sanitize_filename(&n.to_string_lossy()))
            .ok_or_else(|| TextureError::Missing(texture.image.clone()))?;

        let dir = self.root.join(folder);
        fs::create_dir_all(&dir).map_err(|source| TextureError::Io {
            path: dir.clone(),
            source,
        })?;

        let destination = dir.join(&file_name);
        let same_file = match (source.canonicalize(), destination.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };
        if same_file {
            tracing::debug!("Texture already in place: {:?}", destination);
        } else {
            fs::copy(source, &destination).map_err(|source| TextureError::Io {
                path: destination.clone(),
                source,
            })?;
            tracing::debug!("Saved texture {} to {:?}", texture.image, destination);
        }

        if !self.saved.contains(&destination) {
            self.saved.push(destination);
        }
        Ok(path_to_string(&Path::new(folder).join(file_name)))
    }

    fn saved_count(&self) -> usize {
        self.saved.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn texture(source: Option<PathBuf>) -> TextureRef {
        TextureRef {
            image: "hero".to_string(),
            source,
            width: 64,
            height: 32,
        }
    }

    #[test]
    fn test_copies_into_folder() {
        let temp = TempDir::new().unwrap();
        let image = temp.path().join("art").join("hero.png");
        fs::create_dir_all(image.parent().unwrap()).unwrap();
        fs::write(&image, b"png").unwrap();

        let scene_dir = temp.path().join("game");
        let mut store = FsTextureStore::beside(&scene_dir.join("level.tscn"));
        let relative = store.save(&texture(Some(image)), "textures").unwrap();

        assert_eq!(relative, "textures/hero.png");
        assert_eq!(fs::read(scene_dir.join("textures/hero.png")).unwrap(), b"png");
        assert_eq!(store.saved_count(), 1);
    }

    #[test]
    fn test_saving_twice_counts_once() {
        let temp = TempDir::new().unwrap();
        let image = temp.path().join("hero.png");
        fs::write(&image, b"png").unwrap();

        let mut store = FsTextureStore::new(temp.path());
        store.save(&texture(Some(image.clone())), "textures").unwrap();
        store.save(&texture(Some(image)), "textures").unwrap();
        assert_eq!(store.saved_count(), 1);
    }

    #[test]
    fn test_source_already_in_folder() {
        let temp = TempDir::new().unwrap();
        let image = temp.path().join("textures").join("hero.png");
        fs::create_dir_all(image.parent().unwrap()).unwrap();
        fs::write(&image, b"png").unwrap();

        let mut store = FsTextureStore::new(temp.path());
        assert_eq!(store.save(&texture(Some(image.clone())), "textures").unwrap(), "textures/hero.png");
        assert_eq!(fs::read(image).unwrap(), b"png");
    }

    #[test]
    fn test_missing_source() {
        let temp = TempDir::new().unwrap();
        let mut store = FsTextureStore::new(temp.path());

        assert!(matches!(store.save(&texture(None), "textures"), Err(TextureError::Missing(_))));
        let absent = temp.path().join("absent.png");
        assert!(matches!(store.save(&texture(Some(absent)), "textures"), Err(TextureError::Missing(_))));
        assert!(!temp.path().join("textures").exists());
    }
}
