//! # Asset Store
//!
//! Name → handle tables for textures and sounds. Decoding lives behind
//! [`AssetLoader`]; the store only remembers what was loaded and under which
//! name.
//!
//! Names are file stems: `assets/images/tank-panther.png` registers as
//! `tank-panther`. Lookups fail fast with [`AssetError::MissingTexture`] or
//! [`AssetError::MissingSound`] so a typo surfaces at scene load instead of
//! as an invisible sprite.
//!
//! ```toml
//! # assets.toml
//! root = "assets"
//! textures = ["images/tank-panther.png", "images/tree.png"]
//! sounds = ["sounds/shot.wav"]
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tessera_shared::{Dimension, SoundHandle, TextureHandle};
use tracing::{debug, info};

use crate::error::AssetError;

/// File extensions loaded as textures.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif"];

/// File extensions loaded as sounds.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg"];

/// A loaded texture and its pixel size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureInfo {
    /// Handle issued by the loader.
    pub handle: TextureHandle,
    /// Size in pixels.
    pub size: Dimension<u32>,
}

/// Decodes files into renderer and audio resources.
pub trait AssetLoader {
    /// Loads an image file.
    ///
    /// # Errors
    ///
    /// [`AssetError::Load`] when the file can't be decoded.
    fn load_texture(&mut self, path: &Path) -> Result<TextureInfo, AssetError>;

    /// Loads a sound file.
    ///
    /// # Errors
    ///
    /// [`AssetError::Load`] when the file can't be decoded.
    fn load_sound(&mut self, path: &Path) -> Result<SoundHandle, AssetError>;
}

/// Loader that issues handles without touching file contents.
///
/// Every texture reports the same size. Used by tests and headless runs.
#[derive(Debug)]
pub struct HeadlessLoader {
    texture_size: Dimension<u32>,
    next_texture: u32,
    next_sound: u32,
}

impl HeadlessLoader {
    /// Loader whose textures all measure `texture_size`.
    #[must_use]
    pub const fn new(texture_size: Dimension<u32>) -> Self {
        Self {
            texture_size,
            next_texture: 0,
            next_sound: 0,
        }
    }
}

impl Default for HeadlessLoader {
    fn default() -> Self {
        Self::new(Dimension::new(32, 32))
    }
}

impl AssetLoader for HeadlessLoader {
    fn load_texture(&mut self, _path: &Path) -> Result<TextureInfo, AssetError> {
        self.next_texture += 1;
        Ok(TextureInfo {
            handle: TextureHandle(self.next_texture),
            size: self.texture_size,
        })
    }

    fn load_sound(&mut self, _path: &Path) -> Result<SoundHandle, AssetError> {
        self.next_sound += 1;
        Ok(SoundHandle(self.next_sound))
    }
}

/// Derives an asset name from a file path: its stem.
///
/// # Errors
///
/// [`AssetError::InvalidName`] when the path has no UTF-8 stem.
pub fn asset_name(path: &Path) -> Result<String, AssetError> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| AssetError::InvalidName(path.display().to_string()))
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// List of asset files to load at startup.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssetManifest {
    /// Directory the entries are relative to.
    pub root: Option<PathBuf>,
    /// Image files.
    pub textures: Vec<PathBuf>,
    /// Sound files.
    pub sounds: Vec<PathBuf>,
}

impl AssetManifest {
    /// Parses a manifest.
    ///
    /// # Errors
    ///
    /// [`AssetError::Manifest`] on malformed TOML.
    pub fn from_toml_str(text: &str) -> Result<Self, AssetError> {
        toml::from_str(text).map_err(|e| AssetError::Manifest(e.to_string()))
    }

    fn resolve(&self, entry: &Path) -> PathBuf {
        match &self.root {
            Some(root) => root.join(entry),
            None => entry.to_path_buf(),
        }
    }
}

/// Loaded textures and sounds by name.
#[derive(Debug, Default)]
pub struct AssetStore {
    textures: HashMap<String, TextureInfo>,
    sounds: HashMap<String, SoundHandle>,
}

impl AssetStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a texture, replacing any texture with the same name.
    pub fn add_texture(&mut self, name: impl Into<String>, texture: TextureInfo) {
        self.textures.insert(name.into(), texture);
    }

    /// Registers a sound, replacing any sound with the same name.
    pub fn add_sound(&mut self, name: impl Into<String>, sound: SoundHandle) {
        self.sounds.insert(name.into(), sound);
    }

    /// Looks up a texture.
    ///
    /// # Errors
    ///
    /// [`AssetError::MissingTexture`] when nothing is registered as `name`.
    pub fn texture(&self, name: &str) -> Result<TextureInfo, AssetError> {
        self.textures
            .get(name)
            .copied()
            .ok_or_else(|| AssetError::MissingTexture(name.to_owned()))
    }

    /// Looks up a sound.
    ///
    /// # Errors
    ///
    /// [`AssetError::MissingSound`] when nothing is registered as `name`.
    pub fn sound(&self, name: &str) -> Result<SoundHandle, AssetError> {
        self.sounds
            .get(name)
            .copied()
            .ok_or_else(|| AssetError::MissingSound(name.to_owned()))
    }

    /// Number of textures.
    #[must_use]
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Number of sounds.
    #[must_use]
    pub fn sound_count(&self) -> usize {
        self.sounds.len()
    }

    /// Forgets every asset. Used between scenes.
    pub fn clear(&mut self) {
        self.textures.clear();
        self.sounds.clear();
    }

    /// Loads each file by extension; unknown extensions are skipped.
    ///
    /// # Returns
    ///
    /// The number of files loaded.
    ///
    /// # Errors
    ///
    /// Stops at the first file that fails to load or name.
    pub fn load_files<L, I, P>(&mut self, loader: &mut L, files: I) -> Result<usize, AssetError>
    where
        L: AssetLoader + ?Sized,
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut loaded = 0;
        for file in files {
            let path = file.as_ref();
            let Some(ext) = extension_of(path) else {
                continue;
            };
            if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
                self.load_texture_file(loader, path)?;
            } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
                self.load_sound_file(loader, path)?;
            } else {
                debug!(path = %path.display(), "skipping file with unknown extension");
                continue;
            }
            loaded += 1;
        }
        Ok(loaded)
    }

    /// Loads every recognised file directly inside `dir`.
    ///
    /// Files are visited in name order so handle numbering is stable.
    ///
    /// # Errors
    ///
    /// [`AssetError::Load`] if the directory can't be listed, otherwise as
    /// [`AssetStore::load_files`].
    pub fn load_dir<L>(&mut self, loader: &mut L, dir: impl AsRef<Path>) -> Result<usize, AssetError>
    where
        L: AssetLoader + ?Sized,
    {
        let dir = dir.as_ref();
        let list_error = |e: std::io::Error| AssetError::Load {
            path: dir.display().to_string(),
            reason: e.to_string(),
        };

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(list_error)? {
            let path = entry.map_err(list_error)?.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        let loaded = self.load_files(loader, &files)?;
        info!(dir = %dir.display(), loaded, "asset directory loaded");
        Ok(loaded)
    }

    /// Loads every manifest entry, failing on the first bad one.
    ///
    /// # Errors
    ///
    /// [`AssetError::Load`] or [`AssetError::InvalidName`] for the first
    /// entry that fails.
    pub fn load_manifest<L>(
        &mut self,
        loader: &mut L,
        manifest: &AssetManifest,
    ) -> Result<usize, AssetError>
    where
        L: AssetLoader + ?Sized,
    {
        for entry in &manifest.textures {
            self.load_texture_file(loader, &manifest.resolve(entry))?;
        }
        for entry in &manifest.sounds {
            self.load_sound_file(loader, &manifest.resolve(entry))?;
        }
        let loaded = manifest.textures.len() + manifest.sounds.len();
        info!(
            textures = manifest.textures.len(),
            sounds = manifest.sounds.len(),
            "asset manifest loaded"
        );
        Ok(loaded)
    }

    fn load_texture_file<L: AssetLoader + ?Sized>(
        &mut self,
        loader: &mut L,
        path: &Path,
    ) -> Result<(), AssetError> {
        let name = asset_name(path)?;
        let info = loader.load_texture(path)?;
        debug!(%name, handle = info.handle.raw(), "texture loaded");
        self.add_texture(name, info);
        Ok(())
    }

    fn load_sound_file<L: AssetLoader + ?Sized>(
        &mut self,
        loader: &mut L,
        path: &Path,
    ) -> Result<(), AssetError> {
        let name = asset_name(path)?;
        let sound = loader.load_sound(path)?;
        debug!(%name, handle = sound.raw(), "sound loaded");
        self.add_sound(name, sound);
        Ok(())
    }
}
