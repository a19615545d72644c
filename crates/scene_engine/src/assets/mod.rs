//! Asset management
//!
//! CPU-side texture storage for the engine. Textures are loaded once into a
//! [`TextureCache`] and referenced everywhere else by [`TextureKey`]; the
//! cache outlives every component that borrows from it.

use std::collections::HashMap;
use std::path::Path;

use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

new_key_type! {
    /// Handle to a texture stored in a [`TextureCache`]
    pub struct TextureKey;
}

/// Asset subsystem errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Lookup for an unknown texture key
    #[error("texture not found: {0}")]
    TextureNotFound(String),

    /// Image decoding failure
    #[error("failed to load image: {0}")]
    LoadFailed(String),

    /// Filesystem failure while enumerating assets
    #[error("asset I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Decoded RGBA8 pixel data
#[derive(Debug, Clone)]
pub struct ImageData {
    /// Raw RGBA pixel data, row-major
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
}

impl ImageData {
    /// Load an image from a file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path_ref = path.as_ref();

        log::debug!("Loading image from: {path_ref:?}");

        let img = image::open(path_ref).map_err(|e| AssetError::LoadFailed(e.to_string()))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        log::info!("Loaded image {width}x{height} from {path_ref:?}");

        Ok(Self {
            data: rgba.into_raw(),
            width,
            height,
        })
    }

    /// Create a solid color image (useful for tests and placeholders)
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = (width * height) as usize;
        let mut data = Vec::with_capacity(pixel_count * 4);
        for _ in 0..pixel_count {
            data.extend_from_slice(&color);
        }

        Self {
            data,
            width,
            height,
        }
    }

    /// Return a copy of this image resampled to the given dimensions.
    pub fn resized(&self, width: u32, height: u32) -> Self {
        let buffer = image::RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .unwrap_or_else(|| image::RgbaImage::new(self.width.max(1), self.height.max(1)));
        let resampled =
            image::imageops::resize(&buffer, width, height, image::imageops::FilterType::Nearest);

        Self {
            data: resampled.into_raw(),
            width,
            height,
        }
    }

    /// Size of the pixel data in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

/// A named texture owned by the cache
#[derive(Debug)]
pub struct Texture {
    name: String,
    image: ImageData,
}

impl Texture {
    /// Cache key the texture was registered under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.image.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.image.height
    }

    /// Decoded pixel data
    pub fn image(&self) -> &ImageData {
        &self.image
    }
}

/// String-keyed texture storage
///
/// Every sprite frame in the engine borrows from this cache by [`TextureKey`];
/// the cache is the single owner of texture memory.
#[derive(Default)]
pub struct TextureCache {
    textures: SlotMap<TextureKey, Texture>,
    by_name: HashMap<String, TextureKey>,
}

impl TextureCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an image under a name, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, image: ImageData) -> TextureKey {
        let name = name.into();

        if let Some(old) = self.by_name.get(&name) {
            log::warn!("Replacing texture {name:?}");
            self.textures.remove(*old);
        }

        let key = self.textures.insert(Texture {
            name: name.clone(),
            image,
        });
        self.by_name.insert(name, key);
        key
    }

    /// Look up a texture by name.
    pub fn get(&self, name: &str) -> Result<TextureKey, AssetError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| AssetError::TextureNotFound(name.to_owned()))
    }

    /// Access a texture by key.
    ///
    /// # Panics
    /// Panics if the key is stale; cached keys are only invalidated by
    /// re-inserting under the same name.
    pub fn texture(&self, key: TextureKey) -> &Texture {
        &self.textures[key]
    }

    /// Resample a texture to new dimensions in place. No-op when the size
    /// already matches.
    ///
    /// # Panics
    /// Panics if the key is stale.
    pub fn resize(&mut self, key: TextureKey, width: u32, height: u32) {
        let texture = &mut self.textures[key];
        if texture.image.width == width && texture.image.height == height {
            return;
        }

        log::debug!(
            "Resizing texture {:?} from {}x{} to {width}x{height}",
            texture.name,
            texture.image.width,
            texture.image.height
        );
        texture.image = texture.image.resized(width, height);
    }

    /// Recursively load every image file under `root`, keyed by file stem.
    ///
    /// Returns the number of textures loaded. Files that fail to decode are
    /// skipped with a warning.
    pub fn load_directory<P: AsRef<Path>>(&mut self, root: P) -> Result<usize, AssetError> {
        let mut loaded = 0;
        self.load_directory_recursive(root.as_ref(), &mut loaded)?;
        log::info!("Loaded {loaded} texture(s) from {:?}", root.as_ref());
        Ok(loaded)
    }

    fn load_directory_recursive(&mut self, dir: &Path, loaded: &mut usize) -> Result<(), AssetError> {
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();

            if path.is_dir() {
                self.load_directory_recursive(&path, loaded)?;
                continue;
            }

            if !is_image_file(&path) {
                continue;
            }

            let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };

            match ImageData::from_file(&path) {
                Ok(image) => {
                    self.insert(stem, image);
                    *loaded += 1;
                }
                Err(e) => log::warn!("Skipping {path:?}: {e}"),
            }
        }
        Ok(())
    }

    /// Number of textures currently stored
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            matches!(
                ext.to_ascii_lowercase().as_str(),
                "png" | "jpg" | "jpeg" | "bmp"
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_color_dimensions() {
        let img = ImageData::solid_color(4, 2, [255, 0, 0, 255]);
        assert_eq!(img.width, 4);
        assert_eq!(img.height, 2);
        assert_eq!(img.size_bytes(), 4 * 2 * 4);
        assert_eq!(&img.data[0..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn resized_changes_dimensions() {
        let img = ImageData::solid_color(4, 4, [0, 255, 0, 255]);
        let smaller = img.resized(2, 2);
        assert_eq!(smaller.width, 2);
        assert_eq!(smaller.height, 2);
        assert_eq!(smaller.size_bytes(), 2 * 2 * 4);
        assert_eq!(&smaller.data[0..4], &[0, 255, 0, 255]);
    }

    #[test]
    fn cache_insert_and_get() {
        let mut cache = TextureCache::new();
        let key = cache.insert("player", ImageData::solid_color(8, 8, [0, 0, 0, 255]));

        assert_eq!(cache.get("player").unwrap(), key);
        assert_eq!(cache.texture(key).width(), 8);
        assert_eq!(cache.texture(key).name(), "player");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_miss_is_an_error() {
        let cache = TextureCache::new();
        assert!(matches!(
            cache.get("missing"),
            Err(AssetError::TextureNotFound(_))
        ));
    }

    #[test]
    fn resize_in_place() {
        let mut cache = TextureCache::new();
        let key = cache.insert("tile", ImageData::solid_color(8, 8, [1, 2, 3, 4]));

        cache.resize(key, 16, 4);
        assert_eq!(cache.texture(key).width(), 16);
        assert_eq!(cache.texture(key).height(), 4);

        // Same-size resize is a no-op.
        cache.resize(key, 16, 4);
        assert_eq!(cache.texture(key).width(), 16);
    }

    #[test]
    fn reinsert_replaces_entry() {
        let mut cache = TextureCache::new();
        cache.insert("tile", ImageData::solid_color(8, 8, [0, 0, 0, 255]));
        cache.insert("tile", ImageData::solid_color(2, 2, [0, 0, 0, 255]));

        assert_eq!(cache.len(), 1);
        let key = cache.get("tile").unwrap();
        assert_eq!(cache.texture(key).width(), 2);
    }
}
