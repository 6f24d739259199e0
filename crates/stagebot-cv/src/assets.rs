//! Reference-image library.
//!
//! One file per recognizable UI element, laid out as
//! `assets/<category>/<name>.<ext>`. Images are decoded on first use and
//! cached; nothing is validated at load time beyond "exists and decodes".

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, bail};
use image::RgbaImage;

use crate::Result;

/// Loads and caches reference images from the asset tree.
pub struct AssetLibrary {
    root: PathBuf,
    supported_extensions: Vec<String>,
    cache: RefCell<HashMap<(String, String), RgbaImage>>,
}

impl AssetLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            supported_extensions: vec![
                "png".to_string(),
                "jpg".to_string(),
                "jpeg".to_string(),
                "bmp".to_string(),
            ],
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Seed the cache with an in-memory image. Later `load` calls for the
    /// same (category, name) are served from the cache without touching
    /// the filesystem.
    pub fn insert(&self, category: &str, name: &str, image: RgbaImage) {
        self.cache
            .borrow_mut()
            .insert((category.to_string(), name.to_string()), image);
    }

    /// Load a reference image by category and name.
    pub fn load(&self, category: &str, name: &str) -> Result<RgbaImage> {
        let key = (category.to_string(), name.to_string());
        if let Some(image) = self.cache.borrow().get(&key) {
            return Ok(image.clone());
        }

        for ext in &self.supported_extensions {
            let path = self.root.join(category).join(format!("{name}.{ext}"));
            if path.exists() {
                let image = image::open(&path)
                    .with_context(|| format!("Failed to decode asset: {:?}", path))?
                    .to_rgba8();
                self.cache.borrow_mut().insert(key, image.clone());
                return Ok(image);
            }
        }

        bail!(
            "Missing asset {}/{} under {:?}",
            category,
            name,
            self.root
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_directory_tree() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::create_dir_all(dir.path().join("fight"))?;

        let image = RgbaImage::from_pixel(12, 8, image::Rgba([10, 20, 30, 255]));
        image.save(dir.path().join("fight").join("label.png"))?;

        let assets = AssetLibrary::new(dir.path());
        let loaded = assets.load("fight", "label")?;
        assert_eq!(loaded.dimensions(), (12, 8));

        // second load is served from the cache even if the file vanishes
        std::fs::remove_file(dir.path().join("fight").join("label.png"))?;
        assert_eq!(assets.load("fight", "label")?.dimensions(), (12, 8));
        Ok(())
    }

    #[test]
    fn test_missing_asset_is_an_error() {
        let assets = AssetLibrary::new("does-not-exist");
        assert!(assets.load("fight", "label").is_err());
    }

    #[test]
    fn test_inserted_image_is_served() -> Result<()> {
        let assets = AssetLibrary::new("unused");
        assets.insert("main", "enk_max", RgbaImage::new(4, 4));
        assert_eq!(assets.load("main", "enk_max")?.dimensions(), (4, 4));
        Ok(())
    }
}
