//! Garment image registry.
//!
//! Images are opaque to this crate; only their intrinsic size matters for
//! placement. Images are addressed by `(costume id, garment)`.

use crate::geometry::Garment;
use crate::{Error, Result};
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Intrinsic pixel size of a garment image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssetSize {
    pub width: f64,
    pub height: f64,
}

impl AssetSize {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Height over width
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if either side is not a positive finite number.
    pub fn aspect_ratio(&self) -> Result<f64> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(self.width) || !valid(self.height) {
            return Err(Error::InvalidInput(format!(
                "Asset size {}x{} must be positive",
                self.width, self.height
            )));
        }
        Ok(self.height / self.width)
    }
}

/// Lookup of garment image sizes
pub trait AssetRegistry {
    /// Size of the image for a garment of a costume, if one is registered
    fn size(&self, costume: &str, garment: Garment) -> Option<AssetSize>;

    /// Same as [`AssetRegistry::size`], failing with `Error::MissingAsset`
    ///
    /// # Errors
    ///
    /// Returns `Error::MissingAsset` if nothing is registered.
    fn require(&self, costume: &str, garment: Garment) -> Result<AssetSize> {
        self.size(costume, garment).ok_or_else(|| Error::MissingAsset {
            costume: costume.to_string(),
            garment,
        })
    }
}

/// Registry backed by an in-memory table
#[derive(Debug, Clone, Default)]
pub struct StaticAssetRegistry {
    sizes: HashMap<(String, Garment), AssetSize>,
}

impl StaticAssetRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, costume: impl Into<String>, garment: Garment, size: AssetSize) {
        self.sizes.insert((costume.into(), garment), size);
    }

    /// Read the size of every garment image present under `root`
    ///
    /// Garments without an image file are left unregistered.
    ///
    /// # Errors
    ///
    /// Returns `Error::Image` if an existing file cannot be decoded.
    pub fn from_dir<'a, I>(root: &Path, costumes: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut registry = Self::new();
        for costume in costumes {
            for garment in Garment::ALL {
                let path = asset_path(root, costume, garment);
                if !path.exists() {
                    debug!("No image for {garment} of costume {costume}");
                    continue;
                }
                let (width, height) = image::image_dimensions(&path)?;
                registry.insert(costume, garment, AssetSize::new(f64::from(width), f64::from(height)));
            }
        }
        Ok(registry)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Register the same size for every garment of a costume
    #[must_use]
    pub fn with_uniform(mut self, costume: &str, size: AssetSize) -> Self {
        for garment in Garment::ALL {
            self.insert(costume, garment, size);
        }
        self
    }
}

impl AssetRegistry for StaticAssetRegistry {
    fn size(&self, costume: &str, garment: Garment) -> Option<AssetSize> {
        self.sizes.get(&(costume.to_string(), garment)).copied()
    }
}

/// Conventional image path: `<root>/<costume>/<garment>.png`
#[must_use]
pub fn asset_path(root: &Path, costume: &str, garment: Garment) -> PathBuf {
    root.join(costume)
        .join(format!("{}.{}", garment.asset_name(), crate::constants::ASSET_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio() {
        assert_eq!(AssetSize::new(200.0, 100.0).aspect_ratio().unwrap(), 0.5);
        assert!(AssetSize::new(0.0, 100.0).aspect_ratio().is_err());
        assert!(AssetSize::new(100.0, f64::INFINITY).aspect_ratio().is_err());
    }

    #[test]
    fn test_registry_lookup() {
        let registry = StaticAssetRegistry::new().with_uniform("1", AssetSize::new(10.0, 20.0));
        assert_eq!(
            registry.size("1", Garment::Hat),
            Some(AssetSize::new(10.0, 20.0))
        );
        assert!(registry.size("2", Garment::Hat).is_none());
        assert!(matches!(
            registry.require("2", Garment::Mask),
            Err(Error::MissingAsset { .. })
        ));
    }

    #[test]
    fn test_from_dir_reads_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("1")).unwrap();
        image::RgbaImage::new(40, 30)
            .save(asset_path(dir.path(), "1", Garment::Shirt))
            .unwrap();

        let registry = StaticAssetRegistry::from_dir(dir.path(), ["1", "2"]).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.size("1", Garment::Shirt),
            Some(AssetSize::new(40.0, 30.0))
        );
        assert!(registry.size("1", Garment::Hat).is_none());
    }

    #[test]
    fn test_asset_path() {
        let path = asset_path(Path::new("img"), "1", Garment::Hat);
        assert_eq!(path, PathBuf::from("img/1/hat.png"));
    }
}
