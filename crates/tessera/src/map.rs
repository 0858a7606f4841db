//! # Tile Maps
//!
//! A map is a grid of square tiles drawn from one tileset asset. Its pixel
//! size is what the camera is clamped to:
//!
//! ```text
//! width  = cols * tile_size * scale
//! height = rows * tile_size * scale
//! ```
//!
//! Maps can be described in TOML:
//!
//! ```toml
//! asset_id = "jungle"
//! map_id = "level1"
//! tile_size = 32
//! scale = 2
//! cols = 25
//! rows = 20
//! ```

use serde::Deserialize;

use crate::error::ConfigError;
use crate::systems::MapBounds;

/// Tile grid dimensions and the tileset it is drawn from.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Map {
    /// Tileset texture.
    pub asset_id: String,
    /// Unique name of the map.
    pub map_id: String,
    /// Side of one tile in texels.
    pub tile_size: u16,
    /// Integer upscale applied to every tile.
    #[serde(default = "default_scale")]
    pub scale: u16,
    /// Tiles per row.
    pub cols: u16,
    /// Tiles per column.
    pub rows: u16,
}

const fn default_scale() -> u16 {
    1
}

impl Map {
    /// Creates a map description.
    #[must_use]
    pub fn new(
        asset_id: impl Into<String>,
        map_id: impl Into<String>,
        tile_size: u16,
        scale: u16,
        cols: u16,
        rows: u16,
    ) -> Self {
        Self {
            asset_id: asset_id.into(),
            map_id: map_id.into(),
            tile_size,
            scale,
            cols,
            rows,
        }
    }

    /// Parses and validates a TOML map description.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed TOML or missing fields,
    /// [`ConfigError::InvalidValue`] on a zero tile size or scale.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let map: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        if map.tile_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "map.tile_size",
                reason: "must be positive".to_owned(),
            });
        }
        if map.scale == 0 {
            return Err(ConfigError::InvalidValue {
                field: "map.scale",
                reason: "must be positive".to_owned(),
            });
        }
        Ok(map)
    }

    /// Side of one tile on screen. Sizes saturate at `i32::MAX`.
    #[inline]
    #[must_use]
    pub fn scaled_tile(&self) -> i32 {
        i32::from(self.tile_size).saturating_mul(i32::from(self.scale))
    }

    /// Width in pixels.
    #[inline]
    #[must_use]
    pub fn width(&self) -> i32 {
        i32::from(self.cols).saturating_mul(self.scaled_tile())
    }

    /// Height in pixels.
    #[inline]
    #[must_use]
    pub fn height(&self) -> i32 {
        i32::from(self.rows).saturating_mul(self.scaled_tile())
    }

    /// Pixel bounds for the camera.
    #[must_use]
    pub fn bounds(&self) -> MapBounds {
        MapBounds::new(self.width(), self.height())
    }
}

impl From<&Map> for MapBounds {
    fn from(map: &Map) -> Self {
        map.bounds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_size_uses_tile_and_scale() {
        let map = Map::new("jungle", "level1", 32, 2, 25, 20);
        assert_eq!(map.scaled_tile(), 64);
        assert_eq!((map.width(), map.height()), (1600, 1280));
        assert_eq!(MapBounds::from(&map), MapBounds::new(1600, 1280));
    }

    #[test]
    fn test_huge_map_saturates() {
        let map = Map::new("big", "big", u16::MAX, u16::MAX, 2, 0);
        assert_eq!(map.width(), i32::MAX);
        assert_eq!(map.height(), 0);
    }

    #[test]
    fn test_toml_defaults_scale() {
        let text = r#"
            asset_id = "desert"
            map_id = "dunes"
            tile_size = 16
            cols = 10
            rows = 5
        "#;
        let map = Map::from_toml_str(text).unwrap();
        assert_eq!(map.scale, 1);
        assert_eq!(map.bounds(), MapBounds::new(160, 80));
    }

    #[test]
    fn test_toml_rejects_bad_maps() {
        assert!(matches!(
            Map::from_toml_str("asset_id = \"a\"\nmap_id = \"b\"\ntile_size = 0\ncols = 1\nrows = 1"),
            Err(ConfigError::InvalidValue { field: "map.tile_size", .. })
        ));
        assert!(matches!(
            Map::from_toml_str("asset_id = \"a\"\nmap_id = \"b\"\ntile_size = 8\nscale = 0\ncols = 1\nrows = 1"),
            Err(ConfigError::InvalidValue { field: "map.scale", .. })
        ));
        assert!(matches!(
            Map::from_toml_str("asset_id = \"a\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
