//! Viewer settings loaded from a flat key/value bundle.
//!
//! Settings files are TOML. Keys are flattened with `.` so that both
//!
//! ```toml
//! "Viewer.KeyFrameSize" = 0.05
//! ```
//!
//! and
//!
//! ```toml
//! [Viewer]
//! KeyFrameSize = 0.05
//! ```
//!
//! produce the key `Viewer.KeyFrameSize`. Every value must be numeric;
//! booleans are accepted as `1` / `0`.

use std::collections::BTreeMap;
use std::path::Path;

use crate::mesh::generators::{DEFAULT_SPHERE_SLICES, DEFAULT_SPHERE_STACKS};

pub const KEY_KEYFRAME_SIZE: &str = "Viewer.KeyFrameSize";
pub const KEY_KEYFRAME_LINE_WIDTH: &str = "Viewer.KeyFrameLineWidth";
pub const KEY_GRAPH_LINE_WIDTH: &str = "Viewer.GraphLineWidth";
pub const KEY_POINT_SIZE: &str = "Viewer.PointSize";
pub const KEY_CAMERA_SIZE: &str = "Viewer.CameraSize";
pub const KEY_CAMERA_LINE_WIDTH: &str = "Viewer.CameraLineWidth";
pub const KEY_DRAW_OBJECT_POINTS: &str = "Viewer.DrawObjectPoints";
pub const KEY_COVISIBILITY_MIN_WEIGHT: &str = "Viewer.CovisibilityMinWeight";
pub const KEY_ELLIPSOID_SLICES: &str = "Viewer.EllipsoidSlices";
pub const KEY_ELLIPSOID_STACKS: &str = "Viewer.EllipsoidStacks";

/// Errors that can occur while loading viewer settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The settings file is not valid TOML.
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is a string, array or datetime.
    #[error("setting `{key}` is not numeric")]
    NotNumeric { key: String },
    /// A value is numeric but outside its allowed range.
    #[error("setting `{key}` has invalid value {value}")]
    InvalidValue { key: String, value: f64 },
}

/// Flat key to number map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsBundle {
    values: BTreeMap<String, f64>,
}

impl SettingsBundle {
    /// Create an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document, flattening nested tables.
    pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
        let table: toml::Table = toml::from_str(source)?;
        let mut bundle = Self::new();
        bundle.flatten("", &table)?;
        Ok(bundle)
    }

    fn flatten(&mut self, prefix: &str, table: &toml::Table) -> Result<(), SettingsError> {
        for (key, value) in table {
            let full_key = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            match value {
                toml::Value::Integer(i) => self.insert(full_key, *i as f64),
                toml::Value::Float(f) => self.insert(full_key, *f),
                toml::Value::Boolean(b) => self.insert(full_key, if *b { 1.0 } else { 0.0 }),
                toml::Value::Table(inner) => self.flatten(&full_key, inner)?,
                _ => return Err(SettingsError::NotNumeric { key: full_key }),
            }
        }
        Ok(())
    }

    /// Set a value, replacing any previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.values.insert(key.into(), value);
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the bundle has no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for SettingsBundle {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut bundle = Self::new();
        for (key, value) in iter {
            bundle.insert(key, value);
        }
        bundle
    }
}

/// Drawing parameters for the map viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerSettings {
    /// Half-width of keyframe frusta.
    pub keyframe_size: f32,
    /// Line width of keyframe frusta.
    pub keyframe_line_width: f32,
    /// Line width of covisibility, spanning-tree and loop edges.
    pub graph_line_width: f32,
    /// Base point size; map points are drawn at 2x, object points at 3x.
    pub point_size: f32,
    /// Half-width of the live camera frustum.
    pub camera_size: f32,
    /// Line width of the live camera frustum and object cuboids.
    pub camera_line_width: f32,
    /// Draw the point subsets associated with each object.
    pub draw_object_points: bool,
    /// Minimum shared-observation weight for a covisibility edge.
    pub covisibility_min_weight: u32,
    /// Ellipsoid tessellation around the polar axis.
    pub ellipsoid_slices: u32,
    /// Ellipsoid tessellation from pole to pole.
    pub ellipsoid_stacks: u32,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            keyframe_size: 0.05,
            keyframe_line_width: 1.0,
            graph_line_width: 0.9,
            point_size: 2.0,
            camera_size: 0.08,
            camera_line_width: 3.0,
            draw_object_points: true,
            covisibility_min_weight: 100,
            ellipsoid_slices: DEFAULT_SPHERE_SLICES,
            ellipsoid_stacks: DEFAULT_SPHERE_STACKS,
        }
    }
}

impl ViewerSettings {
    /// Build settings from a bundle.
    ///
    /// Missing keys keep their default and log a warning. Negative or
    /// non-finite sizes and widths, and sphere tessellations below 3 slices
    /// or 2 stacks, are rejected.
    pub fn from_bundle(bundle: &SettingsBundle) -> Result<Self, SettingsError> {
        let defaults = Self::default();
        Ok(Self {
            keyframe_size: non_negative(bundle, KEY_KEYFRAME_SIZE, defaults.keyframe_size)?,
            keyframe_line_width: non_negative(
                bundle,
                KEY_KEYFRAME_LINE_WIDTH,
                defaults.keyframe_line_width,
            )?,
            graph_line_width: non_negative(
                bundle,
                KEY_GRAPH_LINE_WIDTH,
                defaults.graph_line_width,
            )?,
            point_size: non_negative(bundle, KEY_POINT_SIZE, defaults.point_size)?,
            camera_size: non_negative(bundle, KEY_CAMERA_SIZE, defaults.camera_size)?,
            camera_line_width: non_negative(
                bundle,
                KEY_CAMERA_LINE_WIDTH,
                defaults.camera_line_width,
            )?,
            draw_object_points: lookup(
                bundle,
                KEY_DRAW_OBJECT_POINTS,
                f64::from(u8::from(defaults.draw_object_points)),
            ) != 0.0,
            covisibility_min_weight: count(
                bundle,
                KEY_COVISIBILITY_MIN_WEIGHT,
                defaults.covisibility_min_weight,
                0,
            )?,
            ellipsoid_slices: count(bundle, KEY_ELLIPSOID_SLICES, defaults.ellipsoid_slices, 3)?,
            ellipsoid_stacks: count(bundle, KEY_ELLIPSOID_STACKS, defaults.ellipsoid_stacks, 2)?,
        })
    }

    /// Parse settings from TOML source.
    pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
        Self::from_bundle(&SettingsBundle::from_toml_str(source)?)
    }

    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_toml_str(&content)?;
        log::info!("Loaded viewer settings from {}", path.display());
        Ok(settings)
    }
}

fn lookup(bundle: &SettingsBundle, key: &str, default: f64) -> f64 {
    match bundle.get(key) {
        Some(value) => value,
        None => {
            log::warn!("Setting {key} not found, using default {default}");
            default
        }
    }
}

fn non_negative(bundle: &SettingsBundle, key: &str, default: f32) -> Result<f32, SettingsError> {
    let value = lookup(bundle, key, f64::from(default));
    if !value.is_finite() || value < 0.0 {
        return Err(SettingsError::InvalidValue {
            key: key.to_string(),
            value,
        });
    }
    Ok(value as f32)
}

fn count(bundle: &SettingsBundle, key: &str, default: u32, min: u32) -> Result<u32, SettingsError> {
    let value = lookup(bundle, key, f64::from(default));
    if !value.is_finite() || value.fract() != 0.0 || value < f64::from(min) || value > f64::from(u32::MAX)
    {
        return Err(SettingsError::InvalidValue {
            key: key.to_string(),
            value,
        });
    }
    Ok(value as u32)
}
