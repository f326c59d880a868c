use crate::theme::{ColorRole, ColorScheme};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MIN_NODE_RADIUS: f32 = 1.0;
pub const MIN_SPACING: f32 = 1.0;
pub const MIN_CANVAS: f32 = 1.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomColors {
    pub male: Option<String>,
    pub female: Option<String>,
    pub other: Option<String>,
    pub link: Option<String>,
    pub background: Option<String>,
}

impl CustomColors {
    pub fn get(&self, role: ColorRole) -> Option<&str> {
        match role {
            ColorRole::Male => self.male.as_deref(),
            ColorRole::Female => self.female.as_deref(),
            ColorRole::Other => self.other.as_deref(),
            ColorRole::Link => self.link.as_deref(),
            ColorRole::Background => self.background.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    pub width: f32,
    pub height: f32,
    pub node_radius: f32,
    pub level_height: f32,
    pub node_spacing: f32,
    pub color_scheme: ColorScheme,
    pub show_photos: bool,
    pub show_dates: bool,
    pub show_occupation: bool,
    /// Entrance animation length in milliseconds; 0 disables animation.
    pub animation_duration: u32,
    pub enable_zoom: bool,
    pub custom_colors: CustomColors,
    pub font_family: String,
    pub font_size: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            node_radius: 30.0,
            level_height: 150.0,
            node_spacing: 100.0,
            color_scheme: ColorScheme::Default,
            show_photos: true,
            show_dates: true,
            show_occupation: false,
            animation_duration: 750,
            enable_zoom: true,
            custom_colors: CustomColors::default(),
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 14.0,
        }
    }
}

impl RenderOptions {
    /// Copy with every numeric field forced finite and positive, so layout and
    /// rendering never see NaN or negative geometry.
    pub fn sanitized(&self) -> Self {
        let defaults = RenderOptions::default();
        let clamp = |value: f32, fallback: f32, min: f32| {
            if value.is_finite() {
                value.max(min)
            } else {
                fallback
            }
        };
        Self {
            width: clamp(self.width, defaults.width, MIN_CANVAS),
            height: clamp(self.height, defaults.height, MIN_CANVAS),
            node_radius: clamp(self.node_radius, defaults.node_radius, MIN_NODE_RADIUS),
            level_height: clamp(self.level_height, defaults.level_height, MIN_SPACING),
            node_spacing: clamp(self.node_spacing, defaults.node_spacing, MIN_SPACING),
            font_size: clamp(self.font_size, defaults.font_size, 1.0),
            ..self.clone()
        }
    }

    pub fn apply(&mut self, patch: RenderOptionsPatch) {
        if let Some(v) = patch.width {
            self.width = v;
        }
        if let Some(v) = patch.height {
            self.height = v;
        }
        if let Some(v) = patch.node_radius {
            self.node_radius = v;
        }
        if let Some(v) = patch.level_height {
            self.level_height = v;
        }
        if let Some(v) = patch.node_spacing {
            self.node_spacing = v;
        }
        if let Some(v) = patch.color_scheme {
            self.color_scheme = v;
        }
        if let Some(v) = patch.show_photos {
            self.show_photos = v;
        }
        if let Some(v) = patch.show_dates {
            self.show_dates = v;
        }
        if let Some(v) = patch.show_occupation {
            self.show_occupation = v;
        }
        if let Some(v) = patch.animation_duration {
            self.animation_duration = v;
        }
        if let Some(v) = patch.enable_zoom {
            self.enable_zoom = v;
        }
        if let Some(v) = patch.custom_colors {
            self.custom_colors = v;
        }
        if let Some(v) = patch.font_family {
            self.font_family = v;
        }
        if let Some(v) = patch.font_size {
            self.font_size = v;
        }
    }
}

/// Partial options for `Visualization::update_options`; unset fields keep
/// their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptionsPatch {
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub node_radius: Option<f32>,
    pub level_height: Option<f32>,
    pub node_spacing: Option<f32>,
    pub color_scheme: Option<ColorScheme>,
    pub show_photos: Option<bool>,
    pub show_dates: Option<bool>,
    pub show_occupation: Option<bool>,
    pub animation_duration: Option<u32>,
    pub enable_zoom: Option<bool>,
    pub custom_colors: Option<CustomColors>,
    pub font_family: Option<String>,
    pub font_size: Option<f32>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<RenderOptions> {
    let Some(path) = path else {
        return Ok(RenderOptions::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let parsed: RenderOptions = serde_json::from_str(&contents)?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let parsed: RenderOptions =
            serde_json::from_str(r#"{"colorScheme": "vintage", "showOccupation": true}"#).unwrap();
        assert_eq!(parsed.color_scheme, ColorScheme::Vintage);
        assert!(parsed.show_occupation);
        assert_eq!(parsed.width, 1200.0);
        assert_eq!(parsed.animation_duration, 750);
    }

    #[test]
    fn patch_only_touches_set_fields() {
        let mut options = RenderOptions::default();
        options.apply(RenderOptionsPatch {
            node_radius: Some(12.0),
            show_dates: Some(false),
            ..Default::default()
        });
        assert_eq!(options.node_radius, 12.0);
        assert!(!options.show_dates);
        assert_eq!(options.level_height, 150.0);
        assert!(options.show_photos);
    }

    #[test]
    fn sanitized_replaces_nan_and_negative_values() {
        let options = RenderOptions {
            width: f32::NAN,
            node_spacing: -5.0,
            level_height: f32::INFINITY,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(options.width, 1200.0);
        assert_eq!(options.node_spacing, MIN_SPACING);
        assert_eq!(options.level_height, 150.0);
    }

    #[test]
    fn custom_colors_map_every_role() {
        let colors = CustomColors {
            link: Some("#123456".into()),
            ..Default::default()
        };
        assert_eq!(colors.get(ColorRole::Link), Some("#123456"));
        assert_eq!(colors.get(ColorRole::Male), None);
    }

    #[test]
    fn load_config_reads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        std::fs::write(&path, r#"{"width": 640, "nodeSpacing": 80}"#).unwrap();
        let options = load_config(Some(&path)).unwrap();
        assert_eq!(options.width, 640.0);
        assert_eq!(options.node_spacing, 80.0);
        assert_eq!(load_config(None).unwrap(), RenderOptions::default());
    }
}
