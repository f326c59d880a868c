use crate::config::{CustomColors, RenderOptions};
use crate::model::Gender;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Default,
    Vintage,
    Modern,
    Custom,
}

impl FromStr for ColorScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "vintage" => Ok(Self::Vintage),
            "modern" => Ok(Self::Modern),
            "custom" => Ok(Self::Custom),
            other => Err(format!("unknown color scheme: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorRole {
    Male,
    Female,
    Other,
    Link,
    Background,
}

impl ColorRole {
    pub const ALL: [ColorRole; 5] = [
        ColorRole::Male,
        ColorRole::Female,
        ColorRole::Other,
        ColorRole::Link,
        ColorRole::Background,
    ];

    pub fn for_gender(gender: Option<Gender>) -> Self {
        match gender {
            Some(Gender::Male) => ColorRole::Male,
            Some(Gender::Female) => ColorRole::Female,
            Some(Gender::Other) | None => ColorRole::Other,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "male" => Some(ColorRole::Male),
            "female" => Some(ColorRole::Female),
            "other" => Some(ColorRole::Other),
            "link" => Some(ColorRole::Link),
            "background" => Some(ColorRole::Background),
            _ => None,
        }
    }
}

fn palette(scheme: ColorScheme, role: ColorRole) -> Option<&'static str> {
    match (scheme, role) {
        (ColorScheme::Default, ColorRole::Male) => Some("#4A90E2"),
        (ColorScheme::Default, ColorRole::Female) => Some("#E24A90"),
        (ColorScheme::Default, ColorRole::Other) => Some("#9B9B9B"),
        (ColorScheme::Default, ColorRole::Link) => Some("#999999"),
        (ColorScheme::Default, ColorRole::Background) => Some("#FFFFFF"),
        (ColorScheme::Vintage, ColorRole::Male) => Some("#8B4513"),
        (ColorScheme::Vintage, ColorRole::Female) => Some("#CD853F"),
        (ColorScheme::Vintage, ColorRole::Other) => Some("#D2B48C"),
        (ColorScheme::Vintage, ColorRole::Link) => Some("#8B7355"),
        (ColorScheme::Vintage, ColorRole::Background) => Some("#FDF5E6"),
        (ColorScheme::Modern, ColorRole::Male) => Some("#2196F3"),
        (ColorScheme::Modern, ColorRole::Female) => Some("#E91E63"),
        (ColorScheme::Modern, ColorRole::Other) => Some("#9E9E9E"),
        (ColorScheme::Modern, ColorRole::Link) => Some("#607D8B"),
        (ColorScheme::Modern, ColorRole::Background) => Some("#FAFAFA"),
        (ColorScheme::Custom, _) => None,
    }
}

/// Resolves the color for `role`. Custom schemes read `custom`; the others
/// read their fixed palette. Anything unresolved yields `fallback`.
pub fn get_color(
    scheme: ColorScheme,
    custom: &CustomColors,
    role: ColorRole,
    fallback: &str,
) -> String {
    let resolved = match scheme {
        ColorScheme::Custom => custom.get(role),
        _ => palette(scheme, role),
    };
    resolved.unwrap_or(fallback).to_string()
}

/// String-keyed variant for callers holding loosely typed role names.
pub fn get_color_by_name(
    scheme: ColorScheme,
    custom: &CustomColors,
    role: &str,
    fallback: &str,
) -> String {
    match ColorRole::parse(role) {
        Some(role) => get_color(scheme, custom, role, fallback),
        None => fallback.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub male: String,
    pub female: String,
    pub other: String,
    pub line_color: String,
    pub background: String,
    pub text_color: String,
    pub secondary_text_color: String,
    pub node_stroke: String,
}

impl Theme {
    pub fn resolve(options: &RenderOptions) -> Self {
        let scheme = options.color_scheme;
        let custom = &options.custom_colors;
        let (text_color, secondary_text_color) = match scheme {
            ColorScheme::Vintage => ("#3E2723", "#6D4C41"),
            ColorScheme::Modern => ("#1C2430", "#546E7A"),
            ColorScheme::Default | ColorScheme::Custom => ("#333333", "#666666"),
        };
        Self {
            font_family: options.font_family.clone(),
            font_size: options.font_size,
            male: get_color(scheme, custom, ColorRole::Male, "#4A90E2"),
            female: get_color(scheme, custom, ColorRole::Female, "#E24A90"),
            other: get_color(scheme, custom, ColorRole::Other, "#9B9B9B"),
            line_color: get_color(scheme, custom, ColorRole::Link, "#999999"),
            background: get_color(scheme, custom, ColorRole::Background, "#FFFFFF"),
            text_color: text_color.to_string(),
            secondary_text_color: secondary_text_color.to_string(),
            node_stroke: "#FFFFFF".to_string(),
        }
    }

    pub fn node_fill(&self, gender: Option<Gender>) -> &str {
        match ColorRole::for_gender(gender) {
            ColorRole::Male => &self.male,
            ColorRole::Female => &self.female,
            _ => &self.other,
        }
    }
}
