use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::aggregate::MarkerColor;
use crate::data::model::Severity;

// ---------------------------------------------------------------------------
// Fixed severity colours
// ---------------------------------------------------------------------------

pub fn marker_color32(color: MarkerColor) -> Color32 {
    match color {
        MarkerColor::Red => Color32::from_rgb(0xd6, 0x27, 0x28),
        MarkerColor::Orange => Color32::from_rgb(0xff, 0x7f, 0x0e),
        MarkerColor::Green => Color32::from_rgb(0x2c, 0xa0, 0x2c),
    }
}

pub fn severity_color(severity: Severity) -> Color32 {
    marker_color32(MarkerColor::for_severity(severity))
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Categorical colours: category name → Color32
// ---------------------------------------------------------------------------

/// Stable colour per category (incident type, country, …). Built from the
/// catalog so a category keeps its colour while filters change.
#[derive(Debug, Clone, Default)]
pub struct CategoryColors {
    mapping: BTreeMap<String, Color32>,
}

impl CategoryColors {
    pub fn new<'a>(categories: impl IntoIterator<Item = &'a String>) -> Self {
        let categories: Vec<&String> = categories.into_iter().collect();
        let palette = generate_palette(categories.len());
        let mapping = categories
            .into_iter()
            .cloned()
            .zip(palette)
            .collect();
        CategoryColors { mapping }
    }

    /// Unknown or missing categories are grey.
    pub fn color_for(&self, category: Option<&str>) -> Color32 {
        category
            .and_then(|c| self.mapping.get(c))
            .copied()
            .unwrap_or(Color32::GRAY)
    }
}
