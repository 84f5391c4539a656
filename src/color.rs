use std::collections::BTreeMap;

use palette::{Hsl, IntoColor, Srgb};
use plotters::style::RGBColor;

use crate::data::model::Value;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<RGBColor> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            // Offset so the first two hues read as blue and orange.
            let hue = 210.0 + (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.6, 0.5);
            let rgb: Srgb = hsl.into_color();
            RGBColor(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Hue mapping: category value → RGBColor
// ---------------------------------------------------------------------------

/// Maps the levels of a hue column to distinct colours.
#[derive(Debug, Clone)]
pub struct HueMap {
    mapping: BTreeMap<Value, RGBColor>,
    order: Vec<Value>,
    default_color: RGBColor,
}

impl HueMap {
    /// Build a hue map from the column levels, in display order.
    pub fn new(levels: &[Value]) -> Self {
        let palette = generate_palette(levels.len());
        let mapping = levels.iter().cloned().zip(palette).collect();

        HueMap {
            mapping,
            order: levels.to_vec(),
            default_color: RGBColor(128, 128, 128),
        }
    }

    /// Look up the colour for a given hue value.
    pub fn color_for(&self, value: &Value) -> RGBColor {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Position of `value` among the hue levels.
    pub fn index_of(&self, value: &Value) -> Option<usize> {
        self.order.iter().position(|v| v == value)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Return the legend entries (value label → colour).
    pub fn legend_entries(&self) -> Vec<(String, RGBColor)> {
        self.order
            .iter()
            .map(|v| (v.to_string(), self.color_for(v)))
            .collect()
    }
}
