use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::{Label, SourceId};

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
// Fixed label colours
// ---------------------------------------------------------------------------

/// Cloudy pixels: `#dddddd`.
pub const CLOUDY: Color32 = Color32::from_rgb(0xdd, 0xdd, 0xdd);
/// Cloud-free pixels: matplotlib's `grey` (`#808080`).
pub const CLOUD_FREE: Color32 = Color32::from_rgb(0x80, 0x80, 0x80);
pub const UNLABELED: Color32 = Color32::BLACK;

pub fn label_color(label: Label) -> Color32 {
    match label {
        Label::Cloudy => CLOUDY,
        Label::CloudFree => CLOUD_FREE,
        Label::Unlabeled => UNLABELED,
    }
}

// ---------------------------------------------------------------------------
// Source colours: image id → Color32
// ---------------------------------------------------------------------------

/// Assigns each image a distinct colour so an image keeps the same colour
/// across every subplot.
#[derive(Debug, Clone)]
pub struct SourceColors {
    mapping: BTreeMap<SourceId, Color32>,
    default_color: Color32,
}

impl SourceColors {
    pub fn new<'a>(sources: impl ExactSizeIterator<Item = &'a SourceId>) -> Self {
        let palette = generate_palette(sources.len());
        let mapping = sources
            .zip(palette)
            .map(|(s, c)| (s.clone(), c))
            .collect();

        SourceColors {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, source: &SourceId) -> Color32 {
        self.mapping
            .get(source)
            .copied()
            .unwrap_or(self.default_color)
    }
}
