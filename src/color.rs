use std::collections::{BTreeMap, BTreeSet};

use palette::{Hsl, IntoColor, Srgb};

/// Colour used for values missing from a [`ColorMap`].
pub const DEFAULT_COLOR: &str = "#808080";

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues,
/// formatted as `#rrggbb` for the browser.
pub fn generate_palette(n: usize) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            format!(
                "#{:02x}{:02x}{:02x}",
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: category label → hex colour
// ---------------------------------------------------------------------------

/// Maps the distinct values of a chosen column to distinct colours.
///
/// Empty values get no palette slot, so records with a blank category share
/// the grey default with values the map has never seen.
#[derive(Debug, Clone)]
pub struct ColorMap {
    /// Name of the column the colours are keyed on; doubles as legend title.
    pub column: String,
    mapping: BTreeMap<String, String>,
}

impl ColorMap {
    /// Build a colour map from a column's distinct values.
    pub fn new(column: &str, values: &BTreeSet<String>) -> Self {
        let keyed: Vec<&String> = values.iter().filter(|v| !v.is_empty()).collect();
        let palette = generate_palette(keyed.len());
        let mapping = keyed.into_iter().cloned().zip(palette).collect();

        ColorMap {
            column: column.to_string(),
            mapping,
        }
    }

    /// Look up the colour for a given value.
    pub fn color_for(&self, value: &str) -> &str {
        self.mapping
            .get(value)
            .map(String::as_str)
            .unwrap_or(DEFAULT_COLOR)
    }

    /// (label, colour) pairs in label order.
    pub fn legend_entries(&self) -> Vec<(&str, &str)> {
        self.mapping
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{LaunchDataset, LaunchRecord, Outcome};

    #[test]
    fn palette_colours_are_distinct_hex() {
        let colors = generate_palette(5);
        assert_eq!(colors.len(), 5);
        for c in &colors {
            assert_eq!(c.len(), 7);
            assert!(c.starts_with('#'));
            assert!(c[1..].chars().all(|ch| ch.is_ascii_hexdigit()));
        }
        let unique: BTreeSet<&String> = colors.iter().collect();
        assert_eq!(unique.len(), 5);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn unknown_values_fall_back_to_grey() {
        let values: BTreeSet<String> = ["B4", "B5", "FT"].iter().map(|s| s.to_string()).collect();
        let map = ColorMap::new("Booster Version Category", &values);
        assert_eq!(map.column, "Booster Version Category");
        assert_ne!(map.color_for("FT"), DEFAULT_COLOR);
        assert_ne!(map.color_for("B4"), map.color_for("B5"));
        assert_eq!(map.color_for("v1.0"), DEFAULT_COLOR);
    }

    #[test]
    fn legend_lists_every_value_with_its_colour() {
        let values: BTreeSet<String> = ["v1.1", "B5"].iter().map(|s| s.to_string()).collect();
        let map = ColorMap::new("Booster Version Category", &values);
        let entries = map.legend_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "B5");
        assert_eq!(entries[1].0, "v1.1");
        for (label, color) in entries {
            assert_eq!(color, map.color_for(label));
        }
    }

    #[test]
    fn blank_category_is_grey_and_takes_no_palette_slot() {
        let dataset = LaunchDataset::from_records(vec![
            LaunchRecord::new("CCAFS LC-40", 500.0, Outcome::Success, ""),
            LaunchRecord::new("KSC LC-39A", 2490.0, Outcome::Success, "FT"),
        ]);
        assert!(dataset.booster_categories().contains(""));

        let map = ColorMap::new("Booster Version Category", dataset.booster_categories());
        assert_eq!(map.color_for(""), DEFAULT_COLOR);
        assert_ne!(map.color_for("FT"), DEFAULT_COLOR);
        assert_eq!(map.legend_entries(), vec![("FT", map.color_for("FT"))]);
    }
}
