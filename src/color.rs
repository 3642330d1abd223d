use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Hex helpers
// ---------------------------------------------------------------------------

/// Parse `#RRGGBB` (or `RRGGBB`) into an 8-bit sRGB colour.
pub fn parse_hex(hex: &str) -> Option<Srgb<u8>> {
    hex.trim().parse::<Srgb<u8>>().ok()
}

/// Format an 8-bit sRGB colour as `#RRGGBB`.
pub fn to_hex(c: Srgb<u8>) -> String {
    format!("#{:02X}{:02X}{:02X}", c.red, c.green, c.blue)
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Srgb<u8>> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            rgb.into_format::<u8>()
        })
        .collect()
}

/// Colours for `n` series: the configured hex colours in order, with any
/// unparsable or missing entry replaced from [`generate_palette`].
pub fn series_colors(configured: &[String], n: usize) -> Vec<String> {
    let fallback = generate_palette(n);
    (0..n)
        .map(|i| {
            match configured.get(i).map(|h| (h, parse_hex(h))) {
                Some((_, Some(c))) => to_hex(c),
                Some((h, None)) => {
                    log::warn!("ignoring invalid series colour '{h}'");
                    to_hex(fallback[i])
                }
                None => to_hex(fallback[i]),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Sequential colour scales for the choropleth
// ---------------------------------------------------------------------------

/// Named sequential scale, stops listed from low to high value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScale {
    Greens,
    #[default]
    Sunset,
}

const GREENS: [&str; 9] = [
    "#F7FCF5", "#E5F5E0", "#C7E9C0", "#A1D99B", "#74C476", "#41AB5D", "#238B45", "#006D2C",
    "#00441B",
];

const SUNSET: [&str; 7] = [
    "#F3E79B", "#FAC484", "#F8A07E", "#EB7F86", "#CE6693", "#A059A0", "#5C53A5",
];

impl ColorScale {
    /// Name the external renderer knows the scale by.
    pub fn renderer_name(self) -> &'static str {
        match self {
            ColorScale::Greens => "Greens",
            ColorScale::Sunset => "sunset",
        }
    }

    fn stops(self) -> &'static [&'static str] {
        match self {
            ColorScale::Greens => &GREENS,
            ColorScale::Sunset => &SUNSET,
        }
    }

    /// Colour at position `t` in `[0, 1]`, interpolated in linear sRGB.
    /// Out-of-range and non-finite positions are clamped.
    pub fn color_at(self, t: f64, reversed: bool) -> Srgb<u8> {
        let stops: Vec<LinSrgb> = self
            .stops()
            .iter()
            .filter_map(|h| parse_hex(h))
            .map(|c| c.into_format::<f32>().into_linear())
            .collect();

        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let t = if reversed { 1.0 - t } else { t };

        let last = stops.len() - 1;
        let pos = t as f32 * last as f32;
        let lo = (pos.floor() as usize).min(last);
        let hi = (lo + 1).min(last);
        let mixed = stops[lo].mix(stops[hi], pos - lo as f32);
        Srgb::<f32>::from_linear(mixed).into_format::<u8>()
    }
}

/// Maps a value range onto a [`ColorScale`].
#[derive(Debug, Clone, Copy)]
pub struct ScoreScale {
    pub scale: ColorScale,
    pub reversed: bool,
    pub min: f64,
    pub max: f64,
}

impl ScoreScale {
    /// Fit the scale to the finite values in `values`.
    pub fn fit(scale: ColorScale, reversed: bool, values: &[f64]) -> Self {
        let finite = values.iter().copied().filter(|v| v.is_finite());
        let min = finite.clone().fold(f64::INFINITY, f64::min);
        let max = finite.fold(f64::NEG_INFINITY, f64::max);
        ScoreScale {
            scale,
            reversed,
            min: if min.is_finite() { min } else { 0.0 },
            max: if max.is_finite() { max } else { 0.0 },
        }
    }

    pub fn color_for(&self, value: f64) -> Srgb<u8> {
        let range = self.max - self.min;
        let t = if range.abs() < f64::EPSILON {
            0.0
        } else {
            (value - self.min) / range
        };
        self.scale.color_at(t, self.reversed)
    }
}
