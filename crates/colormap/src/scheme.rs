//! Color schemes and multi-stop interpolation engine.

use serde::{Deserialize, Serialize};

/// RGB color as (r, g, b) with values in 0..=255.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A color stop: position in [0, 1] mapped to an RGB color.
#[derive(Debug, Clone, Copy)]
pub struct ColorStop {
    pub t: f64,
    pub color: Rgb,
}

impl ColorStop {
    pub const fn new(t: f64, r: u8, g: u8, b: u8) -> Self {
        Self {
            t,
            color: Rgb::new(r, g, b),
        }
    }
}

/// Available color schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColorScheme {
    /// Blue -> Green linear ramp (nitrate overlay)
    #[default]
    Nitrate,
    /// Black -> White
    Grayscale,
    /// White -> Cyan -> Blue
    Water,
    /// Blue -> White -> Red (diverging data such as residuals)
    Divergent,
}

impl ColorScheme {
    /// All available schemes.
    pub const ALL: &[ColorScheme] = &[Self::Nitrate, Self::Grayscale, Self::Water, Self::Divergent];

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nitrate => "Nitrate",
            Self::Grayscale => "Grayscale",
            Self::Water => "Water",
            Self::Divergent => "Divergent",
        }
    }
}

// ─── Color stop definitions ──────────────────────────────────────────

const DIVERGENT_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 44, 62, 180),
    ColorStop::new(0.25, 120, 160, 220),
    ColorStop::new(0.50, 240, 240, 240),
    ColorStop::new(0.75, 220, 120, 80),
    ColorStop::new(1.00, 180, 30, 30),
];

const WATER_STOPS: &[ColorStop] = &[
    ColorStop::new(0.00, 240, 249, 255),
    ColorStop::new(0.25, 186, 228, 250),
    ColorStop::new(0.50, 80, 180, 230),
    ColorStop::new(0.75, 30, 120, 200),
    ColorStop::new(1.00, 8, 48, 107),
];

// ─── Interpolation engine ──────────────────────────────────────────────

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn lerp_color(c1: Rgb, c2: Rgb, t: f64) -> Rgb {
    Rgb::new(
        lerp(c1.r as f64, c2.r as f64, t).round() as u8,
        lerp(c1.g as f64, c2.g as f64, t).round() as u8,
        lerp(c1.b as f64, c2.b as f64, t).round() as u8,
    )
}

fn multi_stop(stops: &[ColorStop], t: f64) -> Rgb {
    if t <= 0.0 {
        return stops[0].color;
    }
    if t >= 1.0 {
        return stops[stops.len() - 1].color;
    }
    for i in 1..stops.len() {
        if t <= stops[i].t {
            let ratio = (t - stops[i - 1].t) / (stops[i].t - stops[i - 1].t);
            return lerp_color(stops[i - 1].color, stops[i].color, ratio);
        }
    }
    stops[stops.len() - 1].color
}

/// Evaluate a color scheme at normalized position `t` ∈ [0, 1].
///
/// `t` is clamped first. `Nitrate` is the linear ramp R = 0, G = ⌊255·t⌋,
/// B = 255 − G; the others interpolate between color stops.
pub fn evaluate(scheme: ColorScheme, t: f64) -> Rgb {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    match scheme {
        ColorScheme::Nitrate => {
            let g = (t * 255.0) as u8;
            Rgb::new(0, g, 255 - g)
        }
        ColorScheme::Grayscale => {
            let v = (t * 255.0).round() as u8;
            Rgb::new(v, v, v)
        }
        ColorScheme::Water => multi_stop(WATER_STOPS, t),
        ColorScheme::Divergent => multi_stop(DIVERGENT_STOPS, t),
    }
}
