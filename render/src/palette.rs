//! Palette and Color Engine
//!
//! Semantic-to-terminal-color mapping. Domain values (equipment status,
//! structural kind, temperature, energy) resolve to `Rgb` through
//! mode-specific lookup tables, then to an 8-bit terminal color index
//! through the capability layer. When the terminal lacks 256-color support
//! the color channel is dropped entirely and only glyphs survive, so no
//! information encoded in glyph shape is ever lost.
//!
//! All semantic lookups are pure and table-driven; swapping the palette
//! mode swaps the active table set without touching anything already drawn.

use std::env;
use std::sync::{Arc, RwLock};

use ratatui::style::{Color, Style};
use serde::{Deserialize, Serialize};

use crate::source::EquipmentStatus;

/// 24-bit color used by the semantic tables before terminal resolution
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear interpolation toward `other` at `t` in `[0, 1]`
    #[must_use]
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| -> u8 {
            (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8
        };
        Rgb::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }
}

/// Deterministic gradient of exactly `steps` colors from `start` to `end`
///
/// Adjacent indices differ by at most one interpolation step, so there is
/// no visual discontinuity. `gradient(c, c, n)` yields `n` copies of `c`.
#[must_use]
pub fn gradient(start: Rgb, end: Rgb, steps: usize) -> Vec<Rgb> {
    match steps {
        0 => Vec::new(),
        1 => vec![start],
        _ => (0..steps)
            .map(|i| start.lerp(end, i as f32 / (steps - 1) as f32))
            .collect(),
    }
}

/// Quantize to the xterm 256-color space
///
/// Near-gray colors use the grayscale ramp (232-255), everything else the
/// 6x6x6 cube (16-231).
#[must_use]
pub fn quantize_256(rgb: Rgb) -> u8 {
    let spread = (i16::from(rgb.r) - i16::from(rgb.g)).abs()
        + (i16::from(rgb.g) - i16::from(rgb.b)).abs()
        + (i16::from(rgb.r) - i16::from(rgb.b)).abs();

    if spread < 30 {
        let avg = (u16::from(rgb.r) + u16::from(rgb.g) + u16::from(rgb.b)) / 3;
        let gray = ((avg as f32 / 255.0) * 23.0).round() as u8;
        return 232 + gray.min(23);
    }

    let channel = |v: u8| ((f32::from(v) / 255.0) * 5.0).round() as u8;
    16 + 36 * channel(rgb.r) + 6 * channel(rgb.g) + channel(rgb.b)
}

/// What the attached terminal can display
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorSupport {
    /// 256-color indexed output
    #[default]
    Indexed256,
    /// No usable color; emit glyphs only
    GlyphOnly,
}

/// Detect color support from the environment
///
/// `NO_COLOR` wins outright; otherwise `COLORTERM` or a `TERM` advertising
/// color counts as 256-color capable.
#[must_use]
pub fn detect_color_support() -> ColorSupport {
    parse_color_support(
        env::var("TERM").ok().as_deref(),
        env::var("COLORTERM").ok().as_deref(),
        env::var("NO_COLOR").is_ok(),
    )
}

/// Pure capability classification, exposed for testing
#[must_use]
pub fn parse_color_support(
    term: Option<&str>,
    colorterm: Option<&str>,
    no_color: bool,
) -> ColorSupport {
    if no_color {
        return ColorSupport::GlyphOnly;
    }
    if colorterm.is_some_and(|v| !v.is_empty()) {
        return ColorSupport::Indexed256;
    }
    match term {
        Some(t) if t.contains("color") => ColorSupport::Indexed256,
        _ => ColorSupport::GlyphOnly,
    }
}

/// Active semantic table set
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaletteMode {
    #[default]
    Default,
    /// High-contrast grays only
    Monochrome,
    /// Brightness-separated hues for color-vision accessibility
    Accessibility,
}

/// One mode's worth of lookup tables
struct TableSet {
    equipment: &'static [(EquipmentStatus, Rgb)],
    /// Keyword -> color, first substring match wins
    structural: &'static [(&'static str, Rgb)],
    /// Ascending thresholds; first entry with `t <= threshold` wins
    temperature: &'static [(f32, Rgb)],
    energy: &'static [(f32, Rgb)],
    background: Rgb,
    fallback: Rgb,
}

const DEFAULT_TABLES: TableSet = TableSet {
    equipment: &[
        (EquipmentStatus::Operational, Rgb::new(120, 230, 120)),
        (EquipmentStatus::NeedsRepair, Rgb::new(255, 210, 80)),
        (EquipmentStatus::Failed, Rgb::new(255, 80, 80)),
        (EquipmentStatus::Offline, Rgb::new(120, 120, 120)),
        (EquipmentStatus::Unknown, Rgb::new(200, 200, 200)),
    ],
    structural: &[
        ("mechanical", Rgb::new(100, 160, 255)),
        ("electrical", Rgb::new(255, 220, 90)),
        ("plumbing", Rgb::new(90, 210, 230)),
        ("server", Rgb::new(220, 120, 255)),
        ("data", Rgb::new(220, 120, 255)),
        ("storage", Rgb::new(150, 150, 150)),
    ],
    temperature: &[
        (0.2, Rgb::new(90, 140, 255)),
        (0.4, Rgb::new(90, 220, 230)),
        (0.6, Rgb::new(255, 220, 90)),
        (0.8, Rgb::new(255, 150, 60)),
        (f32::MAX, Rgb::new(255, 70, 70)),
    ],
    energy: &[
        (0.25, Rgb::new(90, 170, 90)),
        (0.5, Rgb::new(140, 230, 100)),
        (0.75, Rgb::new(255, 220, 90)),
        (f32::MAX, Rgb::new(255, 120, 60)),
    ],
    background: Rgb::new(24, 24, 28),
    fallback: Rgb::new(200, 200, 200),
};

const MONOCHROME_TABLES: TableSet = TableSet {
    equipment: &[
        (EquipmentStatus::Operational, Rgb::new(235, 235, 235)),
        (EquipmentStatus::NeedsRepair, Rgb::new(190, 190, 190)),
        (EquipmentStatus::Failed, Rgb::new(255, 255, 255)),
        (EquipmentStatus::Offline, Rgb::new(110, 110, 110)),
        (EquipmentStatus::Unknown, Rgb::new(150, 150, 150)),
    ],
    structural: &[],
    temperature: &[
        (0.33, Rgb::new(120, 120, 120)),
        (0.66, Rgb::new(190, 190, 190)),
        (f32::MAX, Rgb::new(255, 255, 255)),
    ],
    energy: &[
        (0.33, Rgb::new(120, 120, 120)),
        (0.66, Rgb::new(190, 190, 190)),
        (f32::MAX, Rgb::new(255, 255, 255)),
    ],
    background: Rgb::new(0, 0, 0),
    fallback: Rgb::new(200, 200, 200),
};

const ACCESSIBILITY_TABLES: TableSet = TableSet {
    // Hues picked for brightness separation, not just hue separation
    equipment: &[
        (EquipmentStatus::Operational, Rgb::new(80, 200, 255)),
        (EquipmentStatus::NeedsRepair, Rgb::new(255, 255, 120)),
        (EquipmentStatus::Failed, Rgb::new(255, 255, 255)),
        (EquipmentStatus::Offline, Rgb::new(90, 90, 90)),
        (EquipmentStatus::Unknown, Rgb::new(180, 180, 180)),
    ],
    structural: &[
        ("mechanical", Rgb::new(80, 200, 255)),
        ("electrical", Rgb::new(255, 255, 120)),
        ("plumbing", Rgb::new(130, 255, 200)),
        ("server", Rgb::new(255, 180, 255)),
        ("data", Rgb::new(255, 180, 255)),
    ],
    temperature: &[
        (0.2, Rgb::new(60, 120, 220)),
        (0.4, Rgb::new(110, 200, 255)),
        (0.6, Rgb::new(255, 255, 140)),
        (0.8, Rgb::new(255, 200, 120)),
        (f32::MAX, Rgb::new(255, 255, 255)),
    ],
    energy: &[
        (0.25, Rgb::new(100, 160, 160)),
        (0.5, Rgb::new(130, 255, 200)),
        (0.75, Rgb::new(255, 255, 140)),
        (f32::MAX, Rgb::new(255, 255, 255)),
    ],
    background: Rgb::new(0, 0, 0),
    fallback: Rgb::new(220, 220, 220),
};

fn tables(mode: PaletteMode) -> &'static TableSet {
    match mode {
        PaletteMode::Default => &DEFAULT_TABLES,
        PaletteMode::Monochrome => &MONOCHROME_TABLES,
        PaletteMode::Accessibility => &ACCESSIBILITY_TABLES,
    }
}

fn ramp_lookup(ramp: &[(f32, Rgb)], value: f32, fallback: Rgb) -> Rgb {
    let value = if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    };
    ramp.iter()
        .find(|(threshold, _)| value <= *threshold)
        .map(|(_, rgb)| *rgb)
        .unwrap_or(fallback)
}

/// Semantic color resolver: a mode plus a capability
///
/// All lookups are pure reads; a `Palette` is freely shared across a
/// render pass.
#[derive(Clone, Copy, Debug)]
pub struct Palette {
    mode: PaletteMode,
    support: ColorSupport,
}

/// Palette handle shared between the renderer and its layers
pub type SharedPalette = Arc<RwLock<Palette>>;

impl Palette {
    #[must_use]
    pub fn new(mode: PaletteMode, support: ColorSupport) -> Self {
        Self { mode, support }
    }

    /// Palette with capability detected from the environment
    #[must_use]
    pub fn detect() -> Self {
        Self::new(PaletteMode::default(), detect_color_support())
    }

    #[must_use]
    pub fn mode(&self) -> PaletteMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: PaletteMode) {
        self.mode = mode;
    }

    #[must_use]
    pub fn support(&self) -> ColorSupport {
        self.support
    }

    /// Color for an equipment status
    #[must_use]
    pub fn equipment_color(&self, status: EquipmentStatus) -> Rgb {
        let set = tables(self.mode);
        set.equipment
            .iter()
            .find(|(s, _)| *s == status)
            .map(|(_, rgb)| *rgb)
            .unwrap_or(set.fallback)
    }

    /// Keyword-based color for a structural label ("Mechanical Room" -> blue)
    #[must_use]
    pub fn structural_color(&self, label: &str) -> Rgb {
        let set = tables(self.mode);
        let lowered = label.to_lowercase();
        set.structural
            .iter()
            .find(|(keyword, _)| lowered.contains(keyword))
            .map(|(_, rgb)| *rgb)
            .unwrap_or(set.fallback)
    }

    /// Color for a normalized temperature in `[0, 1]`
    #[must_use]
    pub fn temperature_color(&self, value: f32) -> Rgb {
        let set = tables(self.mode);
        ramp_lookup(set.temperature, value, set.fallback)
    }

    /// Color for a normalized energy level in `[0, 1]`
    #[must_use]
    pub fn energy_color(&self, value: f32) -> Rgb {
        let set = tables(self.mode);
        ramp_lookup(set.energy, value, set.fallback)
    }

    /// Background fill color for the active mode
    #[must_use]
    pub fn background(&self) -> Rgb {
        tables(self.mode).background
    }

    /// Resolve to a terminal color, or `None` when color is unsupported
    #[must_use]
    pub fn resolve(&self, rgb: Rgb) -> Option<Color> {
        match self.support {
            ColorSupport::Indexed256 => Some(Color::Indexed(quantize_256(rgb))),
            ColorSupport::GlyphOnly => None,
        }
    }

    /// Style with the resolved foreground, or an unstyled default
    #[must_use]
    pub fn style(&self, rgb: Rgb) -> Style {
        match self.resolve(rgb) {
            Some(color) => Style::default().fg(color),
            None => Style::default(),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(PaletteMode::default(), ColorSupport::default())
    }
}
