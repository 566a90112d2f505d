use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::{Channel, CloudPoint};

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Channel colours
// ---------------------------------------------------------------------------

/// Evenly spaced hues, one per channel (L, M, R).
pub fn channel_color(channel: Channel) -> Color32 {
    let hue = (channel.index() as f32 / Channel::ALL.len() as f32) * 360.0 + 210.0;
    hsl_to_color32(hue % 360.0, 0.75, 0.55)
}

/// Trend lines are drawn darker than the raw signal of the same channel.
pub fn trend_color(channel: Channel) -> Color32 {
    let hue = (channel.index() as f32 / Channel::ALL.len() as f32) * 360.0 + 210.0;
    hsl_to_color32(hue % 360.0, 0.85, 0.35)
}

pub const SPIKE_COLOR: Color32 = Color32::from_rgb(230, 40, 40);

// ---------------------------------------------------------------------------
// Energy gradient
// ---------------------------------------------------------------------------

/// Maps energy onto a blue (low) to red (high) hue ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyScale {
    pub min: f64,
    pub max: f64,
}

impl EnergyScale {
    pub fn from_points(points: &[CloudPoint]) -> Option<Self> {
        let mut it = points.iter().map(|p| p.energy).filter(|e| e.is_finite());
        let first = it.next()?;
        let (min, max) = it.fold((first, first), |(lo, hi), e| (lo.min(e), hi.max(e)));
        Some(Self { min, max })
    }

    /// Position of `energy` in `[0, 1]`; a flat scale maps everything to 0.5.
    pub fn normalise(&self, energy: f64) -> f64 {
        let range = self.max - self.min;
        if range.abs() < f64::EPSILON {
            0.5
        } else {
            ((energy - self.min) / range).clamp(0.0, 1.0)
        }
    }

    pub fn color_for(&self, energy: f64) -> Color32 {
        let t = self.normalise(energy) as f32;
        hsl_to_color32(240.0 * (1.0 - t), 0.8, 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_colours_are_distinct() {
        let c: Vec<Color32> = Channel::ALL.iter().map(|&ch| channel_color(ch)).collect();
        assert_ne!(c[0], c[1]);
        assert_ne!(c[1], c[2]);
        assert_ne!(channel_color(Channel::Left), trend_color(Channel::Left));
    }

    #[test]
    fn energy_scale_spans_blue_to_red() {
        let scale = EnergyScale { min: 0.0, max: 10.0 };
        let low = scale.color_for(0.0);
        let high = scale.color_for(10.0);
        assert!(low.b() > low.r());
        assert!(high.r() > high.b());
        assert_eq!(scale.normalise(20.0), 1.0);
        assert_eq!(EnergyScale { min: 3.0, max: 3.0 }.normalise(3.0), 0.5);
    }
}
