//! Linked width/height computation for dimension constraints.
//!
//! With an active aspect ratio `r` (width / height), editing one side derives
//! the other: `height = round(width / r)` and `width = round(height * r)`.
//! Rounding is half away from zero. Input that is not a finite non-negative
//! integer becomes [`Dimension::Empty`] instead of zero or NaN.

use serde::{Deserialize, Serialize};

use crate::models::{AspectRatio, DimensionConstraint};

/// One side of a width/height pair as entered in an authoring form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<u32>", into = "Option<u32>")]
pub enum Dimension {
    /// No usable value. Distinct from zero.
    #[default]
    Empty,
    Pixels(u32),
}

impl Dimension {
    /// Parse form input. Accepts integers, and floats with no fractional part.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        if let Ok(px) = trimmed.parse::<u32>() {
            return Self::Pixels(px);
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.fract() == 0.0 => Self::from_f64(v),
            _ => Self::Empty,
        }
    }

    /// Convert a computed value, rejecting negative, non-finite and out-of-range input.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() || value < 0.0 {
            return Self::Empty;
        }
        let rounded = value.round();
        if rounded > u32::MAX as f64 {
            Self::Empty
        } else {
            Self::Pixels(rounded as u32)
        }
    }

    pub fn pixels(&self) -> Option<u32> {
        match self {
            Self::Empty => None,
            Self::Pixels(px) => Some(*px),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<Option<u32>> for Dimension {
    fn from(value: Option<u32>) -> Self {
        value.map(Self::Pixels).unwrap_or(Self::Empty)
    }
}

impl From<Dimension> for Option<u32> {
    fn from(value: Dimension) -> Self {
        value.pixels()
    }
}

/// A width/height pair after an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DimensionPair {
    pub width: Dimension,
    pub height: Dimension,
}

/// `round(width / ratio)`, or `None` when the ratio cannot link the sides.
pub fn height_for_width(width: u32, ratio: &AspectRatio) -> Option<u32> {
    let r = ratio.linked_value()?;
    Dimension::from_f64(width as f64 / r).pixels()
}

/// `round(height * ratio)`, or `None` when the ratio cannot link the sides.
pub fn width_for_height(height: u32, ratio: &AspectRatio) -> Option<u32> {
    let r = ratio.linked_value()?;
    Dimension::from_f64(height as f64 * r).pixels()
}

/// Width was edited. Height is re-derived when the ratio is linked and the
/// new width is usable; otherwise it keeps `current_height`.
pub fn on_width_change(
    new_width: Dimension,
    ratio: &AspectRatio,
    current_height: Dimension,
) -> DimensionPair {
    let height = new_width
        .pixels()
        .and_then(|w| height_for_width(w, ratio))
        .map(Dimension::Pixels)
        .unwrap_or(current_height);
    DimensionPair {
        width: new_width,
        height,
    }
}

/// Height was edited. Symmetric to [`on_width_change`].
pub fn on_height_change(
    new_height: Dimension,
    ratio: &AspectRatio,
    current_width: Dimension,
) -> DimensionPair {
    let width = new_height
        .pixels()
        .and_then(|h| width_for_height(h, ratio))
        .map(Dimension::Pixels)
        .unwrap_or(current_width);
    DimensionPair {
        width,
        height: new_height,
    }
}

/// Ratio was switched. A linked ratio re-derives height from the current
/// width; the free ratio leaves both sides as they were.
pub fn on_ratio_change(new_ratio: &AspectRatio, current: DimensionPair) -> DimensionPair {
    match current.width.pixels().and_then(|w| height_for_width(w, new_ratio)) {
        Some(h) => DimensionPair {
            width: current.width,
            height: Dimension::Pixels(h),
        },
        None => current,
    }
}

impl DimensionConstraint {
    pub fn pair(&self) -> DimensionPair {
        DimensionPair {
            width: self.min_width.into(),
            height: self.min_height.into(),
        }
    }

    fn apply(&mut self, pair: DimensionPair) {
        self.min_width = pair.width.pixels();
        self.min_height = pair.height.pixels();
    }

    /// Edit the minimum width. Linking only applies while the constraint is enabled.
    pub fn set_min_width(&mut self, width: Dimension) {
        let pair = if self.enabled {
            on_width_change(width, &self.aspect_ratio, self.min_height.into())
        } else {
            DimensionPair {
                width,
                height: self.min_height.into(),
            }
        };
        self.apply(pair);
    }

    /// Edit the minimum height. Linking only applies while the constraint is enabled.
    pub fn set_min_height(&mut self, height: Dimension) {
        let pair = if self.enabled {
            on_height_change(height, &self.aspect_ratio, self.min_width.into())
        } else {
            DimensionPair {
                width: self.min_width.into(),
                height,
            }
        };
        self.apply(pair);
    }

    pub fn set_aspect_ratio(&mut self, ratio: AspectRatio) {
        if self.enabled {
            let pair = on_ratio_change(&ratio, self.pair());
            self.apply(pair);
        }
        self.aspect_ratio = ratio;
    }

    /// Re-derive the pair so a stored constraint satisfies its ratio.
    /// Width wins when both are present; height alone derives width.
    pub fn canonicalize(&mut self) {
        if !self.enabled || self.aspect_ratio.linked_value().is_none() {
            return;
        }
        match (self.min_width, self.min_height) {
            (Some(w), _) => self.min_height = height_for_width(w, &self.aspect_ratio),
            (None, Some(h)) => self.min_width = width_for_height(h, &self.aspect_ratio),
            (None, None) => {}
        }
    }

    /// True when the stored pair agrees with the active ratio.
    pub fn is_consistent(&self) -> bool {
        if !self.enabled {
            return true;
        }
        match (self.min_width, self.min_height) {
            (Some(w), Some(h)) => match height_for_width(w, &self.aspect_ratio) {
                Some(expected) => expected == h,
                None => true,
            },
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sixteen_nine() -> AspectRatio {
        AspectRatio::new("16:9", 16.0 / 9.0)
    }

    #[test]
    fn test_parse_dimension() {
        assert_eq!(Dimension::parse("1920"), Dimension::Pixels(1920));
        assert_eq!(Dimension::parse(" 1080 "), Dimension::Pixels(1080));
        assert_eq!(Dimension::parse("1080.0"), Dimension::Pixels(1080));
        assert_eq!(Dimension::parse("0"), Dimension::Pixels(0));
        assert_eq!(Dimension::parse(""), Dimension::Empty);
        assert_eq!(Dimension::parse("abc"), Dimension::Empty);
        assert_eq!(Dimension::parse("-5"), Dimension::Empty);
        assert_eq!(Dimension::parse("12.5"), Dimension::Empty);
        assert_eq!(Dimension::parse("NaN"), Dimension::Empty);
        assert_eq!(Dimension::parse("inf"), Dimension::Empty);
    }

    #[test]
    fn test_from_f64_rejects_bad_values() {
        assert_eq!(Dimension::from_f64(f64::NAN), Dimension::Empty);
        assert_eq!(Dimension::from_f64(f64::INFINITY), Dimension::Empty);
        assert_eq!(Dimension::from_f64(-0.5), Dimension::Empty);
        assert_eq!(Dimension::from_f64(1e12), Dimension::Empty);
        assert_eq!(Dimension::from_f64(2.5), Dimension::Pixels(3));
    }

    #[test]
    fn test_width_change_derives_height() {
        let pair = on_width_change(Dimension::Pixels(1920), &sixteen_nine(), Dimension::Empty);
        assert_eq!(pair.width, Dimension::Pixels(1920));
        assert_eq!(pair.height, Dimension::Pixels(1080));
    }

    #[test]
    fn test_height_change_derives_width() {
        let pair = on_height_change(Dimension::Pixels(1080), &sixteen_nine(), Dimension::Empty);
        assert_eq!(pair.width, Dimension::Pixels(1920));
    }

    #[test]
    fn test_non_numeric_width_keeps_height() {
        let pair = on_width_change(
            Dimension::parse("wide"),
            &sixteen_nine(),
            Dimension::Pixels(720),
        );
        assert_eq!(pair.width, Dimension::Empty);
        assert_eq!(pair.height, Dimension::Pixels(720));
    }

    #[test]
    fn test_free_ratio_does_not_link() {
        let pair = on_width_change(Dimension::Pixels(500), &AspectRatio::free(), Dimension::Pixels(20));
        assert_eq!(pair.height, Dimension::Pixels(20));
    }

    #[test]
    fn test_ratio_change_recomputes_from_width() {
        let current = DimensionPair {
            width: Dimension::Pixels(1200),
            height: Dimension::Pixels(1),
        };
        let pair = on_ratio_change(&AspectRatio::new("4:3", 4.0 / 3.0), current);
        assert_eq!(pair.height, Dimension::Pixels(900));

        let unlinked = on_ratio_change(&AspectRatio::free(), pair);
        assert_eq!(unlinked, pair);
    }

    #[test]
    fn test_ratio_change_without_width_keeps_pair() {
        let current = DimensionPair {
            width: Dimension::Empty,
            height: Dimension::Pixels(300),
        };
        assert_eq!(on_ratio_change(&sixteen_nine(), current), current);
    }

    #[test]
    fn test_width_roundtrip_within_tolerance() {
        for ratio in AspectRatio::presets().into_iter().skip(1) {
            let r = ratio.linked_value().unwrap();
            for w in [0u32, 1, 7, 99, 640, 1001, 1920, 3841, 7680] {
                let pair = on_width_change(Dimension::Pixels(w), &ratio, Dimension::Empty);
                let h = pair.height.pixels().unwrap();
                assert_eq!(h as f64, (w as f64 / r).round());

                let back = on_height_change(Dimension::Pixels(h), &ratio, Dimension::Empty);
                let w2 = back.width.pixels().unwrap() as f64;
                let tolerance = r / 2.0 + 1.0;
                assert!(
                    (w2 - w as f64).abs() <= tolerance,
                    "ratio {} width {} came back as {}",
                    ratio.label,
                    w,
                    w2
                );
            }
        }
    }

    #[test]
    fn test_constraint_links_only_when_enabled() {
        let mut constraint = DimensionConstraint {
            enabled: false,
            aspect_ratio: AspectRatio::new("1:1", 1.0),
            min_width: None,
            min_height: None,
        };
        constraint.set_min_width(Dimension::Pixels(400));
        assert_eq!(constraint.min_width, Some(400));
        assert_eq!(constraint.min_height, None);

        constraint.enabled = true;
        constraint.set_min_width(Dimension::Pixels(500));
        assert_eq!(constraint.min_height, Some(500));

        constraint.set_min_height(Dimension::Pixels(250));
        assert_eq!(constraint.min_width, Some(250));
    }

    #[test]
    fn test_constraint_ratio_switch() {
        let mut constraint = DimensionConstraint {
            enabled: true,
            aspect_ratio: AspectRatio::free(),
            min_width: Some(1600),
            min_height: Some(10),
        };
        constraint.set_aspect_ratio(sixteen_nine());
        assert_eq!(constraint.min_height, Some(900));
        assert_eq!(constraint.aspect_ratio.label, "16:9");

        constraint.set_aspect_ratio(AspectRatio::free());
        assert_eq!(constraint.min_width, Some(1600));
        assert_eq!(constraint.min_height, Some(900));
        constraint.set_min_height(Dimension::Pixels(50));
        assert_eq!(constraint.min_width, Some(1600));
    }

    #[test]
    fn test_canonicalize() {
        let mut constraint = DimensionConstraint {
            enabled: true,
            aspect_ratio: sixteen_nine(),
            min_width: Some(1280),
            min_height: Some(1),
        };
        assert!(!constraint.is_consistent());
        constraint.canonicalize();
        assert_eq!(constraint.min_height, Some(720));
        assert!(constraint.is_consistent());

        let mut height_only = DimensionConstraint {
            enabled: true,
            aspect_ratio: sixteen_nine(),
            min_width: None,
            min_height: Some(720),
        };
        height_only.canonicalize();
        assert_eq!(height_only.min_width, Some(1280));
    }

    #[test]
    fn test_dimension_serde_as_option() {
        let pair = DimensionPair {
            width: Dimension::Pixels(10),
            height: Dimension::Empty,
        };
        let json = serde_json::to_value(pair).unwrap();
        assert_eq!(json, serde_json::json!({"width": 10, "height": null}));
        let back: DimensionPair = serde_json::from_value(json).unwrap();
        assert_eq!(back, pair);
    }
}
