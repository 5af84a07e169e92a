//! Named scoring axes and the value ranges they are reported in.
//!
//! Axis names form an open vocabulary: the heuristic scorers and the LLM
//! scorer each declare their own set, and callers may introduce more. The
//! well-known names are exposed as associated constants.

use std::borrow::{Borrow, Cow};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One named quality dimension along which an item is scored.
///
/// # Examples
///
/// ```rust
/// use photorank_core::Axis;
///
/// let custom = Axis::new("colourfulness");
/// assert_eq!(custom.as_str(), "colourfulness");
/// assert_eq!(Axis::AESTHETIC.as_str(), "aesthetic");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Axis(Cow<'static, str>);

impl Axis {
    /// Composition and overall visual appeal.
    pub const AESTHETIC: Self = Self::from_static("aesthetic");
    /// Sharpness, exposure and other measurable image quality.
    pub const TECHNICAL: Self = Self::from_static("technical");
    /// Strength of the dominant facial emotion.
    pub const SENTIMENT: Self = Self::from_static("sentiment");
    /// Dissimilarity from known visual trends.
    pub const NOVELTY: Self = Self::from_static("novelty");
    /// How recently the photo was taken.
    pub const RECENCY: Self = Self::from_static("recency");
    /// Whether the owner marked the photo as a favourite.
    pub const FAVORITE: Self = Self::from_static("favorite");
    /// Meaning, storytelling and cultural relevance of the content.
    pub const SEMANTIC: Self = Self::from_static("semantic");
    /// Social-media appeal and shareability.
    pub const TRENDY_VIBE: Self = Self::from_static("trendy_vibe");
    /// Quality of the contextual data attached to the photo.
    pub const METADATA: Self = Self::from_static("metadata");
    /// Visible action or movement; zero when none is shown.
    pub const ACTIVITY: Self = Self::from_static("activity");
    /// A depicted accomplishment; zero when none is shown.
    pub const ACHIEVEMENT: Self = Self::from_static("achievement");
    /// A demonstrated skill or craft; zero when none is shown.
    pub const TALENT: Self = Self::from_static("talent");

    /// Axes produced by the local heuristic scorers.
    pub const HEURISTIC_VOCABULARY: [Self; 6] = [
        Self::AESTHETIC,
        Self::TECHNICAL,
        Self::SENTIMENT,
        Self::NOVELTY,
        Self::RECENCY,
        Self::FAVORITE,
    ];

    /// Axes requested from the multimodal LLM scorer.
    pub const LLM_VOCABULARY: [Self; 9] = [
        Self::TECHNICAL,
        Self::AESTHETIC,
        Self::SEMANTIC,
        Self::NOVELTY,
        Self::TRENDY_VIBE,
        Self::METADATA,
        Self::ACTIVITY,
        Self::ACHIEVEMENT,
        Self::TALENT,
    ];

    /// Build an axis from a static name without allocating.
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Build an axis from any string.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Return the axis name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Axis {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Axis {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Axis {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Inclusive range an axis value is reported in.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisRange {
    min: f64,
    max: f64,
}

impl AxisRange {
    /// The `0.0..=1.0` range used by heuristic scorers.
    pub const UNIT: Self = Self { min: 0.0, max: 1.0 };
    /// The `0.0..=10.0` range used by the LLM rubric.
    pub const DECILE: Self = Self {
        min: 0.0,
        max: 10.0,
    };

    /// Lower bound.
    #[must_use]
    pub const fn min(self) -> f64 {
        self.min
    }

    /// Upper bound.
    #[must_use]
    pub const fn max(self) -> f64 {
        self.max
    }

    /// Clamp `value` into the range, mapping non-finite values to the lower
    /// bound.
    #[must_use]
    pub fn clamp(self, value: f64) -> f64 {
        if value.is_finite() {
            value.clamp(self.min, self.max)
        } else {
            self.min
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use rstest::rstest;

    #[rstest]
    fn owned_and_static_axes_compare_equal() {
        assert_eq!(Axis::new("aesthetic"), Axis::AESTHETIC);
    }

    #[rstest]
    fn maps_accept_str_lookups() {
        let map = BTreeMap::from([(Axis::NOVELTY, 1_u8)]);
        assert_eq!(map.get("novelty"), Some(&1));
    }

    #[rstest]
    #[case(AxisRange::UNIT, 3.0, 1.0)]
    #[case(AxisRange::DECILE, 11.5, 10.0)]
    #[case(AxisRange::DECILE, -2.0, 0.0)]
    #[case(AxisRange::UNIT, f64::NAN, 0.0)]
    fn range_clamps(#[case] range: AxisRange, #[case] value: f64, #[case] expected: f64) {
        assert_eq!(range.clamp(value), expected);
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn axis_serialises_as_plain_string() {
        let json = serde_json::to_string(&Axis::TRENDY_VIBE).expect("serialise axis");
        assert_eq!(json, "\"trendy_vibe\"");
        let parsed: Axis = serde_json::from_str("\"talent\"").expect("deserialise axis");
        assert_eq!(parsed, Axis::TALENT);
    }
}
