//! Per-axis scores and the read-only sets they are collected into.

use std::collections::BTreeMap;

use crate::{Axis, AxisRange};

/// A single axis value with its range and validity.
///
/// A valid zero means "not applicable"; an invalid score means the scorer
/// failed and the axis must not contribute to aggregation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisScore {
    value: f64,
    range: AxisRange,
    valid: bool,
}

impl AxisScore {
    /// Build a valid score, clamping `value` into `range`.
    #[must_use]
    pub fn new(value: f64, range: AxisRange) -> Self {
        Self {
            value: range.clamp(value),
            range,
            valid: true,
        }
    }

    /// Build a valid score on the unit range.
    #[must_use]
    pub fn unit(value: f64) -> Self {
        Self::new(value, AxisRange::UNIT)
    }

    /// A legitimate zero for content the axis does not apply to.
    #[must_use]
    pub const fn not_applicable(range: AxisRange) -> Self {
        Self {
            value: range.min(),
            range,
            valid: true,
        }
    }

    /// Marker for an axis whose scorer failed.
    #[must_use]
    pub const fn failed(range: AxisRange) -> Self {
        Self {
            value: range.min(),
            range,
            valid: false,
        }
    }

    /// Score value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Range the value is reported in.
    #[must_use]
    pub const fn range(&self) -> AxisRange {
        self.range
    }

    /// Whether the value may be aggregated.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }
}

/// The scores one scorer produced for one item.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreFragment {
    axes: Vec<(Axis, AxisScore)>,
    overall: Option<f64>,
}

impl ScoreFragment {
    /// Create an empty fragment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fragment holding a single axis.
    #[must_use]
    pub fn single(axis: Axis, score: AxisScore) -> Self {
        Self::new().with_axis(axis, score)
    }

    /// Add an axis while consuming `self`.
    #[must_use]
    pub fn with_axis(mut self, axis: Axis, score: AxisScore) -> Self {
        self.axes.push((axis, score));
        self
    }

    /// Attach a provider-supplied overall score.
    #[must_use]
    pub const fn with_overall(mut self, overall: f64) -> Self {
        self.overall = Some(overall);
        self
    }

    /// Axes carried by the fragment, in emission order.
    #[must_use]
    pub fn axes(&self) -> &[(Axis, AxisScore)] {
        &self.axes
    }

    /// Provider-supplied overall score, if any.
    #[must_use]
    pub const fn overall(&self) -> Option<f64> {
        self.overall
    }
}

/// All axis scores computed for one item in one ranking run.
///
/// Sets are assembled through [`ScoreSetBuilder`] and are read-only
/// afterwards; re-scoring an item produces a new set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreSet {
    axes: BTreeMap<Axis, AxisScore>,
    overall: Option<f64>,
}

impl ScoreSet {
    /// Start assembling a set.
    #[must_use]
    pub fn builder() -> ScoreSetBuilder {
        ScoreSetBuilder::default()
    }

    /// Look up an axis by name.
    #[must_use]
    pub fn get(&self, axis: &str) -> Option<&AxisScore> {
        self.axes.get(axis)
    }

    /// Iterate over every recorded axis, including failed ones.
    pub fn iter(&self) -> impl Iterator<Item = (&Axis, &AxisScore)> {
        self.axes.iter()
    }

    /// Iterate over axes that may be aggregated.
    pub fn valid_axes(&self) -> impl Iterator<Item = (&Axis, &AxisScore)> {
        self.axes.iter().filter(|(_, score)| score.is_valid())
    }

    /// Iterate over axes whose scorer failed.
    pub fn failed_axes(&self) -> impl Iterator<Item = &Axis> {
        self.axes
            .iter()
            .filter(|(_, score)| !score.is_valid())
            .map(|(axis, _)| axis)
    }

    /// Report whether at least one axis holds a usable value.
    #[must_use]
    pub fn has_valid_axis(&self) -> bool {
        self.axes.values().any(AxisScore::is_valid)
    }

    /// Provider-supplied overall score, if any scorer reported one.
    #[must_use]
    pub const fn overall(&self) -> Option<f64> {
        self.overall
    }

    /// Number of recorded axes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.axes.len()
    }

    /// Report whether no axis was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }
}

/// Collects fragments into a [`ScoreSet`].
///
/// Fragments are merged in the order scorers are configured. A valid score
/// replaces an earlier failure marker for the same axis but never another
/// valid score, and the first reported overall value wins.
#[derive(Debug, Clone, Default)]
pub struct ScoreSetBuilder {
    axes: BTreeMap<Axis, AxisScore>,
    overall: Option<f64>,
}

impl ScoreSetBuilder {
    /// Merge a scorer's fragment.
    pub fn merge(&mut self, fragment: ScoreFragment) -> &mut Self {
        let ScoreFragment { axes, overall } = fragment;
        for (axis, score) in axes {
            self.insert(axis, score);
        }
        if self.overall.is_none() {
            self.overall = overall.filter(|value| value.is_finite());
        }
        self
    }

    /// Record that `axis` could not be scored.
    pub fn mark_failed(&mut self, axis: Axis, range: AxisRange) -> &mut Self {
        self.insert(axis, AxisScore::failed(range));
        self
    }

    fn insert(&mut self, axis: Axis, score: AxisScore) {
        match self.axes.get(&axis) {
            Some(existing) if existing.is_valid() => {}
            _ => {
                self.axes.insert(axis, score);
            }
        }
    }

    /// Finish the set.
    #[must_use]
    pub fn build(&self) -> ScoreSet {
        ScoreSet {
            axes: self.axes.clone(),
            overall: self.overall,
        }
    }
}
