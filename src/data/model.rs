use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// SourceId – which image a pixel belongs to
// ---------------------------------------------------------------------------

/// Image identifier. Numeric ids sort numerically so `2 < 10`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceId {
    Integer(i64),
    Text(String),
}

impl PartialOrd for SourceId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SourceId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        match (self, other) {
            (SourceId::Integer(a), SourceId::Integer(b)) => a.cmp(b),
            (SourceId::Text(a), SourceId::Text(b)) => a.cmp(b),
            (SourceId::Integer(_), SourceId::Text(_)) => Ordering::Less,
            (SourceId::Text(_), SourceId::Integer(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceId::Integer(i) => write!(f, "{i}"),
            SourceId::Text(s) => write!(f, "{s}"),
        }
    }
}

impl SourceId {
    /// Integers when the text parses as one (`"3"` or `"3.0"`), otherwise
    /// kept as text.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if let Ok(i) = s.parse::<i64>() {
            return SourceId::Integer(i);
        }
        match s.parse::<f64>() {
            Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 => {
                SourceId::Integer(v as i64)
            }
            _ => SourceId::Text(s.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Label – expert annotation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    Cloudy,
    CloudFree,
    Unlabeled,
}

impl Label {
    /// Column order used by the percentage table: `[1, -1, 0]`.
    pub const REPORT_ORDER: [Label; 3] = [Label::Cloudy, Label::CloudFree, Label::Unlabeled];

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Label::Cloudy),
            -1 => Some(Label::CloudFree),
            0 => Some(Label::Unlabeled),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Label::Cloudy => 1,
            Label::CloudFree => -1,
            Label::Unlabeled => 0,
        }
    }

    /// Legend text, e.g. `Cloudy (label = 1)`.
    pub fn legend_text(self) -> &'static str {
        match self {
            Label::Cloudy => "Cloudy (label = 1)",
            Label::CloudFree => "Cloud-Free (label = -1)",
            Label::Unlabeled => "Unlabeled (label = 0)",
        }
    }

    /// Decode a label code read from row `row`, rejecting unknown values.
    pub fn decode(code: i64, row: usize) -> Result<Self, AnalysisError> {
        Label::from_code(code).ok_or(AnalysisError::InvalidLabel { row, value: code })
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ---------------------------------------------------------------------------
// Feature – the numeric columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    Ndai,
    Sd,
    Corr,
    AngleDf,
    AngleCf,
    AngleBf,
    AngleAf,
    AngleAn,
}

impl Feature {
    pub const ALL: [Feature; 8] = [
        Feature::Ndai,
        Feature::Sd,
        Feature::Corr,
        Feature::AngleDf,
        Feature::AngleCf,
        Feature::AngleBf,
        Feature::AngleAf,
        Feature::AngleAn,
    ];

    /// Column name in tabular inputs.
    pub fn column(self) -> &'static str {
        match self {
            Feature::Ndai => "NDAI",
            Feature::Sd => "SD",
            Feature::Corr => "CORR",
            Feature::AngleDf => "angle_DF",
            Feature::AngleCf => "angle_CF",
            Feature::AngleBf => "angle_BF",
            Feature::AngleAf => "angle_AF",
            Feature::AngleAn => "angle_AN",
        }
    }

    /// Human-readable name used in titles and axis labels.
    pub fn display_name(self) -> &'static str {
        match self {
            Feature::Ndai => "NDAI",
            Feature::Sd => "SD",
            Feature::Corr => "CORR",
            Feature::AngleDf => "Radiance angle DF",
            Feature::AngleCf => "Radiance angle CF",
            Feature::AngleBf => "Radiance angle BF",
            Feature::AngleAf => "Radiance angle AF",
            Feature::AngleAn => "Radiance angle AN",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column())
    }
}

/// Every column a tabular input must provide, in canonical order.
pub fn required_columns() -> Vec<&'static str> {
    let mut cols = vec!["source", "x", "y", "label"];
    cols.extend(Feature::ALL.iter().map(|f| f.column()));
    cols
}

// ---------------------------------------------------------------------------
// Observation – one labeled pixel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub source: SourceId,
    pub x: i64,
    pub y: i64,
    pub label: Label,
    /// Indexed by [`Feature::index`].
    pub features: [f64; 8],
}

impl Observation {
    pub fn feature(&self, feature: Feature) -> f64 {
        self.features[feature.index()]
    }
}

// ---------------------------------------------------------------------------
// PixelDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// All observations plus the sorted set of images they come from.
#[derive(Debug, Clone, Default)]
pub struct PixelDataset {
    pub observations: Vec<Observation>,
    sources: BTreeSet<SourceId>,
}

impl PixelDataset {
    pub fn from_observations(observations: Vec<Observation>) -> Self {
        let sources = observations.iter().map(|o| o.source.clone()).collect();
        PixelDataset {
            observations,
            sources,
        }
    }

    /// Append another dataset, e.g. when loading one file per image.
    pub fn extend(&mut self, other: PixelDataset) {
        self.sources.extend(other.sources);
        self.observations.extend(other.observations);
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Distinct sources in ascending order.
    pub fn sources(&self) -> impl ExactSizeIterator<Item = &SourceId> {
        self.sources.iter()
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Observations grouped by source, in ascending source order.
    pub fn by_source(&self) -> BTreeMap<&SourceId, Vec<&Observation>> {
        let mut groups: BTreeMap<&SourceId, Vec<&Observation>> = BTreeMap::new();
        for obs in &self.observations {
            groups.entry(&obs.source).or_default().push(obs);
        }
        groups
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn obs(source: i64, x: i64, y: i64, label: Label) -> Observation {
        Observation {
            source: SourceId::Integer(source),
            x,
            y,
            label,
            features: [0.0; 8],
        }
    }

    #[test]
    fn source_ids_sort_numerically_before_text() {
        let mut ids = vec![
            SourceId::parse("10"),
            SourceId::parse("b"),
            SourceId::parse("2"),
            SourceId::parse("a"),
        ];
        ids.sort();
        let shown: Vec<String> = ids.iter().map(|s| s.to_string()).collect();
        assert_eq!(shown, ["2", "10", "a", "b"]);
    }

    #[test]
    fn whole_float_text_is_an_integer_id() {
        assert_eq!(SourceId::parse("1.0"), SourceId::Integer(1));
        assert_eq!(SourceId::parse(" 12 "), SourceId::Integer(12));
        assert_eq!(SourceId::parse("1.7"), SourceId::Text("1.7".into()));
        assert_eq!(SourceId::parse("NaN"), SourceId::Text("NaN".into()));
    }

    #[test]
    fn label_codes_round_trip_and_reject_unknown() {
        for label in Label::REPORT_ORDER {
            assert_eq!(Label::from_code(label.code()), Some(label));
        }
        assert!(matches!(
            Label::decode(2, 7),
            Err(AnalysisError::InvalidLabel { row: 7, value: 2 })
        ));
    }

    #[test]
    fn feature_order_matches_index() {
        for (i, f) in Feature::ALL.iter().enumerate() {
            assert_eq!(f.index(), i);
        }
        assert_eq!(Feature::AngleAn.display_name(), "Radiance angle AN");
        assert_eq!(required_columns().len(), 12);
    }

    #[test]
    fn dataset_tracks_sorted_sources() {
        let mut ds = PixelDataset::from_observations(vec![
            obs(3, 0, 0, Label::Cloudy),
            obs(1, 0, 0, Label::CloudFree),
        ]);
        ds.extend(PixelDataset::from_observations(vec![obs(2, 1, 1, Label::Unlabeled)]));

        let sources: Vec<String> = ds.sources().map(|s| s.to_string()).collect();
        assert_eq!(sources, ["1", "2", "3"]);
        assert_eq!(ds.len(), 3);
        let groups = ds.by_source();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[&SourceId::Integer(3)].len(), 1);
    }
}
