use std::env;

use serde::{Deserialize, Serialize};

use crate::error::RoutingError;
use crate::geometry::Point;

/// Bend offsets tried around the midpoint, smallest detour first.
pub const DEFAULT_OFFSETS: [f64; 7] = [0.0, 20.0, -20.0, 40.0, -40.0, 60.0, -60.0];

/// Default clearance added around every obstacle.
pub const DEFAULT_PADDING: f64 = 10.0;

const PADDING_ENV: &str = "DETOUR_PADDING";
const TRACE_ENV: &str = "DETOUR_ROUTING_TRACE";

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(try_from = "RoutingConfigFields")]
pub struct RoutingConfig {
    pub(crate) padding: f64,
    pub(crate) offsets: Vec<f64>,
    pub(crate) double_bend: bool,
    pub(crate) trace: bool,
}

impl RoutingConfig {
    pub fn new(padding: f64, offsets: Vec<f64>) -> Result<Self, RoutingError> {
        let config = RoutingConfig {
            padding,
            offsets,
            ..RoutingConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `DETOUR_PADDING` and `DETOUR_ROUTING_TRACE`.
    pub fn from_env() -> Result<Self, RoutingError> {
        let mut config = RoutingConfig::default();
        if let Ok(raw) = env::var(PADDING_ENV) {
            config.padding = raw
                .trim()
                .parse::<f64>()
                .map_err(|e| RoutingError::InvalidConfig(format!("{PADDING_ENV}={raw:?}: {e}")))?;
        }
        if let Ok(raw) = env::var(TRACE_ENV) {
            config.trace = matches!(raw.trim(), "1" | "true" | "yes" | "on");
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_padding(mut self, padding: f64) -> Result<Self, RoutingError> {
        self.padding = padding;
        self.validate()?;
        Ok(self)
    }

    pub fn with_offsets(mut self, offsets: Vec<f64>) -> Result<Self, RoutingError> {
        self.offsets = offsets;
        self.validate()?;
        Ok(self)
    }

    pub fn with_double_bend(mut self, enabled: bool) -> Self {
        self.double_bend = enabled;
        self
    }

    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.trace = enabled;
        self
    }

    pub fn padding(&self) -> f64 {
        self.padding
    }

    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    pub fn double_bend(&self) -> bool {
        self.double_bend
    }

    pub fn trace(&self) -> bool {
        self.trace
    }

    fn validate(&self) -> Result<(), RoutingError> {
        if !self.padding.is_finite() || self.padding < 0.0 {
            return Err(RoutingError::InvalidConfig(format!(
                "padding must be a finite non-negative number, got {}",
                self.padding
            )));
        }
        if self.offsets.is_empty() {
            return Err(RoutingError::InvalidConfig("offset lattice is empty".to_string()));
        }
        if let Some(bad) = self.offsets.iter().find(|offset| !offset.is_finite()) {
            return Err(RoutingError::InvalidConfig(format!("offset {bad} is not finite")));
        }
        Ok(())
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        RoutingConfig {
            padding: DEFAULT_PADDING,
            offsets: DEFAULT_OFFSETS.to_vec(),
            double_bend: true,
            trace: false,
        }
    }
}

/// Unvalidated serde form of `RoutingConfig`; missing fields take the defaults.
#[derive(Deserialize)]
#[serde(default)]
struct RoutingConfigFields {
    padding: f64,
    offsets: Vec<f64>,
    double_bend: bool,
    trace: bool,
}

impl Default for RoutingConfigFields {
    fn default() -> Self {
        let RoutingConfig {
            padding,
            offsets,
            double_bend,
            trace,
        } = RoutingConfig::default();
        RoutingConfigFields {
            padding,
            offsets,
            double_bend,
            trace,
        }
    }
}

impl TryFrom<RoutingConfigFields> for RoutingConfig {
    type Error = RoutingError;

    fn try_from(fields: RoutingConfigFields) -> Result<Self, Self::Error> {
        let config = RoutingConfig {
            padding: fields.padding,
            offsets: fields.offsets,
            double_bend: fields.double_bend,
            trace: fields.trace,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Which stage of the candidate search produced a path.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum CandidateKind {
    Direct,
    HorizontalFirst,
    VerticalFirst,
    DoubleBend,
}

impl CandidateKind {
    pub fn bends(&self) -> usize {
        match self {
            CandidateKind::Direct => 0,
            CandidateKind::HorizontalFirst | CandidateKind::VerticalFirst => 1,
            CandidateKind::DoubleBend => 2,
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Candidate {
    pub kind: CandidateKind,
    pub points: Vec<Point>,
}

impl Candidate {
    pub fn new(kind: CandidateKind, points: Vec<Point>) -> Self {
        Candidate { kind, points }
    }

    pub fn direct(start: Point, end: Point) -> Self {
        Candidate::new(CandidateKind::Direct, vec![start, end])
    }
}

/// Polyline from the start anchor to the end anchor.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Path {
    pub points: Vec<Point>,
}

impl Path {
    pub fn new(points: Vec<Point>) -> Self {
        Path { points }
    }

    pub fn as_slice(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn start(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn end(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Interior points, excluding both anchors.
    pub fn bends(&self) -> &[Point] {
        if self.points.len() <= 2 {
            return &[];
        }
        &self.points[1..self.points.len() - 1]
    }

    /// Collapses consecutive duplicates, but never below two points so a
    /// coincident start and end still produce `[p, p]`.
    pub(crate) fn collapse_duplicates(points: Vec<Point>) -> Self {
        let (Some(&start), Some(&end)) = (points.first(), points.last()) else {
            return Path { points };
        };
        let mut collapsed: Vec<Point> = Vec::with_capacity(points.len());
        for point in points {
            if collapsed.last() != Some(&point) {
                collapsed.push(point);
            }
        }
        if collapsed.len() < 2 {
            return Path {
                points: vec![start, end],
            };
        }
        Path { points: collapsed }
    }
}

/// Outcome of routing one edge.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct RoutedPath {
    pub path: Path,
    pub kind: CandidateKind,
    /// Obstruction count of `path`; above zero means best effort.
    pub obstructions: usize,
    pub candidates_evaluated: usize,
}

impl RoutedPath {
    pub fn is_clear(&self) -> bool {
        self.obstructions == 0
    }

    pub fn points(&self) -> &[Point] {
        self.path.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = RoutingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.offsets().len(), 7);
        assert!(config.double_bend());
    }

    #[test]
    fn negative_padding_is_rejected() {
        assert!(matches!(
            RoutingConfig::default().with_padding(-1.0),
            Err(RoutingError::InvalidConfig(_))
        ));
        assert!(RoutingConfig::default().with_padding(0.0).is_ok());
    }

    #[test]
    fn empty_or_non_finite_lattice_is_rejected() {
        assert!(RoutingConfig::new(0.0, Vec::new()).is_err());
        assert!(RoutingConfig::new(0.0, vec![0.0, f64::NAN]).is_err());
        assert!(RoutingConfig::new(0.0, vec![0.0, 15.0]).is_ok());
    }

    #[test]
    fn deserializing_validates_the_config() {
        let config: RoutingConfig = serde_json::from_str(r#"{"padding": 4.0, "double_bend": false}"#).unwrap();
        assert_eq!(config.padding(), 4.0);
        assert_eq!(config.offsets(), &DEFAULT_OFFSETS);
        assert!(!config.double_bend());

        assert!(serde_json::from_str::<RoutingConfig>(r#"{"padding": -1.0}"#).is_err());
        let error = serde_json::from_str::<RoutingConfig>(r#"{"offsets": []}"#).unwrap_err();
        assert!(error.to_string().contains("offset lattice is empty"));

        let json = serde_json::to_string(&RoutingConfig::default()).unwrap();
        assert_eq!(serde_json::from_str::<RoutingConfig>(&json).unwrap(), RoutingConfig::default());
    }

    #[test]
    fn collapse_removes_consecutive_duplicates_only() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        let path = Path::collapse_duplicates(vec![a, a, b, b, a]);
        assert_eq!(path.points, vec![a, b, a]);
    }

    #[test]
    fn collapse_keeps_two_points_for_coincident_anchors() {
        let a = Point::new(3.0, 4.0);
        let path = Path::collapse_duplicates(vec![a, a, a]);
        assert_eq!(path.points, vec![a, a]);
        assert!(path.bends().is_empty());
    }
}
