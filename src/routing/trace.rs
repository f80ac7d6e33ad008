use serde_json::json;

use crate::error::RoutingError;
use crate::geometry::{Point, Rect};

use super::types::{Candidate, CandidateKind, RoutedPath};

#[derive(Clone, Debug, PartialEq)]
pub struct TraceEntry {
    pub index: usize,
    pub kind: CandidateKind,
    pub points: Vec<Point>,
    pub obstructions: usize,
    /// Whether this candidate became the running best.
    pub improved: bool,
}

/// Record of one routing call: inputs, every candidate scored, and the result.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RouteTrace {
    pub start: Option<Point>,
    pub end: Option<Point>,
    pub obstacles: Vec<Rect>,
    pub entries: Vec<TraceEntry>,
    pub result: Option<RoutedPath>,
}

impl RouteTrace {
    pub(crate) fn new(start: Point, end: Point, obstacles: &[Rect]) -> Self {
        RouteTrace {
            start: Some(start),
            end: Some(end),
            obstacles: obstacles.to_vec(),
            entries: Vec::new(),
            result: None,
        }
    }

    pub(crate) fn record(&mut self, candidate: &Candidate, obstructions: usize, improved: bool) {
        self.entries.push(TraceEntry {
            index: self.entries.len(),
            kind: candidate.kind,
            points: candidate.points.clone(),
            obstructions,
            improved,
        });
    }

    /// Index of the entry that produced the final path, if it came from the
    /// candidate search.
    pub fn chosen_index(&self) -> Option<usize> {
        self.entries.iter().filter(|entry| entry.improved).map(|entry| entry.index).last()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let point_json = |p: &Point| json!({ "x": p.x, "y": p.y });

        let obstacles: Vec<serde_json::Value> = self
            .obstacles
            .iter()
            .map(|rect| {
                json!({
                    "min": { "x": rect.min_x, "y": rect.min_y },
                    "max": { "x": rect.max_x, "y": rect.max_y },
                })
            })
            .collect();

        let entries: Vec<serde_json::Value> = self
            .entries
            .iter()
            .map(|entry| {
                json!({
                    "index": entry.index,
                    "kind": format!("{:?}", entry.kind),
                    "points": entry.points.iter().map(point_json).collect::<Vec<_>>(),
                    "obstructions": entry.obstructions,
                    "improved": entry.improved,
                })
            })
            .collect();

        let result = self.result.as_ref().map(|routed| {
            json!({
                "kind": format!("{:?}", routed.kind),
                "points": routed.points().iter().map(point_json).collect::<Vec<_>>(),
                "obstructions": routed.obstructions,
                "candidates_evaluated": routed.candidates_evaluated,
            })
        });

        json!({
            "start": self.start.as_ref().map(point_json),
            "end": self.end.as_ref().map(point_json),
            "obstacles": obstacles,
            "candidates": entries,
            "chosen": self.chosen_index(),
            "result": result,
        })
    }

    pub fn to_json_pretty(&self) -> Result<String, RoutingError> {
        Ok(serde_json::to_string_pretty(&self.to_json())?)
    }
}
