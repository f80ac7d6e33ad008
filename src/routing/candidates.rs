use std::iter;

use crate::geometry::Point;

use super::types::{Candidate, CandidateKind, RoutingConfig};

/// Produces candidate polylines in priority order. The selector stops pulling
/// as soon as a clear candidate shows up, so implementations should be lazy.
pub trait CandidateSource {
    fn candidates<'a>(&'a self, start: Point, end: Point) -> Box<dyn Iterator<Item = Candidate> + 'a>;
}

/// Direct line, then single-bend and double-bend detours over a fixed offset
/// lattice.
#[derive(Clone, Debug, PartialEq)]
pub struct LatticeCandidates {
    offsets: Vec<f64>,
    double_bend: bool,
}

impl LatticeCandidates {
    pub fn new(offsets: Vec<f64>, double_bend: bool) -> Self {
        LatticeCandidates { offsets, double_bend }
    }

    pub fn from_config(config: &RoutingConfig) -> Self {
        LatticeCandidates::new(config.offsets().to_vec(), config.double_bend())
    }

    /// Upper bound on the number of candidates one call can produce.
    pub fn budget(&self) -> usize {
        let n = self.offsets.len();
        let double = if self.double_bend { n.pow(4) } else { 0 };
        1 + 2 * n * n + double
    }

    fn single_bends(&self, start: Point, end: Point) -> impl Iterator<Item = Candidate> + '_ {
        let mid_x = start.midpoint(&end).x;
        let offsets = &self.offsets;
        offsets.iter().flat_map(move |&dx| {
            offsets.iter().flat_map(move |&dy| {
                [
                    Candidate::new(
                        CandidateKind::HorizontalFirst,
                        vec![start, Point::new(mid_x + dx, start.y + dy), end],
                    ),
                    Candidate::new(
                        CandidateKind::VerticalFirst,
                        vec![start, Point::new(mid_x + dx, end.y + dy), end],
                    ),
                ]
            })
        })
    }

    fn double_bends(&self, start: Point, end: Point) -> impl Iterator<Item = Candidate> + '_ {
        let mid_y = start.midpoint(&end).y;
        let offsets = &self.offsets;
        offsets.iter().flat_map(move |&dx1| {
            offsets.iter().flat_map(move |&dy1| {
                offsets.iter().flat_map(move |&dx2| {
                    offsets.iter().map(move |&dy2| {
                        Candidate::new(
                            CandidateKind::DoubleBend,
                            vec![
                                start,
                                Point::new(start.x + dx1, mid_y + dy1),
                                Point::new(end.x + dx2, mid_y + dy2),
                                end,
                            ],
                        )
                    })
                })
            })
        })
    }
}

impl Default for LatticeCandidates {
    fn default() -> Self {
        LatticeCandidates::from_config(&RoutingConfig::default())
    }
}

impl CandidateSource for LatticeCandidates {
    fn candidates<'a>(&'a self, start: Point, end: Point) -> Box<dyn Iterator<Item = Candidate> + 'a> {
        let direct = iter::once(Candidate::direct(start, end));
        let single = self.single_bends(start, end);
        if self.double_bend {
            Box::new(direct.chain(single).chain(self.double_bends(start, end)))
        } else {
            Box::new(direct.chain(single))
        }
    }
}
