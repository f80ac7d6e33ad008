use tracing::trace;

use crate::geometry::Point;
use crate::obstacles::ObstacleSet;

use super::types::{Candidate, CandidateKind, Path, RoutedPath};

/// Running best over the candidates evaluated so far.
#[derive(Clone, Debug, Default)]
pub(crate) struct Selection {
    best: Option<(Candidate, usize)>,
    evaluated: usize,
}

impl Selection {
    pub fn min_obstructions(&self) -> Option<usize> {
        self.best.as_ref().map(|(_, count)| *count)
    }

    /// Keeps `candidate` only if it beats the current best strictly, so the
    /// earlier candidate wins ties.
    fn offer(&mut self, candidate: Candidate, obstructions: usize) {
        self.evaluated += 1;
        if self.improves_on_best(obstructions) {
            self.best = Some((candidate, obstructions));
        }
    }

    fn improves_on_best(&self, obstructions: usize) -> bool {
        self.min_obstructions()
            .map_or(true, |current| obstructions < current)
    }

    fn is_clear(&self) -> bool {
        self.min_obstructions() == Some(0)
    }

    /// Clear candidate, else lowest count, else the direct line.
    pub fn into_routed(self, start: Point, end: Point, obstacles: &ObstacleSet) -> RoutedPath {
        let evaluated = self.evaluated;
        let (kind, points) = match self.best {
            Some((candidate, _)) => (candidate.kind, candidate.points),
            None => (CandidateKind::Direct, vec![start, end]),
        };
        let path = Path::collapse_duplicates(points);
        let obstructions = obstacles.obstruction_count(path.as_slice());
        RoutedPath {
            path,
            kind,
            obstructions,
            candidates_evaluated: evaluated,
        }
    }
}

/// Scores candidates in order and stops at the first clear one. `observe` sees
/// every evaluation: the candidate, its count and whether it became the best.
pub(crate) fn select_best<I, F>(candidates: I, obstacles: &ObstacleSet, mut observe: F) -> Selection
where
    I: IntoIterator<Item = Candidate>,
    F: FnMut(&Candidate, usize, bool),
{
    let mut selection = Selection::default();
    for candidate in candidates {
        let obstructions = obstacles.obstruction_count(&candidate.points);
        trace!(kind = ?candidate.kind, obstructions, "evaluated candidate");
        observe(&candidate, obstructions, selection.improves_on_best(obstructions));
        selection.offer(candidate, obstructions);
        if selection.is_clear() {
            break;
        }
    }
    selection
}
