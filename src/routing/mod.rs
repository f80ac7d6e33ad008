mod candidates;
mod edge_router;
mod selector;
mod trace;
mod types;

pub use candidates::{CandidateSource, LatticeCandidates};
pub use edge_router::{route, EdgeRouter};
pub use trace::{RouteTrace, TraceEntry};
pub use types::{Candidate, CandidateKind, Path, RoutedPath, RoutingConfig, DEFAULT_OFFSETS, DEFAULT_PADDING};
