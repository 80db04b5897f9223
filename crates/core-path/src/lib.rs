//! Pathfinding over client-supplied grids: A*, jump point search, Dijkstra
//! and breadth-first distance maps, and connected components.
//!
//! All algorithms share one arena ([`arena::PathRange`]) keyed by a
//! generation tag, so repeated queries over the same rectangular range never
//! allocate a fresh per-point map: a query bumps the arena's generation
//! counter once, and any node whose stored generation doesn't match the
//! current one is treated as freshly initialized the first time it's
//! touched.

mod arena;
mod astar;
mod cc;
mod distmap;
mod heap;
mod jps;
mod pather;

pub use arena::PathRange;
pub use cc::ComponentId;
pub use distmap::DistanceMap;
pub use pather::{JpsPather, Pather};

/// Result of a pathfinding query: the ordered list of points from source to
/// destination inclusive, or `None` if no path exists (including when either
/// endpoint falls outside the arena's range).
pub type Path = Vec<core_geom::Point>;
