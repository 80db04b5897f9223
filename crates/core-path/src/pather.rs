use core_geom::Point;

/// The capability a client supplies to drive pathfinding: what's reachable
/// from a point, and at what cost.
///
/// `cost` and `estimation` default to uniform-cost (1) and zero respectively
/// so a client that only needs breadth-first search or connected components
/// doesn't have to implement them. A* needs both to be meaningful;
/// `estimation` must never overestimate the true remaining cost or A*'s
/// optimality guarantee (§8 property 7) no longer holds.
pub trait Pather {
    fn neighbors(&self, p: Point) -> Vec<Point>;

    fn cost(&self, _from: Point, _to: Point) -> i32 {
        1
    }

    fn estimation(&self, _from: Point, _to: Point) -> i32 {
        0
    }
}

/// The capability jump point search drives: pure passability, independent of
/// cost — JPS assumes a uniform-cost grid (1 per orthogonal step, and either
/// 1 or 2 per diagonal step depending on `diags`, see [`crate::astar`]'s
/// sibling `jps` entry point).
pub trait JpsPather {
    fn passable(&self, p: Point) -> bool;
}
