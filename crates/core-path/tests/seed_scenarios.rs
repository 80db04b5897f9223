//! Integration coverage for the larger literal seed scenarios, exercised
//! only through the public API (no access to internal helpers the unit
//! tests in `src/` can reach).

use core_geom::{Point, Range};
use core_path::{JpsPather, Pather, PathRange};

const ORTHOGONAL: [Point; 4] =
    [Point::new(1, 0), Point::new(-1, 0), Point::new(0, 1), Point::new(0, -1)];
const DIAGONAL: [Point; 4] =
    [Point::new(1, 1), Point::new(1, -1), Point::new(-1, 1), Point::new(-1, -1)];

struct HorizontalOnly;
impl Pather for HorizontalOnly {
    fn neighbors(&self, p: Point) -> Vec<Point> {
        vec![p.shift(1, 0), p.shift(-1, 0)]
    }
    fn estimation(&self, from: Point, to: Point) -> i32 {
        (from.x - to.x).abs()
    }
}

#[test]
fn s2_astar_horizontal_only_10x5() {
    let mut pr = PathRange::new(Range::new(0, 0, 10, 5));
    let path = pr.astar(&HorizontalOnly, Point::new(0, 0), Point::new(4, 0)).unwrap();
    assert_eq!(path.len(), 5);
    assert!(pr.astar(&HorizontalOnly, Point::new(0, 0), Point::new(0, 1)).is_none());
}

struct RightUpDown;
impl Pather for RightUpDown {
    fn neighbors(&self, p: Point) -> Vec<Point> {
        vec![p.shift(1, 0), p.shift(0, 1), p.shift(0, -1)]
    }
    fn cost(&self, _from: Point, _to: Point) -> i32 {
        2
    }
}

#[test]
fn s3_bf_and_dijkstra_10x5_two_sources() {
    let mut pr = PathRange::new(Range::new(0, 0, 10, 5));
    let sources = [Point::new(2, 0), Point::new(2, 2)];

    let bf = pr.bf_map(&RightUpDown, &sources, 3);
    assert_eq!(bf.cost_at(Point::new(5, 0)), 3);
    assert_eq!(bf.cost_at(Point::new(0, 1)), 4);

    let dij = pr.dijkstra_map(&RightUpDown, &sources, 6);
    assert_eq!(dij.cost_at(Point::new(5, 0)), 6);
}

struct OpenField {
    walls: Vec<Point>,
}
impl core_path::JpsPather for OpenField {
    fn passable(&self, p: Point) -> bool {
        !self.walls.contains(&p)
    }
}

fn diagonal_allowed<P: JpsPather>(p: &P, from: Point, dir: Point) -> bool {
    p.passable(from.shift(dir.x, 0)) || p.passable(from.shift(0, dir.y))
}

/// Same reachability as [`OpenField`], but costed the way `diags=false` JPS
/// costs movement: 1 per orthogonal step, 2 per single diagonal step. This
/// is the A* counterpart of the graph JPS searches with diagonal jump
/// chaining disabled, used to check the two agree on path length.
struct OpenFieldSingleDiagCost {
    walls: Vec<Point>,
}
impl JpsPather for OpenFieldSingleDiagCost {
    fn passable(&self, p: Point) -> bool {
        !self.walls.contains(&p)
    }
}
impl Pather for OpenFieldSingleDiagCost {
    fn neighbors(&self, p: Point) -> Vec<Point> {
        let mut out: Vec<Point> =
            ORTHOGONAL.iter().map(|&d| p.shift(d.x, d.y)).filter(|q| self.passable(*q)).collect();
        for &d in DIAGONAL.iter() {
            let q = p.shift(d.x, d.y);
            if self.passable(q) && diagonal_allowed(self, p, d) {
                out.push(q);
            }
        }
        out
    }
    fn cost(&self, from: Point, to: Point) -> i32 {
        if (to.x - from.x).abs() == 1 && (to.y - from.y).abs() == 1 { 2 } else { 1 }
    }
    fn estimation(&self, from: Point, to: Point) -> i32 {
        (from.x - to.x).abs() + (from.y - to.y).abs()
    }
}

fn s4_walls() -> Vec<Point> {
    let mut w = Vec::new();
    for y in 0..24 {
        if y != 0 {
            w.push(Point::new(20, y));
        }
        if y != 23 {
            w.push(Point::new(40, y));
        }
        if y != 0 {
            w.push(Point::new(60, y));
        }
    }
    w
}

#[test]
fn s4_jps_80x24_finds_endpoints_without_diagonals() {
    let walls = s4_walls();
    let field = OpenField { walls: walls.clone() };
    let mut pr = PathRange::new(Range::new(0, 0, 80, 24));
    let path = pr.jps(&field, false, Point::new(2, 2), Point::new(70, 20)).unwrap();
    assert_eq!(path.first(), Some(&Point::new(2, 2)));
    assert_eq!(path.last(), Some(&Point::new(70, 20)));

    let cost_field = OpenFieldSingleDiagCost { walls };
    let mut pr2 = PathRange::new(Range::new(0, 0, 80, 24));
    let astar_path = pr2.astar(&cost_field, Point::new(2, 2), Point::new(70, 20)).unwrap();
    assert_eq!(path.len(), astar_path.len());
}
