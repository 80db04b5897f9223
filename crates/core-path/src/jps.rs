use crate::arena::PathRange;
use crate::pather::JpsPather;
use core_geom::{Point, Range};

const ORTHOGONAL: [Point; 4] =
    [Point::new(1, 0), Point::new(-1, 0), Point::new(0, 1), Point::new(0, -1)];
const DIAGONAL: [Point; 4] =
    [Point::new(1, 1), Point::new(1, -1), Point::new(-1, 1), Point::new(-1, -1)];

fn heuristic(diags: bool, a: Point, b: Point) -> i32 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    if diags {
        dx.max(dy)
    } else {
        dx + dy
    }
}

/// Diagonal movement may not cut through two blocking orthogonal cells: at
/// least one of the two orthogonal steps adjacent to a diagonal move must be
/// passable.
fn diagonal_allowed<P: JpsPather>(p: &P, from: Point, dir: Point) -> bool {
    p.passable(from.shift(dir.x, 0)) || p.passable(from.shift(0, dir.y))
}

/// Walks from `from` in direction `dir` until it finds the goal, a forced
/// neighbor, or a blocked/out-of-range cell. Returns the jump point and the
/// number of steps taken.
fn jump<P: JpsPather>(p: &P, range: Range, diags: bool, from: Point, dir: Point, goal: Point) -> Option<(Point, i32)> {
    let mut cur = from;
    let mut steps = 0;
    loop {
        if dir.x != 0 && dir.y != 0 && !diagonal_allowed(p, cur, dir) {
            return None;
        }
        let next = cur.shift(dir.x, dir.y);
        if !range.contains(next) || !p.passable(next) {
            return None;
        }
        cur = next;
        steps += 1;
        if cur == goal {
            return Some((cur, steps));
        }

        if dir.x != 0 && dir.y != 0 {
            let forced = (p.passable(cur.shift(-dir.x, 0)) && !p.passable(cur.shift(-dir.x, -dir.y)))
                || (p.passable(cur.shift(0, -dir.y)) && !p.passable(cur.shift(-dir.x, -dir.y)));
            if forced {
                return Some((cur, steps));
            }
            if jump(p, range, diags, cur, Point::new(dir.x, 0), goal).is_some()
                || jump(p, range, diags, cur, Point::new(0, dir.y), goal).is_some()
            {
                return Some((cur, steps));
            }
        } else if dir.x != 0 {
            let forced = (p.passable(cur.shift(0, 1)) && !p.passable(cur.shift(-dir.x, 1)))
                || (p.passable(cur.shift(0, -1)) && !p.passable(cur.shift(-dir.x, -1)));
            if forced {
                return Some((cur, steps));
            }
        } else {
            let forced = (p.passable(cur.shift(1, 0)) && !p.passable(cur.shift(1, -dir.y)))
                || (p.passable(cur.shift(-1, 0)) && !p.passable(cur.shift(-1, -dir.y)));
            if forced {
                return Some((cur, steps));
            }
        }
    }
}

fn inflate(from: Point, to: Point, diags: bool, p: &impl JpsPather) -> Vec<Point> {
    if from == to {
        return Vec::new();
    }
    let dx = (to.x - from.x).signum();
    let dy = (to.y - from.y).signum();
    let mut out = Vec::new();
    if dx != 0 && dy != 0 {
        let steps = (to.x - from.x).abs();
        if steps == 1 && !diags {
            let via_a = Point::new(from.x + dx, from.y);
            let via_b = Point::new(from.x, from.y + dy);
            out.push(if p.passable(via_a) { via_a } else { via_b });
            out.push(to);
            return out;
        }
        let mut cur = from;
        for _ in 0..steps {
            cur = cur.shift(dx, dy);
            out.push(cur);
        }
    } else {
        let steps = (to.x - from.x).abs() + (to.y - from.y).abs();
        let mut cur = from;
        for _ in 0..steps {
            cur = cur.shift(dx, dy);
            out.push(cur);
        }
    }
    out
}

impl PathRange {
    /// Jump point search over a uniform-cost grid. `diags` enables 8-way
    /// movement; when disabled, a single diagonal edge may still be taken
    /// (never a diagonal jump chain) at cost 2, and only when at least one
    /// adjoining orthogonal cell is passable.
    pub fn jps<P: JpsPather>(&mut self, p: &P, diags: bool, from: Point, to: Point) -> Option<Vec<Point>> {
        let range = self.range();
        if !range.contains(from) || !range.contains(to) || !p.passable(from) || !p.passable(to) {
            return None;
        }
        self.begin_query();

        let from_idx = self.node(from);
        self.nodes[from_idx].cost = 0;
        self.nodes[from_idx].priority = heuristic(diags, from, to);
        self.nodes[from_idx].parent = from;
        self.nodes[from_idx].open = true;
        let seq = self.seq();
        let pr = self.nodes[from_idx].priority;
        self.heap.push(from_idx, pr, seq, &mut self.nodes);

        while let Some(cur_idx) = self.heap.pop(&mut self.nodes) {
            let cur_p = self.point_of(cur_idx);
            if cur_p == to {
                return Some(self.reconstruct_inflated(cur_idx, diags, p));
            }
            self.nodes[cur_idx].open = false;
            self.nodes[cur_idx].closed = true;
            let g = self.nodes[cur_idx].cost;

            for &dir in ORTHOGONAL.iter() {
                if let Some((jp, steps)) = jump(p, range, diags, cur_p, dir, to) {
                    self.relax(cur_p, jp, g + steps, to, diags);
                }
            }
            if diags {
                for &dir in DIAGONAL.iter() {
                    if diagonal_allowed(p, cur_p, dir) {
                        if let Some((jp, steps)) = jump(p, range, diags, cur_p, dir, to) {
                            self.relax(cur_p, jp, g + steps, to, diags);
                        }
                    }
                }
            } else {
                for &dir in DIAGONAL.iter() {
                    let nb = cur_p.shift(dir.x, dir.y);
                    if range.contains(nb) && p.passable(nb) && diagonal_allowed(p, cur_p, dir) {
                        self.relax(cur_p, nb, g + 2, to, diags);
                    }
                }
            }
        }
        None
    }

    fn relax(&mut self, from: Point, to_node: Point, new_g: i32, goal: Point, diags: bool) {
        let idx = self.node(to_node);
        if new_g < self.nodes[idx].cost {
            self.nodes[idx].cost = new_g;
            self.nodes[idx].parent = from;
            let f = new_g + heuristic(diags, to_node, goal);
            self.nodes[idx].priority = f;
            let seq = self.seq();
            if self.nodes[idx].open {
                self.heap.decrease(idx, f, seq, &mut self.nodes);
            } else {
                self.nodes[idx].open = true;
                self.nodes[idx].closed = false;
                self.heap.push(idx, f, seq, &mut self.nodes);
            }
        }
    }

    fn reconstruct_inflated<P: JpsPather>(&mut self, goal_idx: usize, diags: bool, p: &P) -> Vec<Point> {
        let sparse = self.reconstruct(goal_idx);
        if sparse.is_empty() {
            return sparse;
        }
        let mut out = vec![sparse[0]];
        for w in sparse.windows(2) {
            out.extend(inflate(w[0], w[1], diags, p));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pather::Pather;
    use core_geom::Range;

    struct Walled {
        walls: Vec<Point>,
    }
    impl JpsPather for Walled {
        fn passable(&self, p: Point) -> bool {
            !self.walls.contains(&p)
        }
    }
    impl Pather for Walled {
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
        fn estimation(&self, from: Point, to: Point) -> i32 {
            (from.x - to.x).abs().max((from.y - to.y).abs())
        }
    }

    fn s4_walls() -> Vec<Point> {
        // "x==20 and y!=0", "x==40 and y!=23", "x==60 and y!=0"
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
    fn jps_matches_astar_length_with_diagonals() {
        let pather = Walled { walls: s4_walls() };
        let mut pr = PathRange::new(Range::new(0, 0, 80, 24));
        let jps_path = pr.jps(&pather, true, Point::new(2, 2), Point::new(70, 20)).unwrap();

        let mut pr2 = PathRange::new(Range::new(0, 0, 80, 24));
        let astar_path = pr2.astar(&pather, Point::new(2, 2), Point::new(70, 20)).unwrap();
        assert_eq!(jps_path.len(), astar_path.len());
        assert_eq!(jps_path.first(), Some(&Point::new(2, 2)));
        assert_eq!(jps_path.last(), Some(&Point::new(70, 20)));
    }

    /// Same reachability as `Walled`, but costed the way `diags=false` JPS
    /// costs movement: 1 per orthogonal step, 2 per single (non-chained)
    /// diagonal step — the A* counterpart of the graph JPS actually
    /// searches when diagonal jump-chaining is disabled.
    struct WalledSingleDiagCost {
        walls: Vec<Point>,
    }
    impl JpsPather for WalledSingleDiagCost {
        fn passable(&self, p: Point) -> bool {
            !self.walls.contains(&p)
        }
    }
    impl Pather for WalledSingleDiagCost {
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

    #[test]
    fn jps_without_diagonals_matches_astar_length() {
        let walls = s4_walls();
        let pather = Walled { walls: walls.clone() };
        let mut pr = PathRange::new(Range::new(0, 0, 80, 24));
        let path = pr.jps(&pather, false, Point::new(2, 2), Point::new(70, 20)).unwrap();

        let cost_pather = WalledSingleDiagCost { walls };
        let mut pr2 = PathRange::new(Range::new(0, 0, 80, 24));
        let astar_path = pr2.astar(&cost_pather, Point::new(2, 2), Point::new(70, 20)).unwrap();

        assert_eq!(path.len(), astar_path.len());
        assert_eq!(path.first(), Some(&Point::new(2, 2)));
        assert_eq!(path.last(), Some(&Point::new(70, 20)));
    }

    #[test]
    fn unreachable_goal_yields_no_path() {
        let pather = Walled { walls: (0..24).map(|y| Point::new(10, y)).collect() };
        let mut pr = PathRange::new(Range::new(0, 0, 20, 24));
        assert!(pr.jps(&pather, true, Point::new(0, 0), Point::new(15, 0)).is_none());
    }
}
