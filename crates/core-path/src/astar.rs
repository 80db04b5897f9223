use crate::arena::PathRange;
use crate::pather::Pather;
use core_geom::Point;

impl PathRange {
    /// Classic A*: `priority = cost + estimation`, ties broken by insertion
    /// order via the arena's shared sequence counter. A node already marked
    /// closed can be reopened if a cheaper path to it is found, which keeps
    /// A* correct for any admissible (but not necessarily consistent)
    /// heuristic.
    pub fn astar<P: Pather>(&mut self, p: &P, from: Point, to: Point) -> Option<Vec<Point>> {
        if !self.range().contains(from) || !self.range().contains(to) {
            return None;
        }
        self.begin_query();

        let from_idx = self.node(from);
        self.nodes[from_idx].cost = 0;
        self.nodes[from_idx].priority = p.estimation(from, to);
        self.nodes[from_idx].parent = from;
        self.nodes[from_idx].open = true;
        let seq = self.seq();
        let priority = self.nodes[from_idx].priority;
        self.heap.push(from_idx, priority, seq, &mut self.nodes);

        while let Some(cur_idx) = self.heap.pop(&mut self.nodes) {
            let cur_p = self.point_of(cur_idx);
            if cur_p == to {
                return Some(self.reconstruct(cur_idx));
            }
            self.nodes[cur_idx].open = false;
            self.nodes[cur_idx].closed = true;
            let g = self.nodes[cur_idx].cost;

            for nb in p.neighbors(cur_p) {
                if !self.range().contains(nb) {
                    continue;
                }
                let step = p.cost(cur_p, nb);
                let nb_idx = self.node(nb);
                let new_g = g + step;
                if new_g < self.nodes[nb_idx].cost {
                    self.nodes[nb_idx].cost = new_g;
                    self.nodes[nb_idx].parent = cur_p;
                    let f = new_g + p.estimation(nb, to);
                    self.nodes[nb_idx].priority = f;
                    let seq = self.seq();
                    if self.nodes[nb_idx].open {
                        self.heap.decrease(nb_idx, f, seq, &mut self.nodes);
                    } else {
                        self.nodes[nb_idx].open = true;
                        self.nodes[nb_idx].closed = false;
                        self.heap.push(nb_idx, f, seq, &mut self.nodes);
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_geom::Range;

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
    fn horizontal_only_path_length_and_unreachable() {
        // Seed scenario S2.
        let mut pr = PathRange::new(Range::new(0, 0, 10, 5));
        let path = pr.astar(&HorizontalOnly, Point::new(0, 0), Point::new(4, 0)).unwrap();
        assert_eq!(path.len(), 5);
        assert!(pr.astar(&HorizontalOnly, Point::new(0, 0), Point::new(0, 1)).is_none());
    }

    struct OpenGrid;
    impl Pather for OpenGrid {
        fn neighbors(&self, p: Point) -> Vec<Point> {
            vec![p.shift(1, 0), p.shift(-1, 0), p.shift(0, 1), p.shift(0, -1)]
        }
        fn estimation(&self, from: Point, to: Point) -> i32 {
            (from.x - to.x).abs() + (from.y - to.y).abs()
        }
    }

    #[test]
    fn optimal_path_cost_matches_manhattan_distance() {
        let mut pr = PathRange::new(Range::new(0, 0, 20, 20));
        let path = pr.astar(&OpenGrid, Point::new(0, 0), Point::new(5, 5)).unwrap();
        assert_eq!(path.len() as i32 - 1, 10);
    }

    #[test]
    fn out_of_range_endpoint_yields_no_path() {
        let mut pr = PathRange::new(Range::new(0, 0, 5, 5));
        assert!(pr.astar(&OpenGrid, Point::new(0, 0), Point::new(50, 50)).is_none());
    }
}
