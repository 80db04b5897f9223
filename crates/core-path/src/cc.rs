use crate::arena::PathRange;
use crate::pather::Pather;
use core_geom::Point;

pub type ComponentId = i32;

impl PathRange {
    /// Labels every reachable cell in the arena's range with a component id,
    /// via iterative flood-fill (explicit stack, no recursion). Assumes the
    /// pather's `neighbors` relation is symmetric; if it isn't, the
    /// resulting labeling is simply whatever the flood-fill visited, with no
    /// further guarantee.
    pub fn cc_map_all<P: Pather>(&mut self, p: &P) {
        self.begin_query();
        let mut next_id: ComponentId = 0;
        let mut stack = Vec::new();

        for start in self.range().iter() {
            let start_idx = self.node(start);
            if self.nodes[start_idx].cc != -1 {
                continue;
            }
            let id = next_id;
            next_id += 1;
            self.nodes[start_idx].cc = id;
            stack.push(start);
            while let Some(cur) = stack.pop() {
                for nb in p.neighbors(cur) {
                    if !self.range().contains(nb) {
                        continue;
                    }
                    let nb_idx = self.node(nb);
                    if self.nodes[nb_idx].cc == -1 {
                        self.nodes[nb_idx].cc = id;
                        stack.push(nb);
                    }
                }
            }
        }
    }

    /// The component id containing `p`, or `-1` if `p` is out of range or
    /// wasn't covered by the last [`PathRange::cc_map_all`] call.
    pub fn cc_map_at(&self, p: Point) -> ComponentId {
        match self.idx(p) {
            Some(i) if self.is_current(p) => self.nodes[i].cc,
            _ => -1,
        }
    }

    /// The set of points sharing `p`'s component, or empty if `p` itself
    /// isn't part of the last computation.
    pub fn cc_map(&self, p: Point) -> Vec<Point> {
        let id = self.cc_map_at(p);
        if id == -1 {
            return Vec::new();
        }
        self.range().iter().filter(|&q| self.cc_map_at(q) == id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_geom::Range;

    struct Walls(Vec<Point>);
    impl Pather for Walls {
        fn neighbors(&self, p: Point) -> Vec<Point> {
            [p.shift(1, 0), p.shift(-1, 0), p.shift(0, 1), p.shift(0, -1)]
                .into_iter()
                .filter(|q| !self.0.contains(q))
                .collect()
        }
    }

    #[test]
    fn symmetric_neighbors_give_consistent_components() {
        // A vertical wall at x=5 splits a 10x5 grid into two components.
        let walls: Vec<Point> = (0..5).map(|y| Point::new(5, y)).collect();
        let pather = Walls(walls);
        let mut pr = PathRange::new(Range::new(0, 0, 10, 5));
        pr.cc_map_all(&pather);
        assert_eq!(pr.cc_map_at(Point::new(0, 0)), pr.cc_map_at(Point::new(4, 4)));
        assert_ne!(pr.cc_map_at(Point::new(0, 0)), pr.cc_map_at(Point::new(9, 0)));
    }

    #[test]
    fn out_of_range_point_has_no_component() {
        let pather = Walls(Vec::new());
        let mut pr = PathRange::new(Range::new(0, 0, 5, 5));
        pr.cc_map_all(&pather);
        assert_eq!(pr.cc_map_at(Point::new(50, 50)), -1);
    }
}
