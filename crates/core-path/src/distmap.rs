use crate::arena::PathRange;
use crate::pather::Pather;
use core_geom::Point;
use std::collections::VecDeque;

/// Shortest-cost distances from a set of sources, up to a cost ceiling.
/// Produced by [`PathRange::dijkstra_map`] (general cost) or
/// [`PathRange::bf_map`] (uniform cost 1, computed with a FIFO queue instead
/// of a heap).
pub struct DistanceMap {
    max_cost: i32,
    /// Visited nodes in increasing cost order.
    visited: Vec<(Point, i32)>,
}

impl DistanceMap {
    /// Cost to reach `p`, or `max_cost + 1` if `p` was unreachable or wasn't
    /// part of the query's range.
    pub fn cost_at(&self, p: Point) -> i32 {
        self.visited.iter().find(|&&(q, _)| q == p).map(|&(_, c)| c).unwrap_or(self.max_cost + 1)
    }

    pub fn visited(&self) -> &[(Point, i32)] {
        &self.visited
    }
}

impl PathRange {
    /// Dijkstra map: shortest cost from any of `sources`, using the
    /// pather's general `cost` function, visiting nodes in increasing-cost
    /// order via the shared indexed heap.
    pub fn dijkstra_map<P: Pather>(&mut self, p: &P, sources: &[Point], max_cost: i32) -> DistanceMap {
        self.begin_query();
        let mut visited = Vec::new();

        for &src in sources {
            if !self.range().contains(src) {
                continue;
            }
            let idx = self.node(src);
            if self.nodes[idx].cost > 0 {
                self.nodes[idx].cost = 0;
                self.nodes[idx].open = true;
                let seq = self.seq();
                self.heap.push(idx, 0, seq, &mut self.nodes);
            }
        }

        while let Some(cur_idx) = self.heap.pop(&mut self.nodes) {
            let g = self.nodes[cur_idx].cost;
            if g > max_cost {
                continue;
            }
            self.nodes[cur_idx].open = false;
            self.nodes[cur_idx].closed = true;
            let cur_p = self.point_of(cur_idx);
            visited.push((cur_p, g));

            for nb in p.neighbors(cur_p) {
                if !self.range().contains(nb) {
                    continue;
                }
                let step = p.cost(cur_p, nb);
                let new_g = g + step;
                if new_g > max_cost {
                    continue;
                }
                let nb_idx = self.node(nb);
                if new_g < self.nodes[nb_idx].cost {
                    self.nodes[nb_idx].cost = new_g;
                    self.nodes[nb_idx].parent = cur_p;
                    let seq = self.seq();
                    if self.nodes[nb_idx].open {
                        self.heap.decrease(nb_idx, new_g, seq, &mut self.nodes);
                    } else {
                        self.nodes[nb_idx].open = true;
                        self.heap.push(nb_idx, new_g, seq, &mut self.nodes);
                    }
                }
            }
        }

        visited.sort_by_key(|&(_, c)| c);
        DistanceMap { max_cost, visited }
    }

    /// Breadth-first map: identical contract to [`PathRange::dijkstra_map`]
    /// but assumes every edge costs 1, letting a FIFO ring replace the heap
    /// for an O(n) rather than O(n log n) sweep.
    pub fn bf_map<P: Pather>(&mut self, p: &P, sources: &[Point], max_cost: i32) -> DistanceMap {
        self.begin_query();
        let mut visited = Vec::new();
        let mut queue: VecDeque<usize> = VecDeque::new();

        for &src in sources {
            if !self.range().contains(src) {
                continue;
            }
            let idx = self.node(src);
            if self.nodes[idx].cost > 0 {
                self.nodes[idx].cost = 0;
                queue.push_back(idx);
            }
        }

        while let Some(cur_idx) = queue.pop_front() {
            let g = self.nodes[cur_idx].cost;
            if g > max_cost {
                continue;
            }
            let cur_p = self.point_of(cur_idx);
            visited.push((cur_p, g));

            for nb in p.neighbors(cur_p) {
                if !self.range().contains(nb) {
                    continue;
                }
                let nb_idx = self.node(nb);
                if g + 1 < self.nodes[nb_idx].cost {
                    self.nodes[nb_idx].cost = g + 1;
                    self.nodes[nb_idx].parent = cur_p;
                    if g + 1 <= max_cost {
                        queue.push_back(nb_idx);
                    }
                }
            }
        }

        visited.sort_by_key(|&(_, c)| c);
        DistanceMap { max_cost, visited }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_geom::Range;

    /// Can move right, up, or down, but never left — enough asymmetry to
    /// make some cells unreachable from a source that is "ahead" of them.
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
    fn bf_and_dijkstra_seed_scenario_s3() {
        let mut pr = PathRange::new(Range::new(0, 0, 10, 5));
        let sources = [Point::new(2, 0), Point::new(2, 2)];

        let bf = pr.bf_map(&RightUpDown, &sources, 3);
        assert_eq!(bf.cost_at(Point::new(5, 0)), 3);
        assert_eq!(bf.cost_at(Point::new(0, 1)), 4);

        let dij = pr.dijkstra_map(&RightUpDown, &sources, 6);
        assert_eq!(dij.cost_at(Point::new(5, 0)), 6);
    }

    #[test]
    fn bf_matches_dijkstra_under_uniform_cost() {
        struct Uniform;
        impl Pather for Uniform {
            fn neighbors(&self, p: Point) -> Vec<Point> {
                vec![p.shift(1, 0), p.shift(-1, 0), p.shift(0, 1), p.shift(0, -1)]
            }
        }
        let mut pr = PathRange::new(Range::new(0, 0, 8, 8));
        let bf = pr.bf_map(&Uniform, &[Point::new(0, 0)], 10);
        let dij = pr.dijkstra_map(&Uniform, &[Point::new(0, 0)], 10);
        for p in Range::new(0, 0, 8, 8).iter() {
            assert_eq!(bf.cost_at(p), dij.cost_at(p));
        }
    }
}
