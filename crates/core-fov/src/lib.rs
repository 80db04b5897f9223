//! Field of view: symmetric-ray light propagation from one or more sources.
//!
//! Shares the arena + generation-tag discipline used by `core-path`'s
//! pathfinding arenas: one [`Fov`] instance can serve many queries over the
//! same rectangular range without reallocating per call.

use core_geom::{Point, Range};

/// The capability a client supplies to drive FOV propagation.
///
/// `cost(src, from, to)` must be symmetric (`cost(s, a, b) == cost(s, b,
/// a)`) for [`Fov::vision_map`] to produce symmetric visibility (§8 property
/// 11). The documented convention for ordinary terrain is `cost(src, src,
/// q) == 1`.
pub trait Lighter {
    fn cost(&self, src: Point, from: Point, to: Point) -> i32;
    fn max_cost(&self, src: Point) -> i32;
}

#[derive(Clone, Copy)]
struct Node {
    cost: i32,
    parent: Point,
    gen: u32,
}

impl Node {
    fn fresh(p: Point, gen: u32) -> Self {
        Node { cost: i32::MAX, parent: p, gen }
    }
}

pub struct Fov {
    range: Range,
    nodes: Vec<Node>,
    current_gen: u32,
}

/// The result of a [`Fov::vision_map`] or [`Fov::light_map`] call: every lit
/// point with its accumulated cost.
pub struct VisionMap {
    max_cost: i32,
    lit: Vec<(Point, i32)>,
}

impl VisionMap {
    pub fn cost_at(&self, p: Point) -> Option<i32> {
        self.lit.iter().find(|&&(q, _)| q == p).map(|&(_, c)| c)
    }

    pub fn is_lit(&self, p: Point) -> bool {
        self.cost_at(p).is_some()
    }

    pub fn lit(&self) -> &[(Point, i32)] {
        &self.lit
    }

    pub fn max_cost(&self) -> i32 {
        self.max_cost
    }
}

impl Fov {
    pub fn new(range: Range) -> Self {
        let len = (range.width().max(0) * range.height().max(0)) as usize;
        Fov { range, nodes: vec![Node::fresh(range.min(), 0); len], current_gen: 0 }
    }

    pub fn range(&self) -> Range {
        self.range
    }

    pub fn set_range(&mut self, range: Range) {
        if range.size() == self.range.size() {
            self.range = range;
            return;
        }
        let len = (range.width().max(0) * range.height().max(0)) as usize;
        self.range = range;
        self.nodes = vec![Node::fresh(range.min(), 0); len];
        self.current_gen = 0;
    }

    fn idx(&self, p: Point) -> Option<usize> {
        if !self.range.contains(p) {
            return None;
        }
        let rel = p - self.range.min();
        Some((rel.y * self.range.width() + rel.x) as usize)
    }

    fn begin_query(&mut self) {
        if self.current_gen == u32::MAX {
            for n in &mut self.nodes {
                n.gen = if n.gen == self.current_gen { 1 } else { 0 };
            }
            self.current_gen = 1;
        } else {
            self.current_gen += 1;
        }
    }

    fn node_mut(&mut self, p: Point) -> usize {
        let idx = self.idx(p).expect("point outside Fov's range");
        if self.nodes[idx].gen != self.current_gen {
            self.nodes[idx] = Node::fresh(p, self.current_gen);
        }
        idx
    }

    fn is_current(&self, p: Point) -> bool {
        matches!(self.idx(p), Some(i) if self.nodes[i].gen == self.current_gen)
    }

    fn cost_of(&self, p: Point) -> Option<i32> {
        match self.idx(p) {
            Some(i) if self.nodes[i].gen == self.current_gen => Some(self.nodes[i].cost),
            _ => None,
        }
    }

    /// Propagates from `src` out to `lighter.max_cost(src)`, ring by ring:
    /// for each square ring of Chebyshev radius `d` around `src`, every
    /// boundary cell picks the cheapest of its already-resolved (radius
    /// `d-1`) neighbors as its parent.
    pub fn vision_map(&mut self, lighter: &impl Lighter, src: Point) -> VisionMap {
        self.begin_query();
        if !self.range.contains(src) {
            return VisionMap { max_cost: lighter.max_cost(src), lit: Vec::new() };
        }

        let max_cost = lighter.max_cost(src);
        let src_idx = self.node_mut(src);
        self.nodes[src_idx].cost = 0;
        self.nodes[src_idx].parent = src;
        let mut lit = vec![(src, 0)];

        for d in 1..=max_cost.max(0) {
            self.propagate_ring(lighter, src, d, &mut lit);
        }

        VisionMap { max_cost, lit }
    }

    fn propagate_ring(&mut self, lighter: &impl Lighter, src: Point, d: i32, lit: &mut Vec<(Point, i32)>) {
        // Row edges (top/bottom), corners excluded — corners are covered by
        // the column edges below so every boundary cell is visited once.
        for &dy in &[1, -1] {
            let y = src.y - dy * d;
            for x in (src.x - d + 1)..(src.x + d) {
                self.resolve(lighter, src, Point::new(x, y), dy, lit);
            }
        }
        // Column edges (left/right), corners included.
        for &dx in &[1, -1] {
            let x = src.x - dx * d;
            for y in (src.y - d)..=(src.y + d) {
                self.resolve_column(lighter, src, Point::new(x, y), dx, lit);
            }
        }
    }

    fn resolve(&mut self, lighter: &impl Lighter, src: Point, p: Point, dy: i32, lit: &mut Vec<(Point, i32)>) {
        if !self.range.contains(p) {
            return;
        }
        let dx = (src.x - p.x).signum();
        let orth = Point::new(p.x, p.y + dy);
        let mut best: Option<(Point, i32)> = None;
        if let Some(c) = self.cost_of(orth) {
            best = Some((orth, c));
        }
        if dx != 0 {
            let diag = Point::new(p.x + dx, p.y + dy);
            if let Some(c) = self.cost_of(diag) {
                if best.map(|(_, bc)| c < bc).unwrap_or(true) {
                    best = Some((diag, c));
                }
            }
        }
        self.finish_resolve(lighter, src, p, best, lit);
    }

    fn resolve_column(&mut self, lighter: &impl Lighter, src: Point, p: Point, dx: i32, lit: &mut Vec<(Point, i32)>) {
        if !self.range.contains(p) {
            return;
        }
        let dy = (src.y - p.y).signum();
        let orth = Point::new(p.x + dx, p.y);
        let mut best: Option<(Point, i32)> = None;
        if let Some(c) = self.cost_of(orth) {
            best = Some((orth, c));
        }
        if dy != 0 {
            let diag = Point::new(p.x + dx, p.y + dy);
            if let Some(c) = self.cost_of(diag) {
                if best.map(|(_, bc)| c < bc).unwrap_or(true) {
                    best = Some((diag, c));
                }
            }
        }
        self.finish_resolve(lighter, src, p, best, lit);
    }

    fn finish_resolve(
        &mut self,
        lighter: &impl Lighter,
        src: Point,
        p: Point,
        best: Option<(Point, i32)>,
        lit: &mut Vec<(Point, i32)>,
    ) {
        let Some((parent, parent_cost)) = best else { return };
        let total = parent_cost + lighter.cost(src, parent, p);
        let idx = self.node_mut(p);
        if total < self.nodes[idx].cost {
            self.nodes[idx].cost = total;
            self.nodes[idx].parent = parent;
        }
        let max_cost = lighter.max_cost(src);
        if self.nodes[idx].cost <= max_cost {
            lit.push((p, self.nodes[idx].cost));
        }
    }

    /// Light from multiple sources, taking the minimum accumulated cost per
    /// point across independent single-source propagations.
    pub fn light_map(&mut self, lighter: &impl Lighter, sources: &[Point]) -> VisionMap {
        let mut merged: Vec<(Point, i32)> = Vec::new();
        let mut max_cost = 0;
        for &src in sources {
            let vm = self.vision_map(lighter, src);
            max_cost = max_cost.max(vm.max_cost);
            for (p, c) in vm.lit {
                match merged.iter_mut().find(|(q, _)| *q == p) {
                    Some((_, existing)) => {
                        if c < *existing {
                            *existing = c;
                        }
                    }
                    None => merged.push((p, c)),
                }
            }
        }
        VisionMap { max_cost, lit: merged }
    }

    /// After a [`Fov::vision_map`] call, reconstructs the ray from `src` to
    /// `dst` by walking parent links backwards, then reverses it.
    pub fn ray(&self, dst: Point) -> Vec<Point> {
        if !self.is_current(dst) {
            return Vec::new();
        }
        let mut rev = vec![dst];
        let mut cur = dst;
        loop {
            let idx = self.idx(cur).unwrap();
            let parent = self.nodes[idx].parent;
            if parent == cur {
                break;
            }
            rev.push(parent);
            cur = parent;
        }
        rev.reverse();
        rev
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Uniform;
    impl Lighter for Uniform {
        fn cost(&self, _src: Point, _from: Point, _to: Point) -> i32 {
            1
        }
        fn max_cost(&self, _src: Point) -> i32 {
            10
        }
    }

    #[test]
    fn uniform_cost_lights_full_square() {
        // Seed scenario S5: 21x21 range centered on origin, max cost 10,
        // cost 1 everywhere lights all 441 cells.
        let mut fov = Fov::new(Range::new(-10, -10, 11, 11));
        let vm = fov.vision_map(&Uniform, Point::new(0, 0));
        assert_eq!(vm.lit().len(), 441);
    }

    #[test]
    fn ray_reconstructs_to_source() {
        let mut fov = Fov::new(Range::new(-5, -5, 6, 6));
        fov.vision_map(&Uniform, Point::new(0, 0));
        let ray = fov.ray(Point::new(3, 3));
        assert_eq!(ray.first(), Some(&Point::new(0, 0)));
        assert_eq!(ray.last(), Some(&Point::new(3, 3)));
    }

    struct Walled(Vec<Point>);
    impl Lighter for Walled {
        fn cost(&self, _src: Point, from: Point, to: Point) -> i32 {
            if self.0.contains(&to) || self.0.contains(&from) {
                1000
            } else {
                1
            }
        }
        fn max_cost(&self, _src: Point) -> i32 {
            8
        }
    }

    #[test]
    fn symmetric_cost_gives_symmetric_visibility() {
        let walls = vec![Point::new(2, 0)];
        let lighter = Walled(walls);
        let range = Range::new(-10, -10, 11, 11);

        let mut fov_a = Fov::new(range);
        let vm_a = fov_a.vision_map(&lighter, Point::new(0, 0));
        let a_sees_q = vm_a.cost_at(Point::new(4, 0)).map(|c| c <= 8).unwrap_or(false);

        let mut fov_b = Fov::new(range);
        let vm_b = fov_b.vision_map(&lighter, Point::new(4, 0));
        let q_sees_a = vm_b.cost_at(Point::new(0, 0)).map(|c| c <= 8).unwrap_or(false);

        assert_eq!(a_sees_q, q_sees_a);
    }
}
