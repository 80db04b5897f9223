use crate::heap::{IndexedHeap, NOT_IN_HEAP};
use core_geom::{Point, Range};

/// One arena slot. Only meaningful when `gen` matches the arena's current
/// generation; a stale node is treated as never-visited the next time it is
/// touched, without needing to be reset eagerly.
#[derive(Clone, Copy)]
pub(crate) struct Node {
    pub cost: i32,
    pub priority: i32,
    pub parent: Point,
    pub open: bool,
    pub closed: bool,
    pub heap_idx: usize,
    pub gen: u32,
    pub cc: i32,
}

impl Node {
    fn fresh(p: Point, gen: u32) -> Self {
        Node {
            cost: i32::MAX,
            priority: i32::MAX,
            parent: p,
            open: false,
            closed: false,
            heap_idx: NOT_IN_HEAP,
            gen,
            cc: -1,
        }
    }
}

/// Reusable node storage for a rectangular range of points, shared by every
/// pathfinding/FOV-style algorithm in this crate. Sized once per
/// [`PathRange::set_range`] call and then reused across queries via the
/// generation-tag discipline described in the module documentation.
pub struct PathRange {
    pub(crate) range: Range,
    pub(crate) nodes: Vec<Node>,
    pub(crate) heap: IndexedHeap,
    current_gen: u32,
    seq_counter: i64,
}

impl PathRange {
    pub fn new(range: Range) -> Self {
        let len = (range.width().max(0) * range.height().max(0)) as usize;
        PathRange {
            range,
            nodes: vec![Node::fresh(range.min(), 0); len],
            heap: IndexedHeap::new(),
            current_gen: 0,
            seq_counter: 1,
        }
    }

    pub fn range(&self) -> Range {
        self.range
    }

    /// Resizes the arena for a new rectangular range. Keeps the existing
    /// backing storage (and its generation tags) when the size is unchanged,
    /// so a pure translation of the query range never reallocates.
    pub fn set_range(&mut self, range: Range) {
        if range.size() == self.range.size() {
            self.range = range;
            return;
        }
        let len = (range.width().max(0) * range.height().max(0)) as usize;
        self.range = range;
        self.nodes = vec![Node::fresh(range.min(), 0); len];
        self.current_gen = 0;
        self.heap.clear();
    }

    pub(crate) fn idx(&self, p: Point) -> Option<usize> {
        if !self.range.contains(p) {
            return None;
        }
        let rel = p - self.range.min();
        Some((rel.y * self.range.width() + rel.x) as usize)
    }

    pub(crate) fn point_of(&self, idx: usize) -> Point {
        let w = self.range.width();
        let rel = Point::new((idx as i32) % w, (idx as i32) / w);
        rel + self.range.min()
    }

    /// Starts a new query: bumps the generation counter so every node is
    /// logically cleared in O(1), normalizing in a single O(n) pass on the
    /// rare occasion the counter would otherwise wrap.
    pub(crate) fn begin_query(&mut self) {
        self.heap.clear();
        if self.current_gen == u32::MAX {
            for n in &mut self.nodes {
                n.gen = if n.gen == self.current_gen { 1 } else { 0 };
            }
            self.current_gen = 1;
        } else {
            self.current_gen += 1;
        }
    }

    /// Returns the arena slot for `p`, lazily resetting it if it belongs to
    /// a previous generation. Panics if `p` is outside the arena's range —
    /// callers must check with `range().contains` first.
    pub(crate) fn node(&mut self, p: Point) -> usize {
        let idx = self.idx(p).expect("point outside PathRange's range");
        if self.nodes[idx].gen != self.current_gen {
            self.nodes[idx] = Node::fresh(p, self.current_gen);
        }
        idx
    }

    pub(crate) fn seq(&mut self) -> i64 {
        let s = self.seq_counter;
        self.seq_counter += 1;
        s
    }

    /// True if `p` was touched by the most recent query.
    pub(crate) fn is_current(&self, p: Point) -> bool {
        match self.idx(p) {
            Some(i) => self.nodes[i].gen == self.current_gen,
            None => false,
        }
    }

    pub(crate) fn reconstruct(&mut self, goal_idx: usize) -> Vec<Point> {
        let mut rev = vec![self.point_of(goal_idx)];
        let mut idx = goal_idx;
        loop {
            let cur_p = self.point_of(idx);
            let parent = self.nodes[idx].parent;
            if parent == cur_p {
                break;
            }
            rev.push(parent);
            idx = self.node(parent);
        }
        rev.reverse();
        rev
    }
}
