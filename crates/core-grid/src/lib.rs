//! Shared rectangular cell buffer with aliasing slice views.
//!
//! A [`Grid`] is a cheap value: it holds a reference-counted handle to a
//! shared [`GridBuffer`] plus a `bounds` rectangle describing which part of
//! that buffer this particular grid addresses. Cloning a grid, or taking a
//! [`Grid::slice`] of one, shares the same underlying storage — writes through
//! one alias are visible through any other alias of the same buffer.
//!
//! Design constraints:
//! - No internal locking. A buffer is meant to be driven by a single task;
//!   the runner never hands the same grid to two concurrent tasks.
//! - `At`/`Set` on out-of-bounds points never panic: out-of-range reads
//!   return the zero cell, out-of-range writes are no-ops.

use core_geom::{Point, Range};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

bitflags::bitflags! {
    /// Style attribute bitmask. Bit meaning is driver-defined beyond bold/underline/reverse,
    /// which every driver is expected to understand.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attrs: u16 {
        const BOLD      = 0b0000_0001;
        const UNDERLINE = 0b0000_0010;
        const REVERSE   = 0b0000_0100;
        const ITALIC    = 0b0000_1000;
        const BLINK     = 0b0001_0000;
    }
}

/// A driver-opaque color index. `0` is the reserved "default" color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color(pub i32);

impl Color {
    pub const DEFAULT: Color = Color(0);
}

/// Foreground/background colors plus attribute bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub attrs: Attrs,
}

/// One addressable grid position: a character and its style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub rune: char,
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Cell { rune: ' ', style: Style::default() }
    }
}

impl Cell {
    pub const fn new(rune: char, style: Style) -> Self {
        Cell { rune, style }
    }
}

struct GridBuffer {
    cells: Vec<Cell>,
    width: i32,
    height: i32,
}

impl GridBuffer {
    fn new(width: i32, height: i32) -> Self {
        let w = width.max(0);
        let h = height.max(0);
        GridBuffer { cells: vec![Cell::default(); (w * h) as usize], width: w, height: h }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            None
        } else {
            Some((y * self.width + x) as usize)
        }
    }
}

/// A rectangular view onto a shared cell buffer.
#[derive(Clone)]
pub struct Grid {
    buffer: Rc<RefCell<GridBuffer>>,
    /// Bounds in the owner buffer's absolute coordinate system.
    bounds: Range,
}

impl Grid {
    /// Builds a fresh grid with its own buffer, filled with the zero cell.
    pub fn new(width: i32, height: i32) -> Self {
        assert!(width >= 0 && height >= 0, "grid dimensions must be non-negative");
        let buffer = GridBuffer::new(width, height);
        let bounds = Range::new(0, 0, buffer.width, buffer.height);
        Grid { buffer: Rc::new(RefCell::new(buffer)), bounds }
    }

    /// Absolute bounds of this view within the shared owner buffer.
    pub fn bounds(&self) -> Range {
        self.bounds
    }

    /// This grid's own extent expressed in its own local coordinates,
    /// i.e. `Range::new(0, 0, width, height)`.
    pub fn local_range(&self) -> Range {
        self.bounds.origin()
    }

    pub fn size(&self) -> Point {
        self.bounds.size()
    }

    pub fn width(&self) -> i32 {
        self.bounds.width()
    }

    pub fn height(&self) -> i32 {
        self.bounds.height()
    }

    pub fn contains(&self, p: Point) -> bool {
        self.local_range().contains(p)
    }

    fn abs(&self, p: Point) -> Point {
        p + self.bounds.min()
    }

    /// A child view over `rg` (given in this grid's local coordinates),
    /// sharing the same underlying buffer. `rg` is clamped to this grid's
    /// own extent; an inverted or fully-outside range yields an empty grid.
    pub fn slice(&self, rg: Range) -> Grid {
        let clamped = rg.intersect(self.local_range());
        let abs_min = self.abs(clamped.min());
        let abs_max = self.abs(clamped.max());
        Grid { buffer: Rc::clone(&self.buffer), bounds: Range::from_points(abs_min, abs_max) }
    }

    /// Reads the cell at local point `p`, or the zero cell if out of bounds.
    pub fn at(&self, p: Point) -> Cell {
        if !self.contains(p) {
            return Cell::default();
        }
        let a = self.abs(p);
        let buf = self.buffer.borrow();
        match buf.index(a.x, a.y) {
            Some(i) => buf.cells[i],
            None => Cell::default(),
        }
    }

    /// Writes the cell at local point `p`; a no-op if out of bounds.
    pub fn set(&self, p: Point, cell: Cell) {
        if !self.contains(p) {
            return;
        }
        let a = self.abs(p);
        let mut buf = self.buffer.borrow_mut();
        if let Some(i) = buf.index(a.x, a.y) {
            buf.cells[i] = cell;
        }
    }

    /// Fills this view with `cell`. Chooses among three internal strategies
    /// depending on slice shape so that large fills stay close to `memset`
    /// speed: a full-width slice fills one row then replicates it downward,
    /// a single-column slice writes straight down, anything else falls back
    /// to the general nested loop.
    pub fn fill(&self, cell: Cell) {
        let w = self.width();
        let h = self.height();
        if w <= 0 || h <= 0 {
            return;
        }
        let mut buf = self.buffer.borrow_mut();
        let owner_width = buf.width;
        if w == owner_width {
            // Contiguous wide fast path: the whole view is row-contiguous
            // in the owner buffer, so it is one flat slice.
            let start = buf.index(self.bounds.min().x, self.bounds.min().y).unwrap();
            let len = (w * h) as usize;
            buf.cells[start..start + len].fill(cell);
        } else if w == 1 {
            // Single-column fast path: stride straight down, no per-row bookkeeping.
            for y in 0..h {
                let a = self.abs(Point::new(0, y));
                if let Some(i) = buf.index(a.x, a.y) {
                    buf.cells[i] = cell;
                }
            }
        } else {
            for y in 0..h {
                let row_start = self.abs(Point::new(0, y));
                let start = buf.index(row_start.x, row_start.y).unwrap();
                buf.cells[start..start + w as usize].fill(cell);
            }
        }
    }

    /// Fills this view by calling `f(p)` for every local point `p`.
    pub fn fill_func<F: FnMut(Point) -> Cell>(&self, mut f: F) {
        for p in self.local_range().iter() {
            self.set(p, f(p));
        }
    }

    /// Replaces every cell with `f(p, current)`.
    pub fn map_cells<F: Fn(Point, Cell) -> Cell>(&self, f: F) {
        for p in self.local_range().iter() {
            let c = self.at(p);
            self.set(p, f(p, c));
        }
    }

    /// Copies `min(self.size(), src.size())` cells from `src` into `self`,
    /// overlap-safe: when `self` and `src` alias the same owner buffer and
    /// their regions overlap, the copy direction is chosen per row so that
    /// cells are never overwritten before they are read, exactly as
    /// `memmove` behaves for overlapping byte ranges.
    pub fn copy_from(&self, src: &Grid) -> Point {
        let w = self.width().min(src.width());
        let h = self.height().min(src.height());
        if w <= 0 || h <= 0 {
            return Point::new(0, 0);
        }

        let same_buffer = Rc::ptr_eq(&self.buffer, &src.buffer);
        if same_buffer && self.bounds == src.bounds {
            return Point::new(w, h);
        }

        // Determine row order. Only relevant when aliasing the same buffer:
        // if destination rows start below source rows we must copy bottom
        // row first, otherwise the first rows written would clobber source
        // rows not yet read.
        let dst_below_src = same_buffer && self.bounds.min().y > src.bounds.min().y;
        let row_order: Vec<i32> = if dst_below_src { (0..h).rev().collect() } else { (0..h).collect() };

        for &y in &row_order {
            // Read the whole row before writing any of it: this makes
            // same-row horizontal aliasing safe regardless of which side of
            // the row the overlap sits on, without needing a separate
            // column-direction case.
            let row: Vec<Cell> = (0..w).map(|x| src.at(Point::new(x, y))).collect();
            for (x, cell) in row.into_iter().enumerate() {
                self.set(Point::new(x as i32, y), cell);
            }
        }
        Point::new(w, h)
    }

    /// Counts cells equal to `cell`.
    pub fn count(&self, cell: Cell) -> usize {
        self.count_func(|c| c == cell)
    }

    /// Counts cells matching `pred`.
    pub fn count_func<F: Fn(Cell) -> bool>(&self, pred: F) -> usize {
        self.local_range().iter().filter(|&p| pred(self.at(p))).count()
    }

    /// Resizes this view to `(width, height)`. If the new size fits within
    /// the existing owner buffer this only adjusts `bounds`; otherwise the
    /// owner is reallocated, old contents are preserved at matching
    /// coordinates, and newly exposed cells are the zero cell.
    pub fn resize(&mut self, width: i32, height: i32) {
        let width = width.max(0);
        let height = height.max(0);
        let origin = self.bounds.min();
        let needs_growth = {
            let buf = self.buffer.borrow();
            origin.x + width > buf.width || origin.y + height > buf.height
        };
        if !needs_growth {
            self.bounds = Range::from_points(origin, Point::new(origin.x + width, origin.y + height));
            return;
        }

        let new_width = (origin.x + width).max(self.buffer.borrow().width);
        let new_height = (origin.y + height).max(self.buffer.borrow().height);
        let mut new_buf = GridBuffer::new(new_width, new_height);
        {
            let old = self.buffer.borrow();
            for y in 0..old.height {
                for x in 0..old.width {
                    if let (Some(oi), Some(ni)) = (old.index(x, y), new_buf.index(x, y)) {
                        new_buf.cells[ni] = old.cells[oi];
                    }
                }
            }
        }
        self.buffer = Rc::new(RefCell::new(new_buf));
        self.bounds = Range::from_points(origin, Point::new(origin.x + width, origin.y + height));
    }

    /// A stateful cursor over this view's cells in row-major order,
    /// independent of the owner buffer's stride.
    pub fn cursor(&self) -> GridCursor<'_> {
        GridCursor { grid: self, p: Point::new(0, 0), done: self.local_range().empty() }
    }

    /// Row-major `(point, cell)` iterator over this view's local coordinates.
    pub fn iter(&self) -> GridIter<'_> {
        GridIter { grid: self, inner: self.local_range().iter() }
    }

    pub fn points(&self) -> core_geom::RangeIter {
        self.local_range().iter()
    }
}

/// Stateful traversal cursor (`advance`/`p`/`set_p`/`cell`/`set_cell`/`reset`)
/// for callers that want to read-then-conditionally-write without
/// re-deriving the current point each time.
pub struct GridCursor<'g> {
    grid: &'g Grid,
    p: Point,
    done: bool,
}

impl<'g> GridCursor<'g> {
    pub fn next(&mut self) -> bool {
        if self.done {
            return false;
        }
        let lr = self.grid.local_range();
        if self.p.y >= lr.max().y {
            self.done = true;
            return false;
        }
        true
    }

    pub fn advance(&mut self) {
        let lr = self.grid.local_range();
        self.p.x += 1;
        if self.p.x >= lr.max().x {
            self.p.x = lr.min().x;
            self.p.y += 1;
        }
        if self.p.y >= lr.max().y {
            self.done = true;
        }
    }

    pub fn p(&self) -> Point {
        self.p
    }

    pub fn set_p(&mut self, p: Point) {
        self.p = p;
        self.done = !self.grid.contains(p);
    }

    pub fn cell(&self) -> Cell {
        self.grid.at(self.p)
    }

    pub fn set_cell(&self, cell: Cell) {
        self.grid.set(self.p, cell);
    }

    pub fn reset(&mut self) {
        self.p = self.grid.local_range().min();
        self.done = self.grid.local_range().empty();
    }
}

pub struct GridIter<'g> {
    grid: &'g Grid,
    inner: core_geom::RangeIter,
}

impl<'g> Iterator for GridIter<'g> {
    type Item = (Point, Cell);

    fn next(&mut self) -> Option<(Point, Cell)> {
        let p = self.inner.next()?;
        Some((p, self.grid.at(p)))
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height() {
            for x in 0..self.width() {
                write!(f, "{}", self.at(Point::new(x, y)).rune)?;
            }
            if y + 1 < self.height() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// One damaged position within a [`Frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCell {
    pub cell: Cell,
    pub pos: Point,
}

/// A damage set: the cells that changed since the previous flushed frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub cells: Vec<FrameCell>,
    pub width: i32,
    pub height: i32,
    pub time_ms: u64,
}

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

/// Diffs `curr` against `last` (the previously flushed buffer), returning a
/// [`Frame`] containing only cells that changed, and updates `last` in place
/// so the next call diffs against what was just computed.
pub fn compute_frame(last: &Grid, curr: &Grid) -> Frame {
    let mut cells = Vec::new();
    for (p, c) in curr.iter() {
        if last.at(p) != c {
            cells.push(FrameCell { cell: c, pos: p });
            last.set(p, c);
        }
    }
    Frame { cells, width: curr.width(), height: curr.height(), time_ms: now_ms() }
}

/// Forces the next [`compute_frame`] call to treat every cell as damaged, by
/// resetting `last` to the zero cell everywhere. Used after a resize or a
/// palette change where nothing may have changed content-wise but the whole
/// screen must still be redrawn.
pub fn clear_cache(last: &Grid) {
    last.fill(Cell::default());
}
