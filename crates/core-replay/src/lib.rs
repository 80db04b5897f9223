//! Loads a recorded [`core_grid::Frame`] stream and plays it back through
//! the same [`core_run::Model`]/`Driver` seam a live application uses.

mod model;

pub use model::{ReplayEvent, ReplayModel};

use core_codec::{DecodeError, DecodeOutcome, FrameDecoder};
use core_grid::Frame;
use std::io::Read;

/// Decodes every frame in a stream up front. Replay files are expected to be
/// small enough to fit in memory; streaming playback of frames still too
/// large for that is left to a future driver, not this crate.
pub fn load_frames<R: Read>(reader: R) -> Result<Vec<Frame>, DecodeError> {
    let mut decoder = FrameDecoder::new(reader);
    let mut frames = Vec::new();
    loop {
        match decoder.decode()? {
            DecodeOutcome::Frame(frame) => frames.push(frame),
            DecodeOutcome::Eof => return Ok(frames),
        }
    }
}
