//! Grid-based interactive application engine.
//!
//! This crate has no binary of its own: it re-exports the public surface of
//! every `core-*` crate so a consumer depends on one thing instead of nine,
//! and documents the two traits — [`prelude::Model`] and [`prelude::Driver`]
//! — a concrete application actually implements. Pick a driver (terminal,
//! SDL, browser, or the bundled [`replay`] playback model), write a `Model`,
//! and hand both to [`prelude::Runner::start`].

pub use core_codec as codec;
pub use core_fov as fov;
pub use core_geom as geom;
pub use core_grid as grid;
pub use core_msg as msg;
pub use core_path as path;
pub use core_queue as queue;
pub use core_replay as replay;
pub use core_run as run;

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;

/// Installs a global `tracing` subscriber that writes to a rolling file in
/// `log_dir`, filtered by `RUST_LOG` (or `info` if unset). Mirrors how a
/// concrete application wires up logging before starting its `Runner`; an
/// example/test harness is the only thing expected to call this — a library
/// consumer embedding `tilekit` inside a larger program installs its own
/// subscriber instead.
///
/// The returned [`WorkerGuard`] must be held for the program's lifetime: the
/// non-blocking writer stops flushing once it's dropped.
pub fn init_logging(log_dir: &Path) -> anyhow::Result<WorkerGuard> {
    let log_path = log_dir.join("tilekit.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }

    let file_appender = tracing_appender::rolling::never(log_dir, "tilekit.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing subscriber already installed: {e}"))?;
    Ok(guard)
}


/// Everything a typical application needs in scope.
pub mod prelude {
    pub use core_geom::{Point, Range};
    pub use core_grid::{Attrs, Cell, Color, Frame, FrameCell, Grid, Style};
    pub use core_msg::{CancelToken, Effect, Key, Message, Mod, MouseAction, NamedKey, Subscription};
    pub use core_run::{Driver, Model, RunConfig, Runner};
}
