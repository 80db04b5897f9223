use core_grid::Frame;
use core_msg::{CancelToken, Message};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// The external collaborator that owns the real terminal/window/input
/// device. Concrete drivers (terminal, SDL, browser) live outside this
/// crate; this trait is the seam they implement against.
pub trait Driver<U>: Send {
    /// Acquires whatever resource the driver needs (terminal raw mode,
    /// window handle, signal handlers). The runner never starts its loop if
    /// this fails.
    fn init(&mut self) -> anyhow::Result<()>;

    /// Spawns a long-running task that feeds input messages into `tx` until
    /// `cancel` fires. Mirrors the spawn-against-a-channel shape used for
    /// every other background source the runner owns. Implementors typically
    /// hold the actual input handle behind an `Option` and `take()` it here,
    /// since `flush`/`close` still need `&mut self` afterward.
    fn poll_msgs(&mut self, cancel: CancelToken, tx: mpsc::Sender<Message<U>>) -> JoinHandle<()>;

    /// Applies a damage set synchronously.
    fn flush(&mut self, frame: &Frame) -> anyhow::Result<()>;

    /// Releases driver resources. Must be safe to call more than once.
    fn close(&mut self);
}
