//! Message and effect sum types exchanged between the runner and a model.
//!
//! `U` is the application's own opaque message type, carried through
//! [`Message::User`] — the runner never inspects it.

use core_geom::Point;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Mod: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const META  = 0b1000;
    }
}

/// A closed set of named, non-printable keys, plus any printable character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Backspace,
    Delete,
    End,
    Enter,
    Escape,
    Home,
    Insert,
    PageDown,
    PageUp,
    Space,
    Tab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Named(NamedKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseAction {
    Main,
    Auxiliary,
    Secondary,
    WheelUp,
    WheelDown,
    Release,
    Move,
}

/// Messages delivered to a model's `Update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message<U> {
    /// Always the first message a model receives.
    Init,
    KeyDown { key: Key, modifiers: Mod, time_ms: u64 },
    Mouse { action: MouseAction, pos: Point, modifiers: Mod, time_ms: u64 },
    /// Driver-initiated resize notification.
    Screen { width: i32, height: i32, time_ms: u64 },
    /// Internal: causes the runner to exit its loop.
    End,
    User(U),
}

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// A long-running cooperative task that streams messages in until cancelled.
/// Mirrors the spawn-a-boxed-task-against-a-channel shape used for the
/// runner's other background sources.
pub trait Subscription<U>: Send {
    fn spawn(self: Box<Self>, cancel: CancelToken, tx: mpsc::Sender<Message<U>>) -> JoinHandle<()>;
}

/// A cooperative flag signalled once, read from any clone. Used as the
/// runner's root cancellation signal: `End` (or external shutdown) calls
/// [`CancelToken::cancel`] and every subscription observes it on its own
/// schedule.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        CancelToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A deferred action returned by `Update`.
pub enum Effect<U> {
    None,
    /// A one-shot task; its result is re-injected as a message.
    Command(BoxFuture<Message<U>>),
    Subscription(Box<dyn Subscription<U>>),
    /// Deliver these effects concurrently; no ordering is implied between them.
    Batch(Vec<Effect<U>>),
    /// Request loop termination.
    End,
}

impl<U> Effect<U> {
    pub fn command<F>(fut: F) -> Self
    where
        F: Future<Output = Message<U>> + Send + 'static,
    {
        Effect::Command(Box::pin(fut))
    }

    pub fn batch(effects: Vec<Effect<U>>) -> Self {
        Effect::Batch(effects)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Effect::None)
    }
}
