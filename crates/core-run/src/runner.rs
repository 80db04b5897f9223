use crate::config::RunConfig;
use crate::driver::Driver;
use crate::model::Model;
use core_grid::{clear_cache, compute_frame, Frame, Grid};
use core_msg::{CancelToken, Effect, Message};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Drives a [`Model`] against a [`Driver`]: delivers `Init` first, then
/// alternates feeding messages to `Update` with FPS-capped `Draw` + diff +
/// flush cycles, until `Update` returns [`Effect::End`] or the driver's
/// input task ends.
pub struct Runner<U, M, D> {
    model: M,
    driver: D,
    config: RunConfig,
    cancel: CancelToken,
    recorded: Vec<Frame>,
    _marker: std::marker::PhantomData<U>,
}

impl<U, M, D> Runner<U, M, D>
where
    U: Send + 'static,
    M: Model<U>,
    D: Driver<U> + 'static,
{
    pub fn new(model: M, driver: D, config: RunConfig) -> Self {
        Runner {
            model,
            driver,
            config,
            cancel: CancelToken::new(),
            recorded: Vec::new(),
            _marker: std::marker::PhantomData,
        }
    }

    /// Every non-empty frame flushed so far, in order. Populated only when
    /// `RunConfig::record_frames` is set; a caller can hand these to
    /// `core_codec::FrameEncoder` once `start` returns. Empty diffs (a tick
    /// where nothing changed) are not recorded.
    pub fn recorded_frames(&self) -> &[Frame] {
        &self.recorded
    }

    /// Runs the model/driver pair to completion. Returns the first fatal
    /// error (driver init failure, or a fatal flush) wrapped as a single
    /// `anyhow::Error`, per the error handling design: pure library calls
    /// never abort, but the runner's own `start` is the one place that
    /// surfaces a terminal failure to the embedder.
    pub async fn start(&mut self) -> anyhow::Result<()> {
        self.driver.init()?;
        info!(target: "runner.loop", "driver initialized");

        let (tx, mut rx) = mpsc::channel::<Message<U>>(self.config.inbox_capacity);

        let input_task = self.driver.poll_msgs(self.cancel.clone(), tx.clone());

        let mut sub_tasks: Vec<JoinHandle<()>> = Vec::new();
        let mut last = Grid::new(0, 0);

        // `Init` is always delivered first, before any other message.
        let init_effect = self.model.update(Message::Init);
        self.apply_effect(init_effect, &tx, &mut sub_tasks);

        self.render(&mut last, true)?;

        let mut ticker = tokio::time::interval(self.config.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut shutting_down = false;
        let mut force_redraw = false;
        loop {
            tokio::select! {
                maybe_msg = rx.recv() => {
                    match maybe_msg {
                        Some(Message::End) | None => {
                            debug!(target: "runner.loop", "end message or closed inbox");
                            break;
                        }
                        Some(msg) => {
                            // A screen notification forces the next tick's
                            // frame to be a full redraw, even if the new
                            // dimensions happen to match the old ones (a
                            // palette change reported the same way).
                            if matches!(msg, Message::Screen { .. }) {
                                force_redraw = true;
                            }
                            let effect = self.model.update(msg);
                            if self.apply_effect(effect, &tx, &mut sub_tasks) {
                                shutting_down = true;
                            }
                        }
                    }
                }
                _ = ticker.tick() => {
                    // Any number of `Update` calls may have run since the
                    // last tick; one `Draw` + diff here flushes all of
                    // their accumulated damage as a single frame, which is
                    // what makes this the runner's back-pressure coalescer.
                    self.render(&mut last, force_redraw)?;
                    force_redraw = false;
                }
            }
            if shutting_down {
                break;
            }
        }

        self.cancel.cancel();
        drop(tx);
        let _ = tokio::time::timeout(Duration::from_millis(200), input_task).await;
        for h in sub_tasks {
            let _ = tokio::time::timeout(Duration::from_millis(200), h).await;
        }
        self.driver.close();
        Ok(())
    }

    fn render(&mut self, last: &mut Grid, force_full: bool) -> anyhow::Result<()> {
        let curr = self.model.draw();
        if last.size() != curr.size() {
            *last = Grid::new(curr.width(), curr.height());
            clear_cache(last);
        } else if force_full {
            clear_cache(last);
        }
        let frame = compute_frame(last, &curr);
        if self.config.record_frames && !frame.cells.is_empty() {
            self.recorded.push(frame.clone());
        }
        self.driver.flush(&frame)
    }

    fn apply_effect(&mut self, effect: Effect<U>, tx: &mpsc::Sender<Message<U>>, sub_tasks: &mut Vec<JoinHandle<()>>) -> bool {
        match effect {
            Effect::None => false,
            Effect::End => {
                debug!(target: "runner.effects", "end effect requested");
                true
            }
            Effect::Command(fut) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let msg = fut.await;
                    if tx.send(msg).await.is_err() {
                        warn!(target: "runner.effects", "command result dropped, inbox closed");
                    }
                });
                false
            }
            Effect::Subscription(sub) => {
                let handle = sub.spawn(self.cancel.clone(), tx.clone());
                sub_tasks.push(handle);
                false
            }
            Effect::Batch(effects) => {
                let mut end = false;
                for e in effects {
                    end |= self.apply_effect(e, tx, sub_tasks);
                }
                end
            }
        }
    }
}
