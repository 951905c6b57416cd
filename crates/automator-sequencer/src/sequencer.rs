//! The sequencer engine
//!
//! [`Sequencer::run`] expands an action list, spawns the driver for it and
//! hands back a [`Completion`] that settles once every iteration has run.
//! [`Sequencer::kill`] stops the current run at its next step.

use automator_core::{actions_from_values, Action, Context, Deferred, Settlement};
use futures::FutureExt;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};
use std::task::{Context as TaskContext, Poll};
use tokio::sync::watch;
use tracing::{debug, warn, Instrument};

use crate::config::RunConfig;
use crate::error::SequencerResult;
use crate::expand::expand_actions;
use crate::scheduler::{IterationCallback, Phase, RunState, Scheduler};

/// Settles with the last iteration callback's value once a run completes
///
/// Resolves to `Value::Null` when the run had no iteration callback. A killed
/// run's completion never settles.
#[must_use = "a Completion does nothing unless it is awaited"]
#[derive(Debug)]
pub struct Completion {
    deferred: Deferred,
    context: Context,
}

impl Completion {
    /// Context of the run this completion belongs to
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Get the underlying deferred, keeping rejected and resolved apart
    pub fn into_deferred(self) -> Deferred {
        self.deferred
    }
}

impl Future for Completion {
    type Output = Value;

    fn poll(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Self::Output> {
        self.deferred.poll_unpin(cx).map(Settlement::into_value)
    }
}

/// Handle on the run currently owned by a sequencer
struct ActiveRun {
    context: Context,
    kill: watch::Sender<bool>,
    phase: watch::Receiver<Phase>,
}

/// Runs action lists, one at a time
///
/// Each call to [`run`](Self::run) starts a fresh run with its own state; a
/// run still in progress is killed when a new one starts.
pub struct Sequencer {
    config: RunConfig,
    current: Mutex<Option<ActiveRun>>,
}

impl Sequencer {
    /// Create a sequencer with the given configuration
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            current: Mutex::new(None),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run `actions` `iterations` times
    ///
    /// `on_iteration` is called after every pass with the 0-based iteration
    /// index; the value it returns after the last pass settles the returned
    /// completion. An iteration count of 0 runs once.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn run<I>(
        &self,
        actions: I,
        iterations: usize,
        on_iteration: Option<IterationCallback>,
    ) -> Completion
    where
        I: IntoIterator<Item = Action>,
    {
        let actions = expand_actions(actions);
        let state = RunState::new(iterations, on_iteration);
        let context = Context::new();

        let (kill_tx, kill_rx) = watch::channel(false);
        let (phase_tx, phase_rx) = watch::channel(Phase::Idle);
        let (resolver, deferred) = (self.config.deferred)();

        self.replace_current(ActiveRun {
            context: context.clone(),
            kill: kill_tx,
            phase: phase_rx,
        });

        debug!(
            run = %context.id,
            actions = actions.len(),
            iterations = state.iterations,
            "Starting run"
        );

        let span = tracing::debug_span!("run", id = %context.id);
        let scheduler = Scheduler::new(
            actions,
            state,
            &self.config,
            context.clone(),
            kill_rx,
            phase_tx,
        );
        tokio::spawn(scheduler.drive(resolver).instrument(span));

        Completion { deferred, context }
    }

    /// Run `actions` a single time without an iteration callback
    pub fn run_once<I>(&self, actions: I) -> Completion
    where
        I: IntoIterator<Item = Action>,
    {
        self.run(actions, 1, None)
    }

    /// Run raw values, as loaded from a playback file
    ///
    /// Every value is converted before anything runs; an unsupported one
    /// fails the call and no run is started.
    pub fn run_values<I>(
        &self,
        values: I,
        iterations: usize,
        on_iteration: Option<IterationCallback>,
    ) -> SequencerResult<Completion>
    where
        I: IntoIterator<Item = Value>,
    {
        let actions = actions_from_values(values)?;
        Ok(self.run(actions, iterations, on_iteration))
    }

    /// Stop the current run before its next step
    ///
    /// Silent: the run's completion simply never settles.
    pub fn kill(&self) {
        let current = self.lock_current();
        if let Some(run) = current.as_ref() {
            debug!(run = %run.context.id, "Kill requested");
            run.kill.send_replace(true);
        }
    }

    /// Phase of the latest run
    pub fn phase(&self) -> Phase {
        self.lock_current()
            .as_ref()
            .map(|run| *run.phase.borrow())
            .unwrap_or_default()
    }

    /// Context of the latest run
    pub fn context(&self) -> Option<Context> {
        self.lock_current().as_ref().map(|run| run.context.clone())
    }

    fn replace_current(&self, run: ActiveRun) {
        let previous = self.lock_current().replace(run);

        if let Some(previous) = previous {
            if !previous.phase.borrow().is_terminal() {
                warn!(run = %previous.context.id, "Superseding a run still in progress, killing it");
            }
            previous.kill.send_replace(true);
        }
    }

    fn lock_current(&self) -> std::sync::MutexGuard<'_, Option<ActiveRun>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new(RunConfig::default())
    }
}
