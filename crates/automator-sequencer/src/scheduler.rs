//! Step scheduler
//!
//! The scheduler walks the action list one action at a time. `step` runs
//! synchronously up to the next suspension point and reports a
//! [`Transition`]; `drive` is the single loop that owns the run, waits on the
//! suspension (a pending handler result, a timer, or a kill request) and
//! steps again.

use automator_core::{Action, Context, HandlerResult, Resolver};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use crate::config::RunConfig;
use crate::continuation;
use crate::handlers::Handlers;

/// Phase of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No run started yet
    #[default]
    Idle,
    /// Executing actions
    Running,
    /// Waiting for a handler's deferred result to settle
    AwaitingAsync,
    /// Sleeping between steps or iterations
    Delaying,
    /// Between two passes over the action list
    IterationBoundary,
    /// All iterations done; the completion has settled
    Completed,
    /// Stopped by a kill request
    Killed,
}

impl Phase {
    /// Check if the run can no longer make progress
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Completed | Phase::Killed)
    }
}

/// Callback invoked at the end of each iteration with its index
#[derive(Clone)]
pub struct IterationCallback(Arc<dyn Fn(usize) -> HandlerResult + Send + Sync>);

impl IterationCallback {
    /// Wrap a closure; its return value is converted into a [`HandlerResult`]
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(usize) -> R + Send + Sync + 'static,
        R: Into<HandlerResult>,
    {
        Self(Arc::new(move |index| f(index).into()))
    }

    /// Invoke the callback
    pub fn call(&self, index: usize) -> HandlerResult {
        (self.0)(index)
    }
}

impl std::fmt::Debug for IterationCallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("IterationCallback(..)")
    }
}

/// Mutable state of one run, owned by its driver
#[derive(Debug)]
pub(crate) struct RunState {
    /// Next action to execute in the current iteration
    pub action_index: usize,
    /// Current iteration, 0-based
    pub iteration_index: usize,
    /// Total number of iterations, at least 1
    pub iterations: usize,
    /// Invoked at every iteration boundary
    pub on_iteration: Option<IterationCallback>,
}

impl RunState {
    pub fn new(iterations: usize, on_iteration: Option<IterationCallback>) -> Self {
        Self {
            action_index: 0,
            iteration_index: 0,
            iterations: iterations.max(1),
            on_iteration,
        }
    }
}

/// What the driver does after a step
#[derive(Debug)]
pub(crate) enum Transition {
    /// Step again immediately
    Continue,
    /// Wait for `result` to settle, then for `delay`, then step again
    Suspend {
        result: HandlerResult,
        delay: Duration,
    },
    /// Last iteration done; settle the completion with `result`
    Finish(HandlerResult),
    /// Killed; stop for good
    Halt,
}

/// One run: the expanded action list plus the state walking it
pub(crate) struct Scheduler {
    pub(crate) actions: Vec<Action>,
    pub(crate) state: RunState,
    handlers: Handlers,
    step_delay: Duration,
    pub(crate) iteration_delay: Duration,
    pub(crate) debug: bool,
    context: Context,
    killed: watch::Receiver<bool>,
    phase: watch::Sender<Phase>,
}

impl Scheduler {
    pub fn new(
        actions: Vec<Action>,
        state: RunState,
        config: &RunConfig,
        context: Context,
        killed: watch::Receiver<bool>,
        phase: watch::Sender<Phase>,
    ) -> Self {
        Self {
            actions,
            state,
            handlers: config.handlers.clone(),
            step_delay: config.step_delay,
            iteration_delay: config.iteration_delay,
            debug: config.debug,
            context,
            killed,
            phase,
        }
    }

    fn is_killed(&self) -> bool {
        *self.killed.borrow()
    }

    pub(crate) fn set_phase(&self, phase: Phase) {
        self.phase.send_replace(phase);
    }

    /// Execute one step up to its suspension point
    pub fn step(&mut self) -> Transition {
        if self.is_killed() {
            return Transition::Halt;
        }

        if self.state.action_index >= self.actions.len() {
            return self.iteration_boundary();
        }

        let index = self.state.action_index;
        self.state.action_index += 1;
        let action = &self.actions[index];

        if action.is_skip() {
            diag!(self.debug, index, "Skipping empty action");
            return Transition::Continue;
        }

        diag!(self.debug, index, kind = %action.kind(), action = %action, "Handling action");

        let delay = self.delay_after(index);
        let result = self.handlers.dispatch(action, &self.context);

        Transition::Suspend { result, delay }
    }

    /// Pause following the action at `index`
    ///
    /// Delays are never padded with a step delay on either side, and nothing
    /// is inserted at the end of the list (or before an empty entry).
    fn delay_after(&self, index: usize) -> Duration {
        let current = &self.actions[index];
        match self.actions.get(index + 1) {
            _ if current.is_delay() => Duration::ZERO,
            None => Duration::ZERO,
            Some(next) if next.is_delay() || next.is_skip() => Duration::ZERO,
            Some(_) => self.step_delay,
        }
    }

    /// Drive the run until it completes or is killed
    pub async fn drive(mut self, completion: Resolver) {
        self.set_phase(Phase::Running);

        loop {
            match self.step() {
                Transition::Continue => {}
                Transition::Suspend { result, delay } => {
                    // A kill during the wait is observed by the next step
                    if self.settle(result).await.is_some() {
                        self.sleep(delay).await;
                    }
                    self.set_phase(Phase::Running);
                }
                Transition::Finish(result) => {
                    match self.settle(result).await {
                        Some(value) => {
                            diag!(self.debug, "Done with iterations");
                            self.set_phase(Phase::Completed);
                            completion.resolve(value);
                        }
                        None => self.halt(),
                    }
                    return;
                }
                Transition::Halt => {
                    self.halt();
                    return;
                }
            }
        }
    }

    fn halt(&self) {
        diag!(self.debug, "Killed, exiting");
        self.set_phase(Phase::Killed);
    }

    /// Wait for a handler result; None if a kill arrives first
    async fn settle(&self, result: HandlerResult) -> Option<serde_json::Value> {
        if !result.is_pending() {
            return Some(continuation::settled(result).await);
        }

        self.set_phase(Phase::AwaitingAsync);
        let mut killed = self.killed.clone();
        tokio::select! {
            value = continuation::settled(result) => Some(value),
            _ = kill_requested(&mut killed) => None,
        }
    }

    /// Sleep for `delay`; false if a kill arrives first
    async fn sleep(&self, delay: Duration) -> bool {
        if delay.is_zero() {
            return true;
        }

        diag!(self.debug, ?delay, "Sleeping");
        self.set_phase(Phase::Delaying);
        let mut killed = self.killed.clone();
        tokio::select! {
            _ = tokio::time::sleep(delay) => true,
            _ = kill_requested(&mut killed) => false,
        }
    }
}

/// Resolves once the kill flag is set; never if the switch is dropped unset
async fn kill_requested(killed: &mut watch::Receiver<bool>) {
    let outcome = killed.wait_for(|killed| *killed).await.map(|_| ());
    if outcome.is_err() {
        std::future::pending::<()>().await;
    }
}
