//! Run configuration

use automator_core::{Callback, Context, Deferred, HandlerResult, InputInjector, Resolver};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::handlers::{key_press_handler, Handlers};

/// Builds the deferred backing a run's completion
pub type DeferredFactory = Arc<dyn Fn() -> (Resolver, Deferred) + Send + Sync>;

/// Configuration shared by every run of a [`Sequencer`](crate::Sequencer)
#[derive(Clone)]
pub struct RunConfig {
    /// Emit per-step diagnostics
    pub debug: bool,

    /// Pause between consecutive non-delay actions
    pub step_delay: Duration,

    /// Pause between iterations
    pub iteration_delay: Duration,

    /// Async primitive used for the completion
    pub deferred: DeferredFactory,

    /// Per-kind handlers
    pub handlers: Handlers,
}

impl RunConfig {
    /// Create a config with default settings
    pub fn new() -> Self {
        Self {
            debug: false,
            step_delay: Duration::ZERO,
            iteration_delay: Duration::ZERO,
            deferred: Arc::new(Deferred::channel),
            handlers: Handlers::default(),
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    pub fn with_iteration_delay(mut self, delay: Duration) -> Self {
        self.iteration_delay = delay;
        self
    }

    /// Replace the completion's async primitive
    pub fn with_deferred<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> (Resolver, Deferred) + Send + Sync + 'static,
    {
        self.deferred = Arc::new(factory);
        self
    }

    /// Press keys through the given injector
    pub fn with_injector(mut self, injector: Arc<dyn InputInjector>) -> Self {
        self.handlers.string = key_press_handler(injector);
        self
    }

    pub fn with_number_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(Duration) -> HandlerResult + Send + Sync + 'static,
    {
        self.handlers.number = Arc::new(handler);
        self
    }

    pub fn with_string_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str, &Context) -> HandlerResult + Send + Sync + 'static,
    {
        self.handlers.string = Arc::new(handler);
        self
    }

    pub fn with_function_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Callback) -> HandlerResult + Send + Sync + 'static,
    {
        self.handlers.function = Arc::new(handler);
        self
    }

    pub fn with_object_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Value) -> HandlerResult + Send + Sync + 'static,
    {
        self.handlers.object = Arc::new(handler);
        self
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunConfig")
            .field("debug", &self.debug)
            .field("step_delay", &self.step_delay)
            .field("iteration_delay", &self.iteration_delay)
            .finish_non_exhaustive()
    }
}
