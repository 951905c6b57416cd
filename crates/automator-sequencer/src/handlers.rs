//! Handler dispatch table
//!
//! Each action kind has a handler. The defaults delay on the tokio timer,
//! press keys through an [`InputInjector`], invoke callbacks, and ignore
//! opaque objects. Any of them can be replaced independently.

use automator_core::{
    keys, Action, Callback, Context, Deferred, HandlerResult, InputInjector, KeyEvent, Settlement,
};
use automator_input::KeyEventBus;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// Handler for `Delay` actions
pub type NumberHandler = Arc<dyn Fn(Duration) -> HandlerResult + Send + Sync>;

/// Handler for `Command` actions; receives the run context
pub type StringHandler = Arc<dyn Fn(&str, &Context) -> HandlerResult + Send + Sync>;

/// Handler for `Callback` actions
pub type FunctionHandler = Arc<dyn Fn(&Callback) -> HandlerResult + Send + Sync>;

/// Handler for `Opaque` actions
pub type ObjectHandler = Arc<dyn Fn(&Value) -> HandlerResult + Send + Sync>;

/// Maps action kinds to handlers
#[derive(Clone)]
pub struct Handlers {
    pub number: NumberHandler,
    pub string: StringHandler,
    pub function: FunctionHandler,
    pub object: ObjectHandler,
}

impl Handlers {
    /// Default handlers, pressing keys through the given injector
    pub fn with_injector(injector: Arc<dyn InputInjector>) -> Self {
        Self {
            number: Arc::new(do_number),
            string: key_press_handler(injector),
            function: Arc::new(do_function),
            object: Arc::new(do_object),
        }
    }

    /// Invoke the handler matching the action's kind
    ///
    /// `Skip` has no handler and yields an empty ready result; the scheduler
    /// never dispatches it.
    pub fn dispatch(&self, action: &Action, context: &Context) -> HandlerResult {
        match action {
            Action::Delay(duration) => (self.number)(*duration),
            Action::Command(command) => (self.string)(command, context),
            Action::Callback(callback) => (self.function)(callback),
            Action::Opaque(value) => (self.object)(value),
            Action::Skip => HandlerResult::none(),
        }
    }
}

impl Default for Handlers {
    fn default() -> Self {
        Self::with_injector(Arc::new(KeyEventBus::new()))
    }
}

impl std::fmt::Debug for Handlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handlers").finish_non_exhaustive()
    }
}

/// Default number handler: a deferred that resolves after `duration`
pub fn do_number(duration: Duration) -> HandlerResult {
    Deferred::new(async move {
        tokio::time::sleep(duration).await;
        Settlement::Resolved(Value::Null)
    })
    .into()
}

/// Default function handler: invoke the callback and hand back its result
pub fn do_function(callback: &Callback) -> HandlerResult {
    callback.call()
}

/// Default object handler: no-op
pub fn do_object(_value: &Value) -> HandlerResult {
    HandlerResult::none()
}

/// Default string handler
///
/// Looks the command up in the key-code table and dispatches a keydown event
/// through `injector`. Unknown commands are ignored.
pub fn key_press_handler(injector: Arc<dyn InputInjector>) -> StringHandler {
    Arc::new(move |command: &str, context: &Context| {
        match keys::key_code(command) {
            Some(code) => injector.dispatch(KeyEvent::key_down(command, code, context.clone())),
            None => trace!(command, "No key code for command, ignoring"),
        }
        HandlerResult::none()
    })
}
