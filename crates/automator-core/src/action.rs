//! Action types
//!
//! An action is one unit of work in a sequence: a delay, a symbolic command,
//! a callback, an explicit skip, or an opaque object reserved for future use.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::deferred::HandlerResult;

/// Errors raised while building actions from raw values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// Value has no corresponding action kind
    #[error("unsupported action type: {kind} ({value})")]
    Unsupported { kind: &'static str, value: String },
}

/// Shared callback invoked by a `Callback` action
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn() -> HandlerResult + Send + Sync>);

impl Callback {
    /// Wrap a closure; its return value is converted into a [`HandlerResult`]
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: Into<HandlerResult>,
    {
        Self(Arc::new(move || f().into()))
    }

    /// Invoke the callback
    pub fn call(&self) -> HandlerResult {
        (self.0)()
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for Callback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Callback(..)")
    }
}

/// Kind of an action, used for dispatch and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Number,
    String,
    Function,
    Skip,
    Object,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ActionKind::Number => "number",
            ActionKind::String => "string",
            ActionKind::Function => "function",
            ActionKind::Skip => "skip",
            ActionKind::Object => "object",
        };
        f.pad(name)
    }
}

/// A single action in a sequence
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Wait for the given duration
    Delay(Duration),

    /// Symbolic command, e.g. a key name
    Command(String),

    /// Invoke a callback
    Callback(Callback),

    /// Explicit no-op; advances immediately without dispatch
    Skip,

    /// Reserved object payload
    Opaque(Value),
}

impl Action {
    /// Delay for a number of milliseconds
    pub fn delay_ms(ms: u64) -> Self {
        Action::Delay(Duration::from_millis(ms))
    }

    /// Symbolic command
    pub fn command(command: impl Into<String>) -> Self {
        Action::Command(command.into())
    }

    /// Callback action from a closure
    pub fn callback<F, R>(f: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: Into<HandlerResult>,
    {
        Action::Callback(Callback::new(f))
    }

    /// Get the action kind
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Delay(_) => ActionKind::Number,
            Action::Command(_) => ActionKind::String,
            Action::Callback(_) => ActionKind::Function,
            Action::Skip => ActionKind::Skip,
            Action::Opaque(_) => ActionKind::Object,
        }
    }

    /// Check if this is a delay
    pub fn is_delay(&self) -> bool {
        matches!(self, Action::Delay(_))
    }

    /// Check if this is a skip
    pub fn is_skip(&self) -> bool {
        matches!(self, Action::Skip)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Delay(d) => write!(f, "{}ms", d.as_millis()),
            Action::Command(c) => f.write_str(c),
            Action::Callback(_) => f.write_str("<callback>"),
            Action::Skip => f.write_str("~"),
            Action::Opaque(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for Action {
    fn from(s: &str) -> Self {
        Action::Command(s.to_string())
    }
}

impl From<String> for Action {
    fn from(s: String) -> Self {
        Action::Command(s)
    }
}

impl From<Duration> for Action {
    fn from(d: Duration) -> Self {
        Action::Delay(d)
    }
}

impl From<Callback> for Action {
    fn from(cb: Callback) -> Self {
        Action::Callback(cb)
    }
}

impl<T: Into<Action>> From<Option<T>> for Action {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Action::Skip)
    }
}

impl TryFrom<Value> for Action {
    type Error = ActionError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(Action::Skip),
            Value::Number(n) => Ok(Action::Delay(delay_from_millis(
                n.as_f64().unwrap_or_default(),
            ))),
            Value::String(s) => Ok(Action::Command(s)),
            Value::Object(_) => Ok(Action::Opaque(value)),
            Value::Bool(_) => Err(ActionError::Unsupported {
                kind: "boolean",
                value: value.to_string(),
            }),
            Value::Array(_) => Err(ActionError::Unsupported {
                kind: "array",
                value: value.to_string(),
            }),
        }
    }
}

/// Convert a list of raw values into actions, failing on the first
/// unsupported one
pub fn actions_from_values<I>(values: I) -> Result<Vec<Action>, ActionError>
where
    I: IntoIterator<Item = Value>,
{
    values.into_iter().map(Action::try_from).collect()
}

/// Negative and non-finite delays collapse to zero
fn delay_from_millis(ms: f64) -> Duration {
    if ms.is_finite() && ms > 0.0 {
        Duration::from_nanos((ms * 1_000_000.0).round() as u64)
    } else {
        Duration::ZERO
    }
}
