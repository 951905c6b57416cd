//! Core types for Automator
//!
//! This crate provides the fundamental types shared by the sequencer, the
//! input bus and the configuration loader: [`Action`], [`Deferred`],
//! [`KeyEvent`], [`Context`] and the static key-code table.

mod action;
mod context;
mod deferred;
mod event;
pub mod keys;

pub use action::{actions_from_values, Action, ActionError, ActionKind, Callback};
pub use context::Context;
pub use deferred::{Deferred, HandlerResult, Resolver, Settlement};
pub use event::{InputInjector, KeyEvent, KeyEventKind};
