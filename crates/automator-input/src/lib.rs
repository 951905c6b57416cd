//! Key event bus for Automator
//!
//! This crate provides the KeyEventBus, the default input-injection
//! subsystem. The sequencer's string handler dispatches synthesized key
//! events into the bus; whatever is being driven subscribes to the codes it
//! cares about, or to everything.

use automator_core::{keys, InputInjector, KeyEvent};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Default channel capacity for key subscriptions
const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// The bus delivering synthesized key events to subscribers
///
/// Supports:
/// - Subscribing to a single key code (or its symbol)
/// - Subscribing to every key (match-all)
/// - Dispatching events to all matching subscribers
pub struct KeyEventBus {
    /// Map of key codes to their broadcast senders
    listeners: DashMap<u16, broadcast::Sender<KeyEvent>>,
    /// Sender for match-all subscribers
    match_all_sender: broadcast::Sender<KeyEvent>,
    /// Number of events dispatched so far
    dispatched: AtomicU64,
    /// Channel capacity
    capacity: usize,
}

impl KeyEventBus {
    /// Create a new key event bus
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new key event bus with specified channel capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let (match_all_sender, _) = broadcast::channel(capacity);
        Self {
            listeners: DashMap::new(),
            match_all_sender,
            dispatched: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to events carrying the given key code
    pub fn subscribe(&self, key_code: u16) -> broadcast::Receiver<KeyEvent> {
        trace!(key_code, "Subscribing to key code");

        self.listeners
            .entry(key_code)
            .or_insert_with(|| {
                let (tx, _) = broadcast::channel(self.capacity);
                tx
            })
            .subscribe()
    }

    /// Subscribe to a key by symbol
    ///
    /// Returns None if the symbol is not in the key-code table.
    pub fn subscribe_symbol(&self, symbol: &str) -> Option<broadcast::Receiver<KeyEvent>> {
        keys::key_code(symbol).map(|code| self.subscribe(code))
    }

    /// Subscribe to all key events
    pub fn subscribe_all(&self) -> broadcast::Receiver<KeyEvent> {
        self.match_all_sender.subscribe()
    }

    /// Dispatch an event to all subscribers
    ///
    /// The event will be delivered to:
    /// 1. All subscribers of its key code
    /// 2. All match-all subscribers
    pub fn dispatch(&self, event: KeyEvent) {
        debug!(
            kind = %event.kind,
            key_code = event.key_code,
            symbol = %event.symbol,
            "Dispatching key event"
        );
        self.dispatched.fetch_add(1, Ordering::SeqCst);

        if let Some(sender) = self.listeners.get(&event.key_code) {
            // No active receivers is fine
            let _ = sender.send(event.clone());
        }

        let _ = self.match_all_sender.send(event);
    }

    /// Number of events dispatched since the bus was created
    pub fn dispatched_count(&self) -> u64 {
        self.dispatched.load(Ordering::SeqCst)
    }

    /// Get the number of key codes with subscriptions
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for KeyEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl InputInjector for KeyEventBus {
    fn dispatch(&self, event: KeyEvent) {
        KeyEventBus::dispatch(self, event);
    }
}
