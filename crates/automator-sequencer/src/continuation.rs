//! Bridging handler results to the next step
//!
//! A ready result lets the sequence continue at once. A pending one holds the
//! sequence until it settles; rejection is not distinguished from
//! resolution.

use automator_core::HandlerResult;
use serde_json::Value;
use tracing::trace;

/// Wait for a handler result to settle and return its value
pub async fn settled(result: HandlerResult) -> Value {
    match result {
        HandlerResult::Ready(value) => value,
        HandlerResult::Pending(deferred) => {
            let settlement = deferred.await;
            if !settlement.is_resolved() {
                trace!(value = %settlement.value(), "Deferred rejected, continuing");
            }
            settlement.into_value()
        }
    }
}
