//! `automator play`

use anyhow::{Context as _, Result};
use automator_config::PlaybackFile;
use automator_input::KeyEventBus;
use automator_sequencer::{IterationCallback, KeyEvent, RunConfig, Sequencer};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cli::{apply_settings, PlayArgs};

pub async fn run(args: &PlayArgs, debug: bool) -> Result<()> {
    let playback = PlaybackFile::load(&args.file)
        .with_context(|| format!("loading {}", args.file.display()))?;

    let settings = args.overrides(playback.settings, debug);
    let iterations = args.iterations.unwrap_or(playback.iterations);

    let bus = Arc::new(KeyEventBus::new());
    let (stop_logger, logger) = spawn_key_logger(&bus);

    let config = apply_settings(RunConfig::new().with_injector(bus.clone()), &settings);
    let sequencer = Sequencer::new(config);

    info!(
        file = %args.file.display(),
        iterations,
        step_delay_ms = settings.step_delay,
        iteration_delay_ms = settings.iteration_delay,
        "Starting playback"
    );

    let completion = sequencer.run_values(
        playback.actions,
        iterations,
        Some(IterationCallback::new(|index| {
            info!(iteration = index + 1, "Iteration finished");
            json!(index + 1)
        })),
    )?;

    tokio::select! {
        completed = completion => {
            info!(iterations = %completed, keys = bus.dispatched_count(), "Playback finished");
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            sequencer.kill();
            info!(keys = bus.dispatched_count(), "Playback killed");
        }
    }

    // Events already on the bus are still logged
    let _ = stop_logger.send(());
    logger.await?;
    Ok(())
}

/// Log every key the run presses
///
/// Once signalled, the logger drains what is already buffered and returns the
/// number of events it logged.
fn spawn_key_logger(bus: &KeyEventBus) -> (oneshot::Sender<()>, JoinHandle<u64>) {
    let mut events = bus.subscribe_all();
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        let mut logged = 0;
        loop {
            tokio::select! {
                biased;
                received = events.recv() => match received {
                    Ok(event) => {
                        log_key(&event);
                        logged += 1;
                    }
                    Err(RecvError::Lagged(skipped)) => warn!(skipped, "Key logger lagged"),
                    Err(RecvError::Closed) => break,
                },
                _ = &mut stop_rx => {
                    while let Ok(event) = events.try_recv() {
                        log_key(&event);
                        logged += 1;
                    }
                    break;
                }
            }
        }
        logged
    });

    (stop_tx, handle)
}

fn log_key(event: &KeyEvent) {
    info!(
        key = %event.symbol,
        code = event.key_code,
        run = %event.context.id,
        "{}",
        event.kind
    );
}
