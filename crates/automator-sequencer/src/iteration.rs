//! Iteration boundaries
//!
//! When the scheduler runs off the end of the action list it either starts
//! the next pass or, after the last one, hands the final callback result to
//! the driver to settle the completion.

use automator_core::HandlerResult;

use crate::scheduler::{Phase, Scheduler, Transition};

impl Scheduler {
    /// Handle the end of one pass over the action list
    pub(crate) fn iteration_boundary(&mut self) -> Transition {
        self.set_phase(Phase::IterationBoundary);
        let iteration = self.state.iteration_index;
        diag!(self.debug, iteration, "Iteration completed");

        let candidate = match &self.state.on_iteration {
            Some(callback) => {
                diag!(self.debug, iteration, "Executing iteration callback");
                callback.call(iteration)
            }
            None => HandlerResult::none(),
        };

        self.state.iteration_index += 1;
        if self.state.iteration_index >= self.state.iterations {
            return Transition::Finish(candidate);
        }

        diag!(
            self.debug,
            iteration = self.state.iteration_index,
            "Iteration ready to start"
        );
        self.state.action_index = 0;

        Transition::Suspend {
            result: candidate,
            delay: self.iteration_delay,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::RunConfig;
    use crate::scheduler::{IterationCallback, RunState, Scheduler, Transition};
    use automator_core::{Action, Context, HandlerResult};
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::watch;

    fn scheduler(actions: Vec<Action>, state: RunState, config: &RunConfig) -> Scheduler {
        let (_kill_tx, kill_rx) = watch::channel(false);
        let (phase_tx, _) = watch::channel(Default::default());
        Scheduler::new(actions, state, config, Context::new(), kill_rx, phase_tx)
    }

    #[test]
    fn test_boundary_restarts_list_until_last_iteration() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();
        let callback = IterationCallback::new(move |i| {
            recorder.lock().unwrap().push(i);
            json!(i * 10)
        });
        let config = RunConfig::new().with_iteration_delay(Duration::from_millis(50));
        let mut s = scheduler(
            vec![Action::callback(|| ())],
            RunState::new(2, Some(callback)),
            &config,
        );

        assert!(matches!(s.step(), Transition::Suspend { .. }));
        match s.step() {
            Transition::Suspend { result, delay } => {
                assert_eq!(delay, Duration::from_millis(50));
                assert!(matches!(result, HandlerResult::Ready(v) if v == json!(0)));
            }
            other => panic!("Expected Suspend, got {:?}", other),
        }
        assert_eq!(s.state.action_index, 0);
        assert_eq!(s.state.iteration_index, 1);

        assert!(matches!(s.step(), Transition::Suspend { .. }));
        match s.step() {
            Transition::Finish(HandlerResult::Ready(v)) => assert_eq!(v, json!(10)),
            other => panic!("Expected Finish, got {:?}", other),
        }
        assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_empty_list_goes_straight_to_boundary() {
        let config = RunConfig::new();
        let mut s = scheduler(Vec::new(), RunState::new(1, None), &config);

        assert!(matches!(
            s.step(),
            Transition::Finish(HandlerResult::Ready(serde_json::Value::Null))
        ));
    }
}
