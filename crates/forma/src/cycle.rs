//! Update Cycle
//!
//! The fixed sequence every value change goes through:
//!
//! 1. cache the new value state
//! 2. notify render subscribers
//! 3. compute the submission state
//! 4. push submission and value state to the form-integration surface
//! 5. recompose validity and push it
//!
//! A codec failure in step 3 aborts the cycle after the render notification.
//! Triggers arriving while a cycle runs are suppressed, not queued.

use std::cell::Cell;

use crate::error::{CodecError, Result, ValidityError};
use crate::value::{SubmissionState, ValueState};

/// Phase of the update cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CyclePhase {
    #[default]
    Idle,
    /// Caching and render notification
    Computing,
    /// Pushing submission state and validity
    Propagating,
}

/// Entry point that started a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// User input inside the nested structure
    Input,
    /// Content attribute `value` changed
    AttributeChanged,
    /// Programmatic `value` assignment
    ValueAssigned,
    /// `defaultValue` assignment
    DefaultValue,
    /// Form reset
    Reset,
    /// Element connected to a document
    Connected,
    /// Form state restore or autocomplete
    Restore,
}

/// Result of asking for a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The cycle ran to completion
    Applied,
    /// Live input wins over the attribute; nothing ran
    SkippedDirty,
    /// Another cycle was in progress; nothing ran
    Suppressed,
    /// The reaction does not run a cycle
    NotRun,
}

impl CycleOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// The steps a cycle drives, in the order it drives them
pub trait CycleSteps {
    fn cache(&self, value: ValueState);

    fn notify_render(&self);

    fn to_submission(&self, value: &ValueState) -> std::result::Result<SubmissionState, CodecError>;

    fn push_form_value(&self, submission: SubmissionState, value: ValueState);

    fn push_validity(&self) -> std::result::Result<(), ValidityError>;
}

/// Re-entrancy guarded cycle runner of one element
#[derive(Debug, Default)]
pub struct UpdateCycle {
    phase: Cell<CyclePhase>,
    running: Cell<Option<Trigger>>,
    completed: Cell<u64>,
}

struct PhaseGuard<'a>(&'a UpdateCycle);

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.0.phase.set(CyclePhase::Idle);
        self.0.running.set(None);
    }
}

impl UpdateCycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase.get()
    }

    pub fn is_running(&self) -> bool {
        self.phase.get() != CyclePhase::Idle
    }

    /// Number of cycles that ran to completion
    pub fn completed(&self) -> u64 {
        self.completed.get()
    }

    /// Run one cycle for `value`, unless another is in progress
    pub fn run(
        &self,
        tag: &str,
        trigger: Trigger,
        value: ValueState,
        steps: &dyn CycleSteps,
    ) -> Result<CycleOutcome> {
        if let Some(running) = self.running.get() {
            tracing::warn!(
                "<{}> {:?} trigger suppressed: {:?} cycle in progress ({:?})",
                tag,
                trigger,
                running,
                self.phase.get()
            );
            return Ok(CycleOutcome::Suppressed);
        }

        tracing::debug!("<{}> update cycle: {:?}", tag, trigger);
        self.running.set(Some(trigger));
        self.phase.set(CyclePhase::Computing);
        let _guard = PhaseGuard(self);

        steps.cache(value.clone());
        steps.notify_render();
        let submission = steps.to_submission(&value)?;

        self.phase.set(CyclePhase::Propagating);
        steps.push_form_value(submission, value);
        steps.push_validity()?;

        self.completed.set(self.completed.get() + 1);
        Ok(CycleOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CodecOperation, FormError};
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        log: RefCell<Vec<String>>,
        fail_codec: bool,
    }

    impl CycleSteps for Recorder {
        fn cache(&self, value: ValueState) {
            self.log.borrow_mut().push(format!("cache:{}", value.len()));
        }

        fn notify_render(&self) {
            self.log.borrow_mut().push("render".into());
        }

        fn to_submission(
            &self,
            value: &ValueState,
        ) -> std::result::Result<SubmissionState, CodecError> {
            if self.fail_codec {
                return Err(CodecError::ContractViolation {
                    operation: CodecOperation::ValueToSubmission,
                    expected: "string, file, or entries",
                    found: "number",
                });
            }
            self.log.borrow_mut().push("submission".into());
            Ok(SubmissionState::Entries(value.clone()))
        }

        fn push_form_value(&self, _submission: SubmissionState, _value: ValueState) {
            self.log.borrow_mut().push("form-value".into());
        }

        fn push_validity(&self) -> std::result::Result<(), ValidityError> {
            self.log.borrow_mut().push("validity".into());
            Ok(())
        }
    }

    #[test]
    fn test_fixed_order() {
        let cycle = UpdateCycle::new();
        let steps = Recorder::default();
        let outcome = cycle.run("x-test", Trigger::Input, ValueState::new(), &steps);

        assert_eq!(outcome, Ok(CycleOutcome::Applied));
        assert_eq!(
            *steps.log.borrow(),
            vec!["cache:0", "render", "submission", "form-value", "validity"]
        );
        assert_eq!(cycle.phase(), CyclePhase::Idle);
        assert_eq!(cycle.completed(), 1);
    }

    #[test]
    fn test_codec_failure_aborts_after_render() {
        let cycle = UpdateCycle::new();
        let steps = Recorder {
            fail_codec: true,
            ..Default::default()
        };
        let outcome = cycle.run("x-test", Trigger::ValueAssigned, ValueState::new(), &steps);

        assert!(matches!(outcome, Err(FormError::Codec(_))));
        assert_eq!(*steps.log.borrow(), vec!["cache:0", "render"]);
        assert!(!cycle.is_running());
        assert_eq!(cycle.completed(), 0);
    }

    struct Reentrant<'a> {
        cycle: &'a UpdateCycle,
        inner: RefCell<Option<Result<CycleOutcome>>>,
        recorder: Recorder,
    }

    impl CycleSteps for Reentrant<'_> {
        fn cache(&self, value: ValueState) {
            self.recorder.cache(value);
        }

        fn notify_render(&self) {
            let outcome = self
                .cycle
                .run("x-test", Trigger::Input, ValueState::new(), &self.recorder);
            *self.inner.borrow_mut() = Some(outcome);
        }

        fn to_submission(
            &self,
            value: &ValueState,
        ) -> std::result::Result<SubmissionState, CodecError> {
            self.recorder.to_submission(value)
        }

        fn push_form_value(&self, submission: SubmissionState, value: ValueState) {
            self.recorder.push_form_value(submission, value);
        }

        fn push_validity(&self) -> std::result::Result<(), ValidityError> {
            self.recorder.push_validity()
        }
    }

    #[test]
    fn test_reentrant_trigger_suppressed() {
        let cycle = UpdateCycle::new();
        let steps = Reentrant {
            cycle: &cycle,
            inner: RefCell::new(None),
            recorder: Recorder::default(),
        };

        let outcome = cycle.run("x-test", Trigger::Input, ValueState::new(), &steps);
        assert_eq!(outcome, Ok(CycleOutcome::Applied));
        assert_eq!(*steps.inner.borrow(), Some(Ok(CycleOutcome::Suppressed)));
        assert_eq!(cycle.completed(), 1);
    }
}
