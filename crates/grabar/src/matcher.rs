//! The step matcher: lifecycle, event routing and consumer notifications.
//!
//! One matcher instance owns one segmentation machine and one coalescer.
//! The capture adapter pushes normalized events through [`StepMatcher::push_event`];
//! the lifecycle orchestrator drives [`StepMatcher::start`] /
//! [`StepMatcher::suspend`] / [`StepMatcher::stop`] and registers the step
//! callbacks. Everything runs synchronously on the caller's thread.

use crate::coalesce::{Coalescer, ScheduleOutcome};
use crate::config::MatcherConfig;
use crate::event::{RawEvent, RawEventKind};
use crate::machine::{Machine, MachineState, StepEmitter};
use crate::result::{GrabarError, GrabarResult};
use crate::step::Step;
use crate::target::Target;
use tracing::debug;

/// Lifecycle state of a matcher.
///
/// `inactive → active → suspend → active → inactive`; `suspend → inactive`
/// directly. Redundant transitions are no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// Not recording; pushing events is an error
    #[default]
    Inactive,
    /// Recording
    Active,
    /// Paused: events are dropped, accumulated state is kept
    Suspended,
}

/// What happened to a pushed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Reached the state machine (possibly after forcing a flush)
    Processed,
    /// Entered a coalescing channel: buffered for a later flush, or
    /// swallowed by a trailing-disabled throttle
    Coalesced,
    /// Dropped because the matcher is suspended
    Dropped,
}

type StepHandler = Box<dyn FnMut(&Step)>;

/// Registered consumer callbacks.
#[derive(Default)]
struct Handlers {
    on_new: Option<StepHandler>,
    on_update: Option<StepHandler>,
    on_end: Option<StepHandler>,
}

impl StepEmitter for Handlers {
    fn new_step(&mut self, step: &Step) {
        if let Some(handler) = self.on_new.as_mut() {
            handler(step);
        }
    }

    fn update_step(&mut self, step: &Step) {
        if let Some(handler) = self.on_update.as_mut() {
            handler(step);
        }
    }

    fn end_step(&mut self, step: &Step) {
        if let Some(handler) = self.on_end.as_mut() {
            handler(step);
        }
    }
}

/// Segments a pushed stream of raw events into steps.
pub struct StepMatcher {
    state: LifecycleState,
    machine: Machine,
    coalescer: Coalescer,
    handlers: Handlers,
    config: MatcherConfig,
}

impl Default for StepMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StepMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepMatcher")
            .field("state", &self.state)
            .field("machine_state", &self.machine.state())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl StepMatcher {
    /// Create a matcher with the default timing policy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MatcherConfig::default())
    }

    /// Create a matcher with an explicit timing policy.
    #[must_use]
    pub fn with_config(config: MatcherConfig) -> Self {
        Self {
            state: LifecycleState::Inactive,
            machine: Machine::new(config),
            coalescer: Coalescer::new(config),
            handlers: Handlers::default(),
            config,
        }
    }

    /// Register the new-step callback, fired the instant a step opens.
    pub fn on_new_step(&mut self, handler: impl FnMut(&Step) + 'static) {
        self.handlers.on_new = Some(Box::new(handler));
    }

    /// Register the update callback, fired on every merge.
    pub fn on_update_step(&mut self, handler: impl FnMut(&Step) + 'static) {
        self.handlers.on_update = Some(Box::new(handler));
    }

    /// Register the end callback, fired when a step closes — always before
    /// the replacement step's new-step callback for the same event.
    pub fn on_end_step(&mut self, handler: impl FnMut(&Step) + 'static) {
        self.handlers.on_end = Some(Box::new(handler));
    }

    /// Start (or resume) accepting events. Resuming from a suspension loses
    /// nothing: the open step and pending batches continue accumulating.
    pub fn start(&mut self) {
        debug!(from = ?self.state, "matcher started");
        self.state = LifecycleState::Active;
    }

    /// Pause: subsequent events are dropped, accumulated state is kept.
    /// No-op unless active.
    pub fn suspend(&mut self) {
        if self.state == LifecycleState::Active {
            debug!("matcher suspended");
            self.state = LifecycleState::Suspended;
        }
    }

    /// Stop recording. Pending coalescing state and any open step are
    /// discarded without being emitted — explicit non-completion, not an
    /// error.
    pub fn stop(&mut self) {
        debug!(from = ?self.state, "matcher stopped");
        self.state = LifecycleState::Inactive;
        self.coalescer.clear();
        self.machine.reset();
    }

    /// Push one normalized event (with the target it occurred on) into the
    /// matcher.
    ///
    /// High-frequency kinds (pointer-move, scroll, wheel) route through
    /// their coalescing channels. Everything else forces a full flush first,
    /// so buffered composites are never attributed to the wrong step, then
    /// reaches the machine directly.
    pub fn push_event(
        &mut self,
        event: RawEvent,
        target: Option<Target>,
    ) -> GrabarResult<PushOutcome> {
        match self.state {
            LifecycleState::Inactive => return Err(GrabarError::Inactive),
            LifecycleState::Suspended => return Ok(PushOutcome::Dropped),
            LifecycleState::Active => {}
        }

        let now = event.timestamp();
        // settle any window that elapsed before this event
        for (flushed, flushed_target) in self.coalescer.poll(now) {
            self.machine.process(flushed, flushed_target, &mut self.handlers);
        }

        if event.kind().is_high_frequency() {
            let is_wheel = event.kind() == RawEventKind::Wheel;
            match self.coalescer.schedule(event, target) {
                ScheduleOutcome::Forward(forwarded, forwarded_target) => {
                    // a forwarded wheel is a step boundary: flush everything
                    // ahead of it
                    if is_wheel {
                        for (flushed, flushed_target) in self.coalescer.flush_all(now) {
                            self.machine
                                .process(flushed, flushed_target, &mut self.handlers);
                        }
                    }
                    self.machine
                        .process(forwarded, forwarded_target, &mut self.handlers);
                    Ok(PushOutcome::Processed)
                }
                ScheduleOutcome::Buffered | ScheduleOutcome::Swallowed => {
                    Ok(PushOutcome::Coalesced)
                }
            }
        } else {
            for (flushed, flushed_target) in self.coalescer.flush_all(now) {
                self.machine
                    .process(flushed, flushed_target, &mut self.handlers);
            }
            self.machine.process(event, target, &mut self.handlers);
            Ok(PushOutcome::Processed)
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn lifecycle(&self) -> LifecycleState {
        self.state
    }

    /// Current segmentation state.
    #[must_use]
    pub fn machine_state(&self) -> MachineState {
        self.machine.state()
    }

    /// The step currently accumulating, if any.
    #[must_use]
    pub fn current_step(&self) -> Option<&Step> {
        self.machine.current_step()
    }

    /// The most recently closed step, if any.
    #[must_use]
    pub fn previous_step(&self) -> Option<&Step> {
        self.machine.previous_step()
    }

    /// The timing policy this matcher runs with.
    #[must_use]
    pub const fn config(&self) -> &MatcherConfig {
        &self.config
    }
}
