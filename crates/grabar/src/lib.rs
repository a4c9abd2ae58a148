//! Grabar: step segmentation core for in-page interaction recording.
//!
//! Grabar (Spanish: "to record") compresses a raw, high-frequency stream of
//! user-interaction events (pointer, keyboard, scroll, wheel, drag, text
//! input, navigation, resize) into a small sequence of semantically
//! meaningful *steps* — CLICK, DOUBLE_CLICK, DRAG, TEXT, SCROLL,
//! BROWSE_FILE, NAVIGATION and friends — suitable for recording or replaying
//! a user's actions.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      GRABAR Architecture                          │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐    ┌──────────────┐    ┌────────────────────┐    │
//! │  │ Capture    │    │ Temporal     │    │ Step Segmentation  │    │
//! │  │ Adapter    │───►│ Coalescing   │───►│ State Machine      │    │
//! │  │ (external) │    │ (channels)   │    │ (open/merge/close) │    │
//! │  └────────────┘    └──────────────┘    └─────────┬──────────┘    │
//! │        boundary events bypass the channels       │ steps         │
//! │        after a forced flush                      ▼               │
//! │                                        new / update / end        │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The capture adapter, selector computation and persistence are external
//! collaborators: this crate consumes already-normalized [`RawEvent`]s plus
//! opaque [`Target`] references and owns no wire format.
//!
//! # Example
//!
//! ```
//! use grabar::{RawEvent, StepKind, StepMatcher, Target};
//!
//! let mut matcher = StepMatcher::new();
//! matcher.on_end_step(|step| println!("{:?}: {} events", step.kind, step.events.len()));
//! matcher.start();
//!
//! let button = Some(Target::new(1, "button"));
//! matcher.push_event(RawEvent::pointer_down(0, 10.0, 10.0), button.clone()).unwrap();
//! matcher.push_event(RawEvent::pointer_up(90, 10.0, 10.0), button.clone()).unwrap();
//! matcher.push_event(RawEvent::click(91, 10.0, 10.0), button.clone()).unwrap();
//!
//! assert_eq!(matcher.current_step().unwrap().kind, StepKind::Click);
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod coalesce;
mod config;
mod event;
mod machine;
mod matcher;
mod predicate;
mod result;
mod step;
mod target;

pub use config::{
    MatcherConfig, DEFAULT_DOUBLE_CLICK_GAP_MS, DEFAULT_POINTER_MOVE_WINDOW_MS,
    DEFAULT_POINTER_SAMPLE_INTERVAL_MS, DEFAULT_SCROLL_WINDOW_MS, DEFAULT_WHEEL_DEBOUNCE_MS,
};
pub use event::{
    FileInfo, Modifiers, MouseButton, MoveSample, RawEvent, RawEventKind, TimestampMs,
    TransferItem,
};
pub use machine::MachineState;
pub use matcher::{LifecycleState, PushOutcome, StepMatcher};
pub use predicate::{is_file_input, is_input_like, is_modifier_key, is_same_target, is_special_key};
pub use result::{GrabarError, GrabarResult};
pub use step::{Step, StepKind};
pub use target::{Target, TargetId};

/// Convenience re-exports for downstream adapters and tests.
pub mod prelude {
    pub use super::config::MatcherConfig;
    pub use super::event::{
        FileInfo, Modifiers, MouseButton, MoveSample, RawEvent, RawEventKind, TimestampMs,
        TransferItem,
    };
    pub use super::machine::MachineState;
    pub use super::matcher::{LifecycleState, PushOutcome, StepMatcher};
    pub use super::predicate::{
        is_file_input, is_input_like, is_modifier_key, is_same_target, is_special_key,
    };
    pub use super::result::{GrabarError, GrabarResult};
    pub use super::step::{Step, StepKind};
    pub use super::target::{Target, TargetId};
}
