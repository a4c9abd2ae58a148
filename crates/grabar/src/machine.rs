//! Step segmentation state machine.
//!
//! Consumes one normalized raw event at a time, decides whether it starts a
//! new step, merges into the open step, or closes the open step, and fires
//! the consumer notifications. States form a closed enumeration; transitions
//! are a pure function of `(state, context, event)` evaluated by a small
//! interpreter — no external state-machine runtime.
//!
//! Rule layering mirrors the behavior this machine segments: state-local
//! rules run first while a step is open; events they reject fall through to
//! the global open-classification table, which also routes the first event
//! when no step is open. `mousemove`, `keyup` and `blur` never open a step.

use crate::config::MatcherConfig;
use crate::event::{MouseButton, MoveSample, RawEvent, RawEventKind, TimestampMs};
use crate::predicate::{is_file_input, is_input_like, is_same_target, is_special_key};
use crate::step::{Step, StepKind};
use crate::target::Target;
use tracing::{debug, trace};

/// Machine states: one per step kind, plus the idle `Init` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MachineState {
    /// No step open
    Init,
    /// Accumulating a CLICK step
    Click,
    /// Accumulating a RIGHT_CLICK step
    RightClick,
    /// Accumulating a DOUBLE_CLICK step
    DoubleClick,
    /// Accumulating a DRAG step
    Drag,
    /// Accumulating a KEYPRESS step
    KeyPress,
    /// Accumulating a TEXT step
    Text,
    /// Accumulating a BROWSE_FILE step
    BrowseFile,
    /// Accumulating a DROP_FILE step
    DropFile,
    /// Accumulating a NAVIGATION step
    Navigation,
    /// Accumulating a SCROLL step
    Scroll,
    /// Accumulating a REFRESH step
    Refresh,
    /// Accumulating a RESIZE step
    Resize,
    /// Accumulating a HOVER step
    Hover,
    /// Accumulating an UNKNOWN step
    Unknown,
}

impl MachineState {
    /// State corresponding to an open step of the given kind.
    #[must_use]
    pub const fn of(kind: StepKind) -> Self {
        match kind {
            StepKind::Click => Self::Click,
            StepKind::RightClick => Self::RightClick,
            StepKind::DoubleClick => Self::DoubleClick,
            StepKind::Drag => Self::Drag,
            StepKind::KeyPress => Self::KeyPress,
            StepKind::Text => Self::Text,
            StepKind::BrowseFile => Self::BrowseFile,
            StepKind::DropFile => Self::DropFile,
            StepKind::Navigation => Self::Navigation,
            StepKind::Scroll => Self::Scroll,
            StepKind::Refresh => Self::Refresh,
            StepKind::Resize => Self::Resize,
            StepKind::Hover => Self::Hover,
            StepKind::Unknown => Self::Unknown,
        }
    }
}

/// Consumer notification surface. `end_step` for a closing step always fires
/// before `new_step` for its replacement.
pub(crate) trait StepEmitter {
    /// A step was opened around its first event.
    fn new_step(&mut self, step: &Step);
    /// An event merged into the open step (its kind may have changed).
    fn update_step(&mut self, step: &Step);
    /// The open step was closed and will never change again.
    fn end_step(&mut self, step: &Step);
}

/// What the interpreter should do with one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    /// Drop the event entirely
    Ignore,
    /// Open a new step of this kind around the event
    Open(StepKind),
    /// Append to the open step
    Merge,
    /// Reclassify the open step, then append
    MergeAs(StepKind),
    /// Close the open step and route the event through the open table
    CloseThenRoute,
    /// Close the open step without collecting the event (page blur)
    CloseOnly,
}

/// Per-machine accumulation state: the one open step and the most recently
/// closed one (consulted only by guards).
#[derive(Debug, Default)]
pub(crate) struct MatcherContext {
    pub(crate) current_step: Option<Step>,
    pub(crate) previous_step: Option<Step>,
}

/// The segmentation machine: context plus the guard policy constants.
#[derive(Debug)]
pub(crate) struct Machine {
    config: MatcherConfig,
    ctx: MatcherContext,
}

impl Machine {
    pub(crate) fn new(config: MatcherConfig) -> Self {
        Self {
            config,
            ctx: MatcherContext::default(),
        }
    }

    /// Current machine state.
    pub(crate) fn state(&self) -> MachineState {
        self.ctx
            .current_step
            .as_ref()
            .map_or(MachineState::Init, |step| MachineState::of(step.kind))
    }

    pub(crate) fn current_step(&self) -> Option<&Step> {
        self.ctx.current_step.as_ref()
    }

    pub(crate) fn previous_step(&self) -> Option<&Step> {
        self.ctx.previous_step.as_ref()
    }

    /// Discard all accumulation state without emitting anything.
    pub(crate) fn reset(&mut self) {
        self.ctx.current_step = None;
        self.ctx.previous_step = None;
    }

    /// Feed one event through the transition function and apply the result.
    pub(crate) fn process(
        &mut self,
        event: RawEvent,
        target: Option<Target>,
        emitter: &mut dyn StepEmitter,
    ) {
        let action = self.transition(&event, target.as_ref());
        trace!(kind = ?event.kind(), ?action, state = ?self.state(), "routed event");
        match action {
            Action::Ignore => {}
            Action::Open(kind) => self.open_step(kind, target, event, emitter),
            Action::Merge => self.merge_step(event, target.as_ref(), None, emitter),
            Action::MergeAs(kind) => self.merge_step(event, target.as_ref(), Some(kind), emitter),
            Action::CloseOnly => self.close_current(emitter),
            Action::CloseThenRoute => {
                self.close_current(emitter);
                if let Action::Open(kind) = open_action(&event, target.as_ref()) {
                    self.open_step(kind, target, event, emitter);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Transition function (pure: reads context, never mutates)
    // ------------------------------------------------------------------

    fn transition(&self, event: &RawEvent, target: Option<&Target>) -> Action {
        let Some(step) = self.ctx.current_step.as_ref() else {
            return open_action(event, target);
        };

        // A page-level blur terminates the open step, except while a file
        // dialog is up (the picker blurs the page transiently). Blur itself
        // is never collected.
        if event.kind() == RawEventKind::Blur {
            return if target.is_none() && step.kind != StepKind::BrowseFile {
                Action::CloseOnly
            } else {
                Action::Ignore
            };
        }

        let local = match step.kind {
            StepKind::Click => self.on_click(step, event, target),
            StepKind::RightClick => on_right_click(event),
            StepKind::DoubleClick => on_double_click(event),
            StepKind::Drag => on_drag(step, event),
            StepKind::KeyPress => on_key_press(step, event, target),
            StepKind::Text => on_text(step, event, target),
            StepKind::Scroll => on_scroll(step, event, target),
            StepKind::Navigation => on_navigation(step, event),
            StepKind::BrowseFile => on_browse_file(event),
            StepKind::Hover => on_hover(step, event, target),
            StepKind::Resize => on_resize(event),
            StepKind::DropFile | StepKind::Refresh | StepKind::Unknown => None,
        };
        local.unwrap_or_else(|| default_route(event))
    }

    /// CLICK-local rules: double-click promotion, held-button chords, the
    /// drag promotion with its jitter guard, and file-picker reclassification.
    fn on_click(&self, step: &Step, event: &RawEvent, target: Option<&Target>) -> Option<Action> {
        match event {
            RawEvent::PointerDown {
                timestamp, button, ..
            } => {
                if self.qualifies_double_click(step, *button, *timestamp, target) {
                    return Some(Action::MergeAs(StepKind::DoubleClick));
                }
                // a button is still held: downs run one ahead of ups
                if step.count_of(RawEventKind::PointerDown)
                    == step.count_of(RawEventKind::PointerUp) + 1
                {
                    return Some(Action::Merge);
                }
                Some(Action::CloseThenRoute)
            }
            RawEvent::PointerMove { positions, .. } => Some(classify_click_move(step, positions)),
            RawEvent::Click { .. } => {
                if target.is_some_and(is_file_input) {
                    Some(Action::MergeAs(StepKind::BrowseFile))
                } else {
                    Some(Action::Merge)
                }
            }
            RawEvent::PointerUp { .. }
            | RawEvent::AuxClick { .. }
            | RawEvent::DoubleClick { .. } => Some(Action::Merge),
            _ => None,
        }
    }

    /// A pointer-down chains into DOUBLE_CLICK when the open CLICK step ends
    /// with a click of the same button on the same target inside the gap,
    /// and the previously *closed* step was not itself a double click
    /// (otherwise triple clicks would chain into one unit).
    fn qualifies_double_click(
        &self,
        step: &Step,
        button: MouseButton,
        timestamp: TimestampMs,
        target: Option<&Target>,
    ) -> bool {
        let previous_was_double = self
            .ctx
            .previous_step
            .as_ref()
            .is_some_and(|p| p.kind == StepKind::DoubleClick);
        if previous_was_double {
            return false;
        }
        let Some(RawEvent::Click {
            timestamp: click_ts,
            button: click_button,
            ..
        }) = step.last_event()
        else {
            return false;
        };
        button == *click_button
            && timestamp.saturating_sub(*click_ts) <= self.config.double_click_gap_ms
            && is_same_target(step.target.as_ref(), target)
    }

    // ------------------------------------------------------------------
    // Interpreter actions
    // ------------------------------------------------------------------

    fn open_step(
        &mut self,
        kind: StepKind,
        target: Option<Target>,
        event: RawEvent,
        emitter: &mut dyn StepEmitter,
    ) {
        debug_assert!(
            self.ctx.current_step.is_none(),
            "opening a step while one is open"
        );
        let step = Step::open(kind, target, event);
        debug!(?kind, "step opened");
        emitter.new_step(&step);
        self.ctx.current_step = Some(step);
    }

    fn merge_step(
        &mut self,
        event: RawEvent,
        target: Option<&Target>,
        reclassify: Option<StepKind>,
        emitter: &mut dyn StepEmitter,
    ) {
        let Some(step) = self.ctx.current_step.as_mut() else {
            return;
        };
        if let Some(kind) = reclassify {
            debug!(from = ?step.kind, to = ?kind, "step reclassified");
            step.reclassify(kind);
        }
        // Multi-target drag bookkeeping: over/enter/leave/drop events record
        // which secondary target they visited.
        let event = if step.kind == StepKind::Drag && wants_target_index(event.kind()) {
            match target {
                Some(t) => {
                    let index = step.visit_secondary_target(t);
                    event.with_target_index(index)
                }
                None => event,
            }
        } else {
            event
        };
        step.push(event);
        emitter.update_step(step);
    }

    fn close_current(&mut self, emitter: &mut dyn StepEmitter) {
        if let Some(step) = self.ctx.current_step.take() {
            debug!(kind = ?step.kind, events = step.events.len(), "step closed");
            emitter.end_step(&step);
            self.ctx.previous_step = Some(step);
        }
    }
}

/// Whether a drag-family event records a secondary-target visit.
const fn wants_target_index(kind: RawEventKind) -> bool {
    matches!(
        kind,
        RawEventKind::DragEnter
            | RawEventKind::DragOver
            | RawEventKind::DragLeave
            | RawEventKind::Drop
    )
}

/// CLICK-state mousemove classification: promote a clean down→move chain to
/// DRAG, but drop the zero-delta sample the browser fires right after a
/// pointer down at the same spot.
fn classify_click_move(step: &Step, positions: &[MoveSample]) -> Action {
    let clean_chain = step
        .first_event()
        .is_some_and(|e| e.kind() == RawEventKind::PointerDown)
        && step.events[1..]
            .iter()
            .all(|e| e.kind() == RawEventKind::PointerMove);
    if !clean_chain {
        return Action::Ignore;
    }
    if let Some(RawEvent::PointerDown { x, y, .. }) = step.last_event() {
        if positions.len() == 1 && positions[0].x == *x && positions[0].y == *y {
            return Action::Ignore;
        }
    }
    Action::MergeAs(StepKind::Drag)
}

fn on_right_click(event: &RawEvent) -> Option<Action> {
    match event {
        RawEvent::PointerUp { .. } | RawEvent::AuxClick { .. } | RawEvent::Click { .. } => {
            Some(Action::Merge)
        }
        _ => None,
    }
}

fn on_double_click(event: &RawEvent) -> Option<Action> {
    match event {
        RawEvent::PointerUp { .. } | RawEvent::Click { .. } | RawEvent::DoubleClick { .. } => {
            Some(Action::Merge)
        }
        // a further pointer-down always starts a new step; triple clicks do
        // not chain into one unit
        _ => None,
    }
}

fn on_drag(step: &Step, event: &RawEvent) -> Option<Action> {
    match event.kind() {
        RawEventKind::PointerMove => {
            // stop accumulating movement once the button was released
            if step.contains(RawEventKind::PointerUp) || step.contains(RawEventKind::DragEnd) {
                Some(Action::Ignore)
            } else {
                Some(Action::Merge)
            }
        }
        RawEventKind::PointerUp | RawEventKind::Click => Some(Action::Merge),
        kind if kind.is_drag_family() => Some(Action::Merge),
        _ => None,
    }
}

fn on_key_press(step: &Step, event: &RawEvent, target: Option<&Target>) -> Option<Action> {
    match event {
        RawEvent::KeyDown { .. } => {
            if !is_same_target(step.target.as_ref(), target) {
                return Some(Action::CloseThenRoute);
            }
            // keydowns running ahead of keyups means a combination is held
            if step.count_of(RawEventKind::KeyDown) > step.count_of(RawEventKind::KeyUp) {
                Some(Action::Merge)
            } else {
                Some(Action::CloseThenRoute)
            }
        }
        RawEvent::KeyPress { .. } | RawEvent::KeyUp { .. } => Some(Action::Merge),
        _ => None,
    }
}

fn on_text(step: &Step, event: &RawEvent, target: Option<&Target>) -> Option<Action> {
    match event {
        RawEvent::KeyDown { key, .. } => {
            if !is_same_target(step.target.as_ref(), target) || is_special_key(key) {
                Some(Action::CloseThenRoute)
            } else {
                // modifier keydowns merge while typing
                Some(Action::Merge)
            }
        }
        RawEvent::KeyPress { .. } | RawEvent::KeyUp { .. } => Some(Action::Merge),
        RawEvent::TextInput { .. } | RawEvent::TextChange { .. } => {
            if is_same_target(step.target.as_ref(), target) {
                Some(Action::Merge)
            } else {
                Some(Action::CloseThenRoute)
            }
        }
        _ => None,
    }
}

fn on_scroll(step: &Step, event: &RawEvent, target: Option<&Target>) -> Option<Action> {
    match event {
        RawEvent::Scroll { .. } | RawEvent::Wheel { .. } => {
            if is_same_target(step.target.as_ref(), target) {
                Some(Action::Merge)
            } else {
                // a wheel over another container opens a fresh SCROLL step;
                // a stray scroll routes through the open table
                Some(Action::CloseThenRoute)
            }
        }
        _ => None,
    }
}

fn on_navigation(step: &Step, event: &RawEvent) -> Option<Action> {
    match event {
        RawEvent::Load { url, .. } => {
            let unload_url = match step.first_event() {
                Some(RawEvent::BeforeUnload { url, .. }) => Some(url.as_str()),
                _ => None,
            };
            if unload_url == Some(url.as_str()) {
                Some(Action::MergeAs(StepKind::Refresh))
            } else {
                Some(Action::Merge)
            }
        }
        _ => None,
    }
}

fn on_browse_file(event: &RawEvent) -> Option<Action> {
    match event {
        // multi-select across repeated dialogs
        RawEvent::FileSelection { .. } => Some(Action::Merge),
        RawEvent::PointerUp { .. } | RawEvent::Click { .. } | RawEvent::AuxClick { .. } => {
            Some(Action::Merge)
        }
        _ => None,
    }
}

fn on_hover(step: &Step, event: &RawEvent, target: Option<&Target>) -> Option<Action> {
    match event {
        RawEvent::Hover { .. } => {
            if is_same_target(step.target.as_ref(), target) {
                Some(Action::Merge)
            } else {
                Some(Action::CloseThenRoute)
            }
        }
        _ => None,
    }
}

fn on_resize(event: &RawEvent) -> Option<Action> {
    match event {
        RawEvent::Resize { .. } => Some(Action::Merge),
        _ => None,
    }
}

/// Global fallback for events no state-local rule claimed: the exclusion set
/// never causes a boundary; everything else closes and reroutes.
fn default_route(event: &RawEvent) -> Action {
    match event.kind() {
        RawEventKind::PointerMove | RawEventKind::KeyUp | RawEventKind::Blur => Action::Ignore,
        _ => Action::CloseThenRoute,
    }
}

/// The open-classification table: what a boundary event opens when no step
/// is accumulating. Events other than the page-level kinds need a target to
/// anchor a step; without one they are dropped.
fn open_action(event: &RawEvent, target: Option<&Target>) -> Action {
    if target.is_none() && !event.kind().is_page_level() {
        return Action::Ignore;
    }
    match event {
        RawEvent::PointerDown { button, .. } => Action::Open(if button.is_primary() {
            StepKind::Click
        } else {
            StepKind::RightClick
        }),
        RawEvent::KeyDown { key, .. } => {
            let typing = target.is_some_and(is_input_like) && !is_special_key(key);
            Action::Open(if typing {
                StepKind::Text
            } else {
                StepKind::KeyPress
            })
        }
        RawEvent::TextInput { .. } | RawEvent::TextChange { .. } => Action::Open(StepKind::Text),
        RawEvent::Drop { items, .. } if !items.is_empty() => Action::Open(StepKind::DropFile),
        RawEvent::Wheel { .. } => Action::Open(StepKind::Scroll),
        RawEvent::FileSelection { .. } => Action::Open(StepKind::BrowseFile),
        RawEvent::Hover { .. } => Action::Open(StepKind::Hover),
        RawEvent::DragEnter { .. } => Action::Open(StepKind::Drag),
        RawEvent::BeforeUnload { .. } => Action::Open(StepKind::Navigation),
        RawEvent::Resize { .. } => Action::Open(StepKind::Resize),
        RawEvent::PointerMove { .. } | RawEvent::KeyUp { .. } | RawEvent::Blur { .. } => {
            Action::Ignore
        }
        _ => Action::Open(StepKind::Unknown),
    }
}
