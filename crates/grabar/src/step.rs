//! The step model: a semantically classified group of raw events.

use crate::event::{RawEvent, RawEventKind};
use crate::target::Target;
use serde::{Deserialize, Serialize};

/// Semantic classification of a step.
///
/// A step's kind is provisional while the step is open: CLICK may become
/// DRAG, DOUBLE_CLICK or BROWSE_FILE, NAVIGATION may become REFRESH. Once the
/// step is closed the kind is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepKind {
    /// Primary-button click
    Click,
    /// Non-primary-button click
    RightClick,
    /// Two qualifying clicks within the double-click gap
    DoubleClick,
    /// Press-move-release on one or more elements
    Drag,
    /// Shortcut or key combination
    KeyPress,
    /// Free-text typing into an editable element
    Text,
    /// File selection through a file-input dialog
    BrowseFile,
    /// Files dropped onto the page
    DropFile,
    /// Leaving the page for another document
    Navigation,
    /// Scrolling one container
    Scroll,
    /// Reloading the same document
    Refresh,
    /// Viewport resize
    Resize,
    /// Pointer settling over an element
    Hover,
    /// Unclassifiable event sequence (diagnostic, not an error)
    Unknown,
}

/// A semantically classified group of raw interaction events representing
/// one user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Current classification (provisional until the step closes)
    pub kind: StepKind,
    /// Primary target, absent for page-level steps
    pub target: Option<Target>,
    /// Distinct targets visited during a multi-target interaction, in
    /// first-visit order
    pub secondary_targets: Vec<Target>,
    /// Collected events, append-only, in arrival order
    pub events: Vec<RawEvent>,
}

impl Step {
    /// Open a step around its first event.
    #[must_use]
    pub(crate) fn open(kind: StepKind, target: Option<Target>, event: RawEvent) -> Self {
        Self {
            kind,
            target,
            secondary_targets: Vec::new(),
            events: vec![event],
        }
    }

    /// Append a merged event.
    pub(crate) fn push(&mut self, event: RawEvent) {
        self.events.push(event);
    }

    /// Replace the provisional kind wholesale.
    pub(crate) fn reclassify(&mut self, kind: StepKind) {
        self.kind = kind;
    }

    /// Record a visit to a secondary target and return its index. Repeat
    /// visits reuse the existing index rather than growing the list.
    pub(crate) fn visit_secondary_target(&mut self, target: &Target) -> usize {
        match self
            .secondary_targets
            .iter()
            .position(|known| known.same_as(target))
        {
            Some(index) => index,
            None => {
                self.secondary_targets.push(target.clone());
                self.secondary_targets.len() - 1
            }
        }
    }

    /// First collected event.
    #[must_use]
    pub fn first_event(&self) -> Option<&RawEvent> {
        self.events.first()
    }

    /// Most recently collected event.
    #[must_use]
    pub fn last_event(&self) -> Option<&RawEvent> {
        self.events.last()
    }

    /// Number of collected events of a given kind.
    #[must_use]
    pub fn count_of(&self, kind: RawEventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }

    /// Whether any collected event has the given kind.
    #[must_use]
    pub fn contains(&self, kind: RawEventKind) -> bool {
        self.events.iter().any(|e| e.kind() == kind)
    }
}
