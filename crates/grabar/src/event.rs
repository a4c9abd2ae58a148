//! Normalized raw interaction events.
//!
//! One variant per interaction primitive, as delivered by the capture
//! adapter: pointer, scroll, wheel, keyboard, text, navigation, drag family,
//! file selection and resize. Every variant carries a monotonic millisecond
//! timestamp and a kind-specific payload. Events are immutable once
//! constructed; the matcher never rewrites a stored event.

use serde::{Deserialize, Serialize};

/// Monotonic timestamp in milliseconds, as captured by the adapter.
pub type TimestampMs = u64;

/// Mouse button that produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    /// Main button (usually left)
    Primary,
    /// Wheel/middle button
    Auxiliary,
    /// Secondary button (usually right)
    Secondary,
    /// Browser-back side button
    Fourth,
    /// Browser-forward side button
    Fifth,
}

impl MouseButton {
    /// Map a DOM `MouseEvent.button` code to a button.
    ///
    /// Unknown codes collapse to `Fifth` rather than failing; the matcher
    /// only ever distinguishes primary from the rest.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Primary,
            1 => Self::Auxiliary,
            2 => Self::Secondary,
            3 => Self::Fourth,
            _ => Self::Fifth,
        }
    }

    /// Whether this is the primary button.
    #[must_use]
    pub const fn is_primary(&self) -> bool {
        matches!(self, Self::Primary)
    }
}

/// Modifier-key state captured with a pointer or keyboard event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    /// Control key held
    pub ctrl: bool,
    /// Alt key held
    pub alt: bool,
    /// Shift key held
    pub shift: bool,
    /// Meta key held
    pub meta: bool,
}

impl Modifiers {
    /// No modifiers held.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            ctrl: false,
            alt: false,
            shift: false,
            meta: false,
        }
    }
}

/// One sampled pointer position inside a composite move event.
///
/// `time_offset` is relative to the composite event's timestamp (the first
/// accepted sample of the batch).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveSample {
    /// Client X coordinate
    pub x: f64,
    /// Client Y coordinate
    pub y: f64,
    /// Milliseconds since the batch baseline
    pub time_offset: u64,
}

/// Summary of one item carried by a drag-and-drop data transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferItem {
    /// DataTransferItem kind ("file" or "string")
    pub kind: String,
    /// MIME type of the payload
    pub mime_type: String,
    /// File name, when the item is a file
    pub name: Option<String>,
}

/// One file chosen through a file-input dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// File name as reported by the picker
    pub name: String,
    /// Size in bytes
    pub size: u64,
}

/// Discriminant for [`RawEvent`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RawEventKind {
    /// Pointer button pressed
    PointerDown,
    /// Pointer button released
    PointerUp,
    /// Click (down + up on the same element)
    Click,
    /// Native double click
    DoubleClick,
    /// Non-primary-button click
    AuxClick,
    /// Composite pointer movement batch
    PointerMove,
    /// Element or document scrolled
    Scroll,
    /// Wheel rotated over an element
    Wheel,
    /// Key pressed down
    KeyDown,
    /// Character-producing key press
    KeyPress,
    /// Key released
    KeyUp,
    /// Text inserted into an editable element
    TextInput,
    /// Editable element's value committed
    TextChange,
    /// Page lost focus
    Blur,
    /// Page about to unload
    BeforeUnload,
    /// Page finished loading
    Load,
    /// Pointer settled over an element
    Hover,
    /// Drag operation started
    DragStart,
    /// Dragged element moved
    Drag,
    /// Drag entered an element
    DragEnter,
    /// Drag moved over an element
    DragOver,
    /// Drag left an element
    DragLeave,
    /// Drag operation ended
    DragEnd,
    /// Dragged payload dropped
    Drop,
    /// Files selected through a file input
    FileSelection,
    /// Viewport resized
    Resize,
}

impl RawEventKind {
    /// Whether this kind belongs to the drag event family.
    #[must_use]
    pub const fn is_drag_family(&self) -> bool {
        matches!(
            self,
            Self::DragStart
                | Self::Drag
                | Self::DragEnter
                | Self::DragOver
                | Self::DragLeave
                | Self::DragEnd
                | Self::Drop
        )
    }

    /// Whether this kind is subject to temporal coalescing (routed through a
    /// channel instead of being forwarded directly).
    #[must_use]
    pub const fn is_high_frequency(&self) -> bool {
        matches!(self, Self::PointerMove | Self::Scroll | Self::Wheel)
    }

    /// Whether events of this kind legitimately occur without a target.
    #[must_use]
    pub const fn is_page_level(&self) -> bool {
        matches!(
            self,
            Self::Blur | Self::BeforeUnload | Self::Load | Self::Resize | Self::PointerMove
        )
    }
}

/// A single normalized low-level interaction occurrence.
///
/// Constructed by the capture adapter (or by the coalescer, for composite
/// moves) and consumed one at a time by the step matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawEvent {
    /// Pointer button pressed
    PointerDown {
        /// Capture time
        timestamp: TimestampMs,
        /// Client X coordinate
        x: f64,
        /// Client Y coordinate
        y: f64,
        /// Button that went down
        button: MouseButton,
        /// Modifier-key state
        modifiers: Modifiers,
    },
    /// Pointer button released
    PointerUp {
        /// Capture time
        timestamp: TimestampMs,
        /// Client X coordinate
        x: f64,
        /// Client Y coordinate
        y: f64,
        /// Button that went up
        button: MouseButton,
        /// Modifier-key state
        modifiers: Modifiers,
    },
    /// Click (down + up on the same element)
    Click {
        /// Capture time
        timestamp: TimestampMs,
        /// Client X coordinate
        x: f64,
        /// Client Y coordinate
        y: f64,
        /// Button that clicked
        button: MouseButton,
        /// Modifier-key state
        modifiers: Modifiers,
    },
    /// Native double click
    DoubleClick {
        /// Capture time
        timestamp: TimestampMs,
        /// Client X coordinate
        x: f64,
        /// Client Y coordinate
        y: f64,
        /// Button that clicked
        button: MouseButton,
        /// Modifier-key state
        modifiers: Modifiers,
    },
    /// Non-primary-button click
    AuxClick {
        /// Capture time
        timestamp: TimestampMs,
        /// Client X coordinate
        x: f64,
        /// Client Y coordinate
        y: f64,
        /// Button that clicked
        button: MouseButton,
        /// Modifier-key state
        modifiers: Modifiers,
    },
    /// Composite pointer movement: an ordered batch of sampled positions.
    ///
    /// The timestamp is the batch baseline (first accepted sample); each
    /// sample's `time_offset` is relative to it. A freshly captured move is a
    /// single-sample batch.
    PointerMove {
        /// Batch baseline time
        timestamp: TimestampMs,
        /// Sampled positions, oldest first
        positions: Vec<MoveSample>,
    },
    /// Element or document scrolled
    Scroll {
        /// Capture time
        timestamp: TimestampMs,
        /// Horizontal scroll offset after the event
        scroll_left: f64,
        /// Vertical scroll offset after the event
        scroll_top: f64,
    },
    /// Wheel rotated over an element
    Wheel {
        /// Capture time
        timestamp: TimestampMs,
        /// Horizontal wheel delta
        delta_x: f64,
        /// Vertical wheel delta
        delta_y: f64,
    },
    /// Key pressed down
    KeyDown {
        /// Capture time
        timestamp: TimestampMs,
        /// Logical key value (`"a"`, `"Enter"`, `"F1"`, ...)
        key: String,
        /// Physical key code (`"KeyA"`, ...)
        code: String,
        /// Modifier-key state
        modifiers: Modifiers,
    },
    /// Character-producing key press
    KeyPress {
        /// Capture time
        timestamp: TimestampMs,
        /// Logical key value
        key: String,
        /// Physical key code
        code: String,
        /// Modifier-key state
        modifiers: Modifiers,
    },
    /// Key released
    KeyUp {
        /// Capture time
        timestamp: TimestampMs,
        /// Logical key value
        key: String,
        /// Physical key code
        code: String,
        /// Modifier-key state
        modifiers: Modifiers,
    },
    /// Text inserted into an editable element
    TextInput {
        /// Capture time
        timestamp: TimestampMs,
        /// Inserted text
        data: String,
        /// Element value after insertion
        value: String,
    },
    /// Editable element's value committed
    TextChange {
        /// Capture time
        timestamp: TimestampMs,
        /// Committed value
        value: String,
    },
    /// Page lost focus
    Blur {
        /// Capture time
        timestamp: TimestampMs,
    },
    /// Page about to unload
    BeforeUnload {
        /// Capture time
        timestamp: TimestampMs,
        /// Document URL at unload time
        url: String,
    },
    /// Page finished loading
    Load {
        /// Capture time
        timestamp: TimestampMs,
        /// Document URL after the load
        url: String,
    },
    /// Pointer settled over an element
    Hover {
        /// Capture time
        timestamp: TimestampMs,
        /// Client X coordinate
        x: f64,
        /// Client Y coordinate
        y: f64,
    },
    /// Drag operation started
    DragStart {
        /// Capture time
        timestamp: TimestampMs,
        /// Client X coordinate
        x: f64,
        /// Client Y coordinate
        y: f64,
        /// Modifier-key state
        modifiers: Modifiers,
        /// Allowed drop effect advertised by the source
        effect_allowed: String,
        /// Transferred item summaries
        items: Vec<TransferItem>,
        /// Index into the step's secondary-target list, set at merge time
        target_index: Option<usize>,
    },
    /// Dragged element moved
    Drag {
        /// Capture time
        timestamp: TimestampMs,
        /// Client X coordinate
        x: f64,
        /// Client Y coordinate
        y: f64,
        /// Modifier-key state
        modifiers: Modifiers,
        /// Index into the step's secondary-target list, set at merge time
        target_index: Option<usize>,
    },
    /// Drag entered an element
    DragEnter {
        /// Capture time
        timestamp: TimestampMs,
        /// Client X coordinate
        x: f64,
        /// Client Y coordinate
        y: f64,
        /// Modifier-key state
        modifiers: Modifiers,
        /// Index into the step's secondary-target list, set at merge time
        target_index: Option<usize>,
    },
    /// Drag moved over an element
    DragOver {
        /// Capture time
        timestamp: TimestampMs,
        /// Client X coordinate
        x: f64,
        /// Client Y coordinate
        y: f64,
        /// Modifier-key state
        modifiers: Modifiers,
        /// Drop effect the target would apply
        drop_effect: String,
        /// Index into the step's secondary-target list, set at merge time
        target_index: Option<usize>,
    },
    /// Drag left an element
    DragLeave {
        /// Capture time
        timestamp: TimestampMs,
        /// Client X coordinate
        x: f64,
        /// Client Y coordinate
        y: f64,
        /// Modifier-key state
        modifiers: Modifiers,
        /// Index into the step's secondary-target list, set at merge time
        target_index: Option<usize>,
    },
    /// Drag operation ended
    DragEnd {
        /// Capture time
        timestamp: TimestampMs,
        /// Client X coordinate
        x: f64,
        /// Client Y coordinate
        y: f64,
        /// Modifier-key state
        modifiers: Modifiers,
        /// Index into the step's secondary-target list, set at merge time
        target_index: Option<usize>,
    },
    /// Dragged payload dropped
    Drop {
        /// Capture time
        timestamp: TimestampMs,
        /// Client X coordinate
        x: f64,
        /// Client Y coordinate
        y: f64,
        /// Modifier-key state
        modifiers: Modifiers,
        /// Allowed drop effect advertised by the source
        effect_allowed: String,
        /// Drop effect the target applied
        drop_effect: String,
        /// Transferred item summaries
        items: Vec<TransferItem>,
        /// Index into the step's secondary-target list, set at merge time
        target_index: Option<usize>,
    },
    /// Files selected through a file input
    FileSelection {
        /// Capture time
        timestamp: TimestampMs,
        /// Selected files
        files: Vec<FileInfo>,
    },
    /// Viewport resized
    Resize {
        /// Capture time
        timestamp: TimestampMs,
        /// New viewport width in CSS pixels
        width: u32,
        /// New viewport height in CSS pixels
        height: u32,
    },
}

impl RawEvent {
    /// The variant discriminant.
    #[must_use]
    pub const fn kind(&self) -> RawEventKind {
        match self {
            Self::PointerDown { .. } => RawEventKind::PointerDown,
            Self::PointerUp { .. } => RawEventKind::PointerUp,
            Self::Click { .. } => RawEventKind::Click,
            Self::DoubleClick { .. } => RawEventKind::DoubleClick,
            Self::AuxClick { .. } => RawEventKind::AuxClick,
            Self::PointerMove { .. } => RawEventKind::PointerMove,
            Self::Scroll { .. } => RawEventKind::Scroll,
            Self::Wheel { .. } => RawEventKind::Wheel,
            Self::KeyDown { .. } => RawEventKind::KeyDown,
            Self::KeyPress { .. } => RawEventKind::KeyPress,
            Self::KeyUp { .. } => RawEventKind::KeyUp,
            Self::TextInput { .. } => RawEventKind::TextInput,
            Self::TextChange { .. } => RawEventKind::TextChange,
            Self::Blur { .. } => RawEventKind::Blur,
            Self::BeforeUnload { .. } => RawEventKind::BeforeUnload,
            Self::Load { .. } => RawEventKind::Load,
            Self::Hover { .. } => RawEventKind::Hover,
            Self::DragStart { .. } => RawEventKind::DragStart,
            Self::Drag { .. } => RawEventKind::Drag,
            Self::DragEnter { .. } => RawEventKind::DragEnter,
            Self::DragOver { .. } => RawEventKind::DragOver,
            Self::DragLeave { .. } => RawEventKind::DragLeave,
            Self::DragEnd { .. } => RawEventKind::DragEnd,
            Self::Drop { .. } => RawEventKind::Drop,
            Self::FileSelection { .. } => RawEventKind::FileSelection,
            Self::Resize { .. } => RawEventKind::Resize,
        }
    }

    /// Capture (or batch-baseline) timestamp in milliseconds.
    #[must_use]
    pub const fn timestamp(&self) -> TimestampMs {
        match self {
            Self::PointerDown { timestamp, .. }
            | Self::PointerUp { timestamp, .. }
            | Self::Click { timestamp, .. }
            | Self::DoubleClick { timestamp, .. }
            | Self::AuxClick { timestamp, .. }
            | Self::PointerMove { timestamp, .. }
            | Self::Scroll { timestamp, .. }
            | Self::Wheel { timestamp, .. }
            | Self::KeyDown { timestamp, .. }
            | Self::KeyPress { timestamp, .. }
            | Self::KeyUp { timestamp, .. }
            | Self::TextInput { timestamp, .. }
            | Self::TextChange { timestamp, .. }
            | Self::Blur { timestamp, .. }
            | Self::BeforeUnload { timestamp, .. }
            | Self::Load { timestamp, .. }
            | Self::Hover { timestamp, .. }
            | Self::DragStart { timestamp, .. }
            | Self::Drag { timestamp, .. }
            | Self::DragEnter { timestamp, .. }
            | Self::DragOver { timestamp, .. }
            | Self::DragLeave { timestamp, .. }
            | Self::DragEnd { timestamp, .. }
            | Self::Drop { timestamp, .. }
            | Self::FileSelection { timestamp, .. }
            | Self::Resize { timestamp, .. } => *timestamp,
        }
    }

    /// Return a copy of a drag-family event with its secondary-target index
    /// filled in. Non-drag variants are returned unchanged.
    #[must_use]
    pub(crate) fn with_target_index(mut self, index: usize) -> Self {
        match &mut self {
            Self::DragStart { target_index, .. }
            | Self::Drag { target_index, .. }
            | Self::DragEnter { target_index, .. }
            | Self::DragOver { target_index, .. }
            | Self::DragLeave { target_index, .. }
            | Self::DragEnd { target_index, .. }
            | Self::Drop { target_index, .. } => *target_index = Some(index),
            _ => {}
        }
        self
    }

    /// Create a primary-button pointer-down event.
    #[must_use]
    pub const fn pointer_down(timestamp: TimestampMs, x: f64, y: f64) -> Self {
        Self::PointerDown {
            timestamp,
            x,
            y,
            button: MouseButton::Primary,
            modifiers: Modifiers::none(),
        }
    }

    /// Create a pointer-down event with an explicit button.
    #[must_use]
    pub const fn pointer_down_with(
        timestamp: TimestampMs,
        x: f64,
        y: f64,
        button: MouseButton,
    ) -> Self {
        Self::PointerDown {
            timestamp,
            x,
            y,
            button,
            modifiers: Modifiers::none(),
        }
    }

    /// Create a primary-button pointer-up event.
    #[must_use]
    pub const fn pointer_up(timestamp: TimestampMs, x: f64, y: f64) -> Self {
        Self::PointerUp {
            timestamp,
            x,
            y,
            button: MouseButton::Primary,
            modifiers: Modifiers::none(),
        }
    }

    /// Create a primary-button click event.
    #[must_use]
    pub const fn click(timestamp: TimestampMs, x: f64, y: f64) -> Self {
        Self::Click {
            timestamp,
            x,
            y,
            button: MouseButton::Primary,
            modifiers: Modifiers::none(),
        }
    }

    /// Create a single-sample pointer move (what the capture adapter pushes).
    #[must_use]
    pub fn pointer_move(timestamp: TimestampMs, x: f64, y: f64) -> Self {
        Self::PointerMove {
            timestamp,
            positions: vec![MoveSample {
                x,
                y,
                time_offset: 0,
            }],
        }
    }

    /// Create a keydown event.
    #[must_use]
    pub fn key_down(timestamp: TimestampMs, key: impl Into<String>, code: impl Into<String>) -> Self {
        Self::KeyDown {
            timestamp,
            key: key.into(),
            code: code.into(),
            modifiers: Modifiers::none(),
        }
    }

    /// Create a keypress event.
    #[must_use]
    pub fn key_press(timestamp: TimestampMs, key: impl Into<String>, code: impl Into<String>) -> Self {
        Self::KeyPress {
            timestamp,
            key: key.into(),
            code: code.into(),
            modifiers: Modifiers::none(),
        }
    }

    /// Create a keyup event.
    #[must_use]
    pub fn key_up(timestamp: TimestampMs, key: impl Into<String>, code: impl Into<String>) -> Self {
        Self::KeyUp {
            timestamp,
            key: key.into(),
            code: code.into(),
            modifiers: Modifiers::none(),
        }
    }

    /// Create a text-input event.
    #[must_use]
    pub fn text_input(
        timestamp: TimestampMs,
        data: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::TextInput {
            timestamp,
            data: data.into(),
            value: value.into(),
        }
    }

    /// Create a text-change event.
    #[must_use]
    pub fn text_change(timestamp: TimestampMs, value: impl Into<String>) -> Self {
        Self::TextChange {
            timestamp,
            value: value.into(),
        }
    }

    /// Create a scroll event.
    #[must_use]
    pub const fn scroll(timestamp: TimestampMs, scroll_left: f64, scroll_top: f64) -> Self {
        Self::Scroll {
            timestamp,
            scroll_left,
            scroll_top,
        }
    }

    /// Create a wheel event.
    #[must_use]
    pub const fn wheel(timestamp: TimestampMs, delta_x: f64, delta_y: f64) -> Self {
        Self::Wheel {
            timestamp,
            delta_x,
            delta_y,
        }
    }
}
