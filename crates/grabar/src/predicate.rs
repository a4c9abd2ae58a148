//! Predicate library: the pure guard functions used by the state machine.
//!
//! Keys are identified by their logical `key` value, not the physical code
//! (`"a"` vs `"KeyA"`); the special/modifier sets below are therefore
//! layout-independent.

use crate::target::Target;

/// Navigation and function keys that never produce text. A keydown carrying
/// one of these opens a KEYPRESS step even over an editable element.
const SPECIAL_KEYS: &[&str] = &[
    "Tab",
    "Enter",
    "ArrowUp",
    "ArrowDown",
    "ArrowLeft",
    "ArrowRight",
    "Insert",
    "Delete",
    "Home",
    "End",
    "PageUp",
    "PageDown",
    "F1",
    "F2",
    "F3",
    "F4",
    "F5",
    "F6",
    "F7",
    "F8",
    "F9",
    "F10",
    "F11",
    "F12",
];

/// Modifier keys. These merge into an in-progress TEXT step instead of
/// splitting it.
const MODIFIER_KEYS: &[&str] = &["Alt", "Control", "Shift", "Meta"];

/// Input types that take no free text. An `<input>` of one of these types is
/// not input-like, so typing guards never route to it.
const NON_TEXT_INPUT_TYPES: &[&str] = &[
    "button", "checkbox", "color", "file", "image", "radio", "range", "reset", "submit",
];

/// contentEditable attribute values that put an element in editing mode.
const CONTENT_EDITABLE_VALUES: &[&str] = &["", "true", "caret", "events", "plaintext-only", "typing"];

/// Whether a logical key is a non-text navigation/function key.
#[must_use]
pub fn is_special_key(key: &str) -> bool {
    SPECIAL_KEYS.contains(&key)
}

/// Whether a logical key is a modifier (Alt, Control, Shift, Meta).
#[must_use]
pub fn is_modifier_key(key: &str) -> bool {
    MODIFIER_KEYS.contains(&key)
}

/// Whether an element accepts free-text editing: an enabled text-taking
/// `<input>`, an enabled `<textarea>`, or a contentEditable element.
#[must_use]
pub fn is_input_like(target: &Target) -> bool {
    match target.tag_name() {
        "INPUT" => {
            if target.has_attribute("disabled") {
                return false;
            }
            // a missing type attribute defaults to "text"
            target
                .attribute("type")
                .map_or(true, |ty| !NON_TEXT_INPUT_TYPES.contains(&ty))
        }
        "TEXTAREA" => !target.has_attribute("disabled"),
        _ => target
            .attribute("contenteditable")
            .is_some_and(|value| CONTENT_EDITABLE_VALUES.contains(&value)),
    }
}

/// Whether an element is a file-picker input (`<input type=file>`).
#[must_use]
pub fn is_file_input(target: &Target) -> bool {
    target.tag_name() == "INPUT" && target.attribute("type") == Some("file")
}

/// Identity equality over optional targets. An absent target is never equal
/// to anything, including another absent target.
#[must_use]
pub fn is_same_target(a: Option<&Target>, b: Option<&Target>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.same_as(b),
        _ => false,
    }
}
