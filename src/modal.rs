//! Modal request payload types
//!
//! Everything a caller hands to the registry and everything a presentation
//! layer reads back out of it. The registry never interprets [`ModalContent`];
//! it is carried through untouched for whoever renders the dialog.

use chrono::Utc;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Arbitrary key/value props forwarded to the rendered component
pub type Props = serde_json::Map<String, Value>;

const ID_SUFFIX_LEN: usize = 9;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Opaque identifier of a modal request
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModalId(String);

impl ModalId {
    /// Millisecond timestamp followed by a short random base-36 suffix.
    ///
    /// Not unique on its own; the registry re-rolls against live ids.
    pub(crate) fn generate() -> Self {
        let mut rng = rand::rng();
        let suffix: String = (0..ID_SUFFIX_LEN)
            .filter_map(|_| ID_ALPHABET.choose(&mut rng).copied().map(char::from))
            .collect();
        Self(format!("{}{suffix}", Utc::now().timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ModalId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ModalId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Presentation-only width hint for a dialog surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SizeHint {
    #[serde(rename = "sm")]
    Sm,
    #[serde(rename = "md")]
    Md,
    #[serde(rename = "lg")]
    Lg,
    #[serde(rename = "xl")]
    Xl,
    #[default]
    #[serde(rename = "2xl")]
    TwoXl,
}

impl SizeHint {
    pub const ALL: [Self; 5] = [Self::Sm, Self::Md, Self::Lg, Self::Xl, Self::TwoXl];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sm => "sm",
            Self::Md => "md",
            Self::Lg => "lg",
            Self::Xl => "xl",
            Self::TwoXl => "2xl",
        }
    }
}

impl fmt::Display for SizeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown size hint
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown size hint: {0}. Supported: sm, md, lg, xl, 2xl")]
pub struct ParseSizeHintError(String);

impl FromStr for SizeHint {
    type Err = ParseSizeHintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|hint| hint.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseSizeHintError(s.to_string()))
    }
}

/// What to render inside a modal: a component descriptor plus its props
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalContent {
    pub component: String,
    #[serde(default)]
    pub props: Props,
}

impl ModalContent {
    /// Content with no props
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            props: Props::new(),
        }
    }

    pub fn with_props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }
}

/// Snapshot of one tracked request, as seen by the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModalView {
    pub id: ModalId,
    pub content: ModalContent,
    /// `false` once a close was requested; drives the exit animation
    pub visible: bool,
    pub size_hint: SizeHint,
}

/// Structural change notifications published by the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalEvent {
    /// A request was appended on top of the stack
    Opened(ModalId),
    /// A request flipped to `visible = false`
    Closing(ModalId),
    /// A single request was settled and dropped from the sequence
    Removed(ModalId),
    /// A `close_all_modals` batch was dropped in one step
    Cleared(Vec<ModalId>),
}
