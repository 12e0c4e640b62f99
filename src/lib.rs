//! Modal Registry - process-wide modal dialog coordinator
//!
//! Lets any part of an application open a dialog and await the user's
//! decision, while the registry owns stacking, the close animation window,
//! and cleanup of each request.

#![allow(clippy::uninlined_format_args)] // Style preference
#![allow(clippy::return_self_not_must_use)] // Builder pattern is clear enough

pub mod completion;
pub mod config;
pub mod error;
pub mod logger;
pub mod modal;
pub mod registry;

pub use completion::ModalHandle;
pub use config::RegistryConfig;
pub use error::RegistryError;
pub use modal::{ModalContent, ModalEvent, ModalId, ModalView, Props, SizeHint};
pub use registry::{ModalRegistry, ModalSnapshot};
