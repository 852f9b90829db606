//! The reading wizard.
//!
//! A [`ReadingSession`] walks `question → spread → card → confirm → result`.
//! Transitions live in [`wizard`]; callers never touch the selection directly.

pub mod model;
pub mod wizard;

pub use model::{ReadingRequest, ReadingSession, ReadingStatus, WizardStage};
pub use wizard::{CardSelection, SubmitAction, WizardError};
