//! Application layer for Tarot-AI.
//!
//! Use cases built on the core domain: producing readings, gating premium
//! readings behind checkout, and driving the wizard for one querent.

pub mod bootstrap;
pub mod payment_gate;
pub mod prompt;
pub mod reading_service;
pub mod wizard_controller;

#[cfg(test)]
mod testing;
#[cfg(test)]
mod wizard_controller_test;

pub use bootstrap::{AppContext, AppOptions};
pub use payment_gate::{CheckoutStarted, PaymentGate, ResumeOutcome};
pub use reading_service::ReadingService;
pub use wizard_controller::{SubmitOutcome, WizardController};
