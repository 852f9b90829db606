//! Domain layer for Tarot-AI.
//!
//! Holds everything that does not talk to the outside world: the Major Arcana
//! catalog, spread layouts, the reading wizard, reading results and the
//! extraction of structured readings from model output. Adapters for the AI
//! backend, the payment provider and resume storage plug in through the traits
//! in [`agent`], [`checkout`] and [`resume`].

pub mod agent;
pub mod card;
pub mod checkout;
pub mod config;
pub mod error;
pub mod reading;
pub mod resume;
pub mod session;
pub mod spread;

pub use card::{Card, MAJOR_ARCANA};
pub use error::{Result, TarotError};
pub use reading::{Interpretation, PositionReading, ReadingResult, StructuredReading};
pub use session::{ReadingRequest, ReadingSession, WizardError, WizardStage};
pub use spread::{ReadingTier, SpreadType};
