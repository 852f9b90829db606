pub mod extract;
pub mod model;

pub use extract::{ParseError, extract_structured, split_sections};
pub use model::{Interpretation, PositionReading, ReadingResult, StructuredReading};
