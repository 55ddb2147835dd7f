pub mod chart;
pub mod error;
pub mod io;
pub mod logic;
pub mod snapshot;
pub mod text;

// Re-export key types for easier usage
pub use chart::{Chart, ChartLocation, ClauseType, PartId, PossibilityId, RowId, TemplateNode};
pub use error::ChartError;
pub use io::IoError;
pub use logic::{ChartEvent, ChartLogic, ChartSettings};
pub use text::{Occurrence, Text};
