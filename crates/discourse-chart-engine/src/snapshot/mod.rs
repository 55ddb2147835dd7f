//! # Chart Snapshots
//!
//! A flat, serializable picture of a chart, used for `insta` snapshot tests and by the
//! terminal UI to draw the grid.
//!
//! ## Modules
//!
//! - **`normalize`**: Converts a [`ChartLogic`](crate::logic::ChartLogic) into a stable `Snap`
//!   of row labels, row flags and one display string per cell
//! - **`invariants`**: Structural checks every edit must preserve (parts in column order,
//!   markers pointing at live objects, no word charted twice)

pub mod invariants;
pub mod normalize;

pub use invariants::check as invariants;
pub use normalize::{RowSnap, Snap, cell_text, normalize};
