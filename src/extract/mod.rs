//! Streaming extraction - turn matched XML subtrees into rows
//!
//! The input document is read incrementally; only subtrees whose element
//! matches a parent group's pattern are materialized, one at a time, as a
//! [`Fragment`]. Field paths are evaluated against that fragment.
//!
//! ## Performance
//!
//! Everything that does not depend on the document is compiled once per
//! parent group into an [`ExtractionPlan`]. Streaming stops as soon as the
//! group's row limit is reached.

pub mod element;
pub mod field;
pub mod filter;
pub mod path;
pub mod plan;
pub mod stream;
pub mod window;
pub mod writer;

pub use element::{Fragment, NodeId, QualifiedName};
pub use filter::RowFilter;
pub use path::{LocationPath, ParentPattern};
pub use plan::{ColumnPlan, ExtractionPlan};
pub use stream::ElementStream;
pub use window::Window;
pub use writer::{CsvSink, PrintSink, RowSink};
