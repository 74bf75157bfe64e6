//! Declarative extraction specifications
//!
//! A specification is a JSON document naming the input XML file, the parent
//! record boundaries and, per parent, the fields to extract.

pub mod loader;
pub mod model;

pub use loader::DEFAULT_SPEC_FILE_NAME;
pub use model::{FieldSpec, ParentGroup, Specification};
