//! Style fragments and their composition into a single renderable document

pub mod compositor;
pub mod fragment;

pub use compositor::{compose, compose_fragments, merge_source_definition, StyleDocument};
pub use fragment::{SourceDefinition, StyleFragment};
