//! Document assembly.
//!
//! Turns ordered, extracted pages into a renderer-agnostic
//! [`DocumentTree`](crate::model::DocumentTree): filters placeholder
//! regions, infers heading levels from font sizes, and shapes table and
//! formula content according to the format flags.

mod assembler;
mod normalize;
mod options;

pub use assembler::{DocumentAssembler, DocumentInfo};
pub use normalize::TextNormalizer;
pub use options::{AssemblyOptions, TitleLevelThresholds};
