//! Application layer: inspection output and the sample assembly
//!
//! This layer builds on the domain types; nothing in the domain depends on it.

pub mod error;
pub mod render;
pub mod sample;

pub use error::{ApplicationError, ApplicationResult};
pub use render::{render, render_links, render_outline, Named, TreeNodeConvert};
pub use sample::{build_sample_assembly, SampleAssembly, SampleItem};
