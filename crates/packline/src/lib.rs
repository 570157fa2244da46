mod bundler;
mod pipeline;
mod stages;
mod types;
mod utils;

pub use crate::bundler::Bundler;
pub use crate::pipeline::{build_pipeline, Pipeline, Segment, Stage};
pub use crate::stages::{DebugAnnotator, EmitDeps, Labeler, OutputWrapper};
pub use crate::types::SharedOptions;
pub use packline_common::*;
pub use packline_deps::GraphResolver;
pub use packline_error::{BuildError, BuildResult};
pub use packline_pack::JsPacker;
pub use packline_sort::DepsSorter;
