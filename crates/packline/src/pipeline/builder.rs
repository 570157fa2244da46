use packline_common::ExportsTracker;
use packline_deps::GraphResolver;
use packline_pack::JsPacker;
use packline_sort::DepsSorter;

use crate::stages::{DebugAnnotator, EmitDeps, Labeler, OutputWrapper};
use crate::types::SharedOptions;

use super::{Pipeline, Segment, Stage};

/// Assemble the default pipeline. Segment names are stable API: external
/// collaborators locate, insert around, or replace stages by these names.
///
/// Order: `deps` expands the written rows into the full module set, `sort`
/// fixes the stream order, `label` assigns final identifiers, an anonymous
/// stage announces rows, `debug` attaches source metadata, `pack`
/// serializes, `wrap` conditionally prefixes the first chunk.
pub fn build_pipeline(options: &SharedOptions, exports: ExportsTracker) -> Pipeline {
  Pipeline::from_segments(vec![
    Segment::named("deps", Stage::Row(Box::new(GraphResolver::new(options)))),
    Segment::named("sort", Stage::Row(Box::new(DepsSorter::default()))),
    Segment::named("label", Stage::Row(Box::new(Labeler::default()))),
    Segment::anonymous(Stage::Row(Box::new(EmitDeps))),
    Segment::named("debug", Stage::Row(Box::new(DebugAnnotator::new(options.debug)))),
    Segment::named("pack", Stage::Pack(Box::new(JsPacker::default()))),
    Segment::named("wrap", Stage::Chunk(Box::new(OutputWrapper::new(options, exports)))),
  ])
}
