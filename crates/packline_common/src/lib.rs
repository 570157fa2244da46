mod bundler_options;
mod events;
mod row;
mod stage;
mod types;

pub use crate::{
  bundler_options::{
    input_item::InputItem, module_record::ModuleRecord,
    normalized_bundler_options::NormalizedBundlerOptions, BundlerOptions, DEFAULT_EXTENSIONS,
  },
  events::{BundleObserver, PipelineEvent},
  row::Row,
  stage::{Chunk, ChunkBatch, ChunkStage, PackStage, RowBatch, RowStage, StageContext},
  types::{exports_tracker::ExportsTracker, raw_idx::RowIdx, row_id::RowId},
};
