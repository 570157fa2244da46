mod debug;
mod emit_deps;
mod label;
mod wrap;

pub use debug::DebugAnnotator;
pub use emit_deps::EmitDeps;
pub use label::Labeler;
pub use wrap::OutputWrapper;
