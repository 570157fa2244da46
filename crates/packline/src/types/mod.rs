use std::sync::Arc;

use packline_common::NormalizedBundlerOptions;

pub type SharedOptions = Arc<NormalizedBundlerOptions>;
