use kw_core::KeywordStore;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cms::CmsClient;
use crate::optimize::OptimizeService;

pub struct AppState {
    pub store: Arc<dyn KeywordStore>,
    pub optimizer: OptimizeService,
    pub cms: CmsClient,
    /// Built single-page app served for every unmatched path
    pub static_dir: Option<PathBuf>,
}
