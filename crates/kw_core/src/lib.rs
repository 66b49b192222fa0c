pub mod error;
pub mod models;
pub mod seo;
pub mod session;
pub mod storage;
pub mod types;

pub use error::Error;
pub use models::RewriteModel;
pub use session::EditorSession;
pub use storage::KeywordStore;
pub use types::*;

pub type Result<T> = std::result::Result<T, Error>;
