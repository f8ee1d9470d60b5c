mod error;
mod informer;
mod lister;
mod store;
mod sync;
mod test;

pub use error::CacheError;
pub use informer::Informer;
pub use lister::Lister;
pub use store::Store;
pub use sync::SyncState;
