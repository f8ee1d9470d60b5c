mod error;
mod key;

pub use error::KeyError;
pub use key::{object_key, ObjectKey};
