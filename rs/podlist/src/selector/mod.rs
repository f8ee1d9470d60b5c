mod error;
mod matches;
mod parse;

pub use error::SelectorError;
pub use matches::matches_resource;
pub use parse::parse_selector;
