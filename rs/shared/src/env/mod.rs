mod env;
mod error;

pub use env::{get_env_var, home_dir};
pub use error::EnvError;
