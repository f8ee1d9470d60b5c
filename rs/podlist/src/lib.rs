pub mod cache;
pub mod config;
pub mod constant;
pub mod error;
pub mod handler;
pub mod key;
pub mod kubeapi;
pub mod queue;
pub mod selector;
