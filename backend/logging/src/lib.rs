pub mod logger;

pub use logger::{LogConfig, init};
