pub mod config;
pub mod pipeline;

pub use config::AnchorConfig;
pub use pipeline::{Anchor, AnchorEngine, BlockMatch, PageResult};
