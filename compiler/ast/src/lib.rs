pub use ast_def::*;
#[cfg(feature = "node-count")]
pub use live::live_nodes;

mod ast_def;
#[cfg(feature = "node-count")]
mod live;
mod print;
