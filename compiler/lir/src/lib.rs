pub use lir_def::*;

mod lir_def;
mod print;
