pub mod types;
pub mod board;
pub mod rules;
pub mod engine;

pub use types::*;
pub use board::*;
pub use rules::*;
pub use engine::*;
