pub mod reconstruct;
pub mod record;
pub mod viewer;

pub use reconstruct::*;
pub use record::*;
pub use viewer::*;
