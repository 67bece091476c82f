pub mod evaluator;
pub mod status;
pub mod summary;

pub use evaluator::*;
pub use status::*;
pub use summary::*;
