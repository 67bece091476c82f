pub mod encoding;
pub mod input;
pub mod matcher;
pub mod output;

pub use encoding::*;
pub use input::*;
pub use matcher::*;
pub use output::*;
