pub mod row;
pub mod stt_response;

pub use row::*;
pub use stt_response::*;
