pub mod market;
pub mod errors;
pub mod format;

pub use market::*;
pub use errors::*;
pub use format::*;
