pub mod datum;
pub mod error;
pub mod record;
pub mod types;

pub use datum::*;
pub use error::*;
pub use record::*;
pub use types::*;
