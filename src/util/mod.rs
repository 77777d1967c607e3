pub mod guard;
pub mod logger;

pub use logger::SimpleLogger;
