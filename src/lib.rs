pub use meddler_core::*;
pub use meddler_macros::Record;
