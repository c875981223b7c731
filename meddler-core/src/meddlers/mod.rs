mod identity;
mod serialize;
mod timestamp;
mod zero_is_null;

pub use identity::*;
pub use serialize::*;
pub use timestamp::*;
pub use zero_is_null::*;
