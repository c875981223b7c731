mod as_value;
mod dialect;
mod encoding;
mod error;
mod executor;
mod field;
mod mapper;
mod meddler;
mod meddlers;
mod metadata;
mod registry;
mod result_set;
mod scan;
#[cfg(test)]
mod testing;
mod util;
mod value;
mod values;

pub use ::anyhow::Context;
pub use as_value::*;
pub use dialect::*;
pub use encoding::*;
pub use error::*;
pub use executor::*;
pub use field::*;
pub use mapper::*;
pub use meddler::*;
pub use meddlers::*;
pub use metadata::*;
pub use registry::*;
pub use result_set::*;
pub use scan::*;
pub use util::*;
pub use value::*;
pub use values::*;
pub mod stream {
    pub use ::futures::stream::*;
}

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
