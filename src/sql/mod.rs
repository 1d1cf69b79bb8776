//! Safe SQL builder: identifiers from code only, values as parameters.

mod builder;
mod params;
pub use builder::*;
pub(crate) use builder::quoted;
