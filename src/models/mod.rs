pub mod device;
pub mod discovery;
pub mod rule;

pub use device::{Device, Property};
pub use discovery::{Channel, KepwareDevice, Tag};
pub use rule::{Condition, Rule};

/// What a partial update may write into a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presence {
    /// Any scalar, including null.
    Optional,
    /// Any scalar except null; blank is allowed.
    NotNull,
    /// A non-blank value, as on create.
    Required,
}

/// Updatable field: API name, column, and what it accepts.
pub type Updatable = (&'static str, &'static str, Presence);
