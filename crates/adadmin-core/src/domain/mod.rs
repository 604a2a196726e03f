//! Domain entities
//!
//! Each entity embeds an [`EntityBase`](crate::entity::EntityBase), declares
//! its own field rules and forwards the chained operations to
//! [`entity::ops`](crate::entity::ops).

pub mod directory_user;
pub mod feature;
pub mod lease;
pub mod rules;

pub use directory_user::DirectoryUser;
pub use feature::FeatureSpec;
pub use lease::LeaseRecord;
