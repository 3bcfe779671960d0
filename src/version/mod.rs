//! Version handling: normalization, recommendation and classification
//!
//! Every version decision in the crate goes through this module:
//! - [`normalize`] turns constraint or registry text into a [`CanonicalVersion`]
//! - [`select_recommended`] picks the newest stable release in the current major
//! - [`classify`] decides the [`Status`](crate::domain::Status)

mod canonical;
mod classify;
mod normalize;
mod select;

pub use canonical::{CanonicalVersion, PublishedVersion};
pub use classify::classify;
pub use normalize::{clean_constraint, normalize, split_constraint};
pub use select::{newest_in_major, select_recommended};
