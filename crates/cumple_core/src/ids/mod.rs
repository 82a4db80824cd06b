//! Identifier generation: container slugs and group trust codes.
//!
//! Both generators are pure apart from the RNG used for trust codes.

pub mod slug;
pub mod trust_code;
