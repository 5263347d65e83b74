//! # Domain Models
//!
//! Plain data types of the entity limiter: the [`rule::Rule`] value, the filter names rule
//! options may refer to, and the host configuration. No I/O lives here.

pub mod config;
pub mod filters;
pub mod rule;
