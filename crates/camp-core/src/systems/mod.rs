//! Daily-tick machinery: roster health, incidents, and crisis checks.

pub mod crisis;
pub mod daily;
pub mod incidents;
