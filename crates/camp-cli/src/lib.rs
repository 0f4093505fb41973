//! Session wiring for the living-camp simulation.
//!
//! The binary in this crate drives a [`session::CampSession`] hour by
//! hour; integration tests drive the same session to exercise the
//! engines together.

pub mod session;

pub use session::CampSession;
