//! Company state components mutated by the daily simulation.

pub mod pressure;
pub mod roster;

pub use pressure::CompanyPressure;
pub use roster::CompanyRoster;
