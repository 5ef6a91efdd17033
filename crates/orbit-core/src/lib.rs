//! Core types and scoring engines for the Orbit relationship tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the relationship model, the in-memory [`store::RelationshipStore`], and the
//! pure engines that classify and grade relationships:
//!
//! - [`zone`]: metrics and checklist zone classification.
//! - [`energy`]: per-zone energy distribution and stability.
//! - [`rqs`]: the eight-question qualitative grade.
//! - [`tournament`]: pairwise pick rounds and lean-pattern insight.
//! - [`trend`]: rolling averages and windowed trend curves.

pub mod energy;
pub mod error;
pub mod history;
pub mod relationship;
pub mod repository;
pub mod rqs;
pub mod store;
pub mod tournament;
pub mod trend;
pub mod zone;

pub use error::{Error, Result};
