//! copo-core: CO-PO attainment engine.
//!
//! This crate defines the entity model, the store seam, and the aggregators
//! that turn raw student marks into course outcome (CO) and program outcome
//! (PO) attainment percentages.

pub mod attainment;
pub mod class;
pub mod engine;
pub mod error;
pub mod index;
pub mod model;
pub mod parser;
pub mod propagation;
pub mod report;
pub mod store;
pub mod traits;

pub use engine::AttainmentEngine;
pub use error::{EntityKind, IntegrityFault, QueryError};
pub use propagation::PoScope;
pub use store::{Dataset, MemoryStore, Records};
