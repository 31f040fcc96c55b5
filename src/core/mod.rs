//! Core invoice types, the GST tax engine, numbering and validation.
//!
//! Everything in this module is free of I/O. Persistence of the per-hotel
//! counter lives behind the `issuer` feature.

mod builder;
mod config;
mod error;
mod money;
mod numbering;
mod tax;
mod types;
mod validation;

pub use builder::*;
pub use config::*;
pub use error::*;
pub use money::*;
pub use numbering::*;
pub use tax::*;
pub use types::*;
pub use validation::*;
