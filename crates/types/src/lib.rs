//! simpledb-types: row contract and shared leaf types for SimpleDB.
//!
//! This crate holds everything the engine and its consumers agree on
//! without depending on the engine itself:
//!
//! - [`Row`] - the capability contract a type must satisfy to live in a table
//! - [`codec`] - record serialization to and from line-oriented JSON
//! - [`validation`] - declarative field constraints with structured errors
//! - [`StoreConfig`] - engine tuning knobs (lock timeout, fsync policy)

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod config;
pub mod row;
pub mod validation;

pub use codec::{decode_line, encode_line, CodecError};
pub use config::StoreConfig;
pub use row::{Row, RowId, TRANSIENT_ROW_ID};
pub use validation::{FieldConstraint, ValidationError};
