//! Streams an OpenStreetMap XML export into CSV tables for a relational
//! schema, cleaning phone numbers and street suffixes along the way.

pub mod audit;
pub mod config;
pub mod data;
pub mod errors;
pub mod etl;
pub mod normalize;

pub use crate::config::UserConfig;
pub use crate::errors::{Error, Result};
