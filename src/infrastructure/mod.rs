//! Infrastructure layer module

pub mod adapters;
pub mod http;
