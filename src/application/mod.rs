//! Application layer module

pub mod services;
