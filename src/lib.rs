// src/lib.rs

pub mod aggregate;
pub mod analyzer;
pub mod attribution;
pub mod calendar;
pub mod cli;
pub mod codeowners;
pub mod config;
pub mod error;
pub mod index;
pub mod model;
pub mod oracle;
pub mod reconcile;
pub mod renderer;
pub mod tracker;

pub use error::{Result, StatsError};
