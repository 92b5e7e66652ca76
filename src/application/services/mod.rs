//! Application services

pub mod restructure;

pub use restructure::{RestructureOutput, RestructureService, Source};
