//! # NitroGIS Parallel
//!
//! Execution strategies for the analysis pipeline.
//!
//! This crate provides:
//! - Index-ordered parallel maps on a bounded Rayon pool
//! - Cancellation tokens with optional deadlines, checked between work batches

pub mod cancel;
pub mod strategy;

pub use cancel::CancelToken;
pub use strategy::{ParallelStrategy, ProcessingMode};
