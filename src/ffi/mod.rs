//! FFI (Foreign Function Interface) layer for C bindings.
//!
//! This module provides C-compatible functions that can be called from
//! Python via cffi, or from any other language that supports C FFI. The
//! desktop browser drives the reduction core through these entry points.

pub mod geometry;
pub mod types;
pub mod units;

pub use geometry::*;
pub use types::*;
pub use units::*;
