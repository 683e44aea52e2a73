//! GIXS Rust Runtime - High-performance detector-image reduction.
//!
//! This crate provides the reduction core behind a desktop browser for 2D
//! X-ray scattering detector images (grazing-incidence and transmission)
//! with:
//!
//! - Unit-aware q↔2θ coordinate transforms under grazing incidence
//! - A validated, serializable integration-request model (cake and box jobs)
//! - One dispatcher covering all integration modes of the numerical kernel
//! - Parallel batch reduction with per-item failure isolation
//! - FFI layer for Python (cffi) and other language bindings
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │     FFI Layer (gixsrs.h)            │
//! │  C-compatible functions & types     │
//! └─────────────────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────┐
//! │         Pure Rust Core              │
//! │  ┌───────────┐  ┌───────────────┐  │
//! │  │  Batch    │  │  Integration  │  │
//! │  │  Runner   │  │  Dispatcher   │  │
//! │  └───────────┘  └───────────────┘  │
//! │  ┌───────────┐  ┌───────────────┐  │
//! │  │ Geometry  │  │  Unit System  │  │
//! │  │  State    │  │  (q ↔ 2θ)     │  │
//! │  └───────────┘  └───────────────┘  │
//! └─────────────────────────────────────┘
//! ```
//!
//! The numerical binning engine, file decoding, calibration parsing, and
//! the GUI are external collaborators reached through the traits in
//! [`integrate`], [`data`], and [`batch`].

pub mod batch;
pub mod data;
pub mod ffi;
pub mod geometry;
pub mod integrate;
pub mod logger;
pub mod units;

// Re-export commonly used items
pub use batch::{BatchRecord, BatchReport, BatchRunner, ItemStage, ItemState, NamedRequest,
    ResultWriter, RunnerConfig, WriteError};
pub use data::{DetectorImage, HeaderKeys, HeaderValue, IntegrationResult, MapMetadata,
    MetadataError, MetadataProvider};
pub use geometry::{GeometryError, GeometryState, SampleOrientation, DEFAULT_BIN_COUNT};
pub use integrate::{parse_presets, presets_to_json, IntegrationDispatcher, IntegrationError,
    IntegrationKernel, IntegrationRequest, KernelError, PresetError, ProcessMode, RequestPreset,
    ValidatedRequest, ValidationError, POLARIZATION_FACTOR};
pub use logger::init_logging;
pub use units::{convert, q_to_twotheta, resolve_alias, twotheta_to_q, Direction, Unit, UnitError};

// Re-export FFI types for cbindgen
pub use ffi::geometry::*;
pub use ffi::types::*;
pub use ffi::units::*;
