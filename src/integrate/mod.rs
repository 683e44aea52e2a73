//! Integration job model and dispatch.

pub mod dispatch;
pub mod kernel;
pub mod preset;
pub mod request;

pub use dispatch::{IntegrationDispatcher, IntegrationError};
pub use kernel::{IntegrationKernel, KernelError, ProcessMode, POLARIZATION_FACTOR};
pub use preset::{parse_presets, presets_to_json, PresetError, RequestPreset};
pub use request::{resolve_unit, IntegrationRequest, ValidatedRequest, ValidationError};
