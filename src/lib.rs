//! Speeds, feeds, power, force and deflection for CNC milling and drilling.
//!
//! [`calculate`] runs a request against any [`ReferenceData`] source and
//! returns rounded cutting parameters plus every advisory raised along the
//! way. [`default_library`] provides a small built-in set of materials,
//! machines, spindles and tools.

pub mod calc;
pub mod charts;
pub mod config;
pub mod reference;
pub mod units;
pub mod validator;

pub use calc::optimizer::{
    optimize_for_deflection, optimize_tool_configuration, Candidate, OptimizerRequest,
};
pub use calc::{
    calculate, CalcError, CalculationOutput, CutType, Inputs, Severity, Warning, WarningKind,
};
pub use charts::{ChartCache, ChartError, SeriesPoint};
pub use config::{ConfigError, Policy};
pub use reference::{default_library, Library, LibraryError, ReferenceData};
pub use validator::{ValidationError, Validator};
