//! Core library for the plotlink automation bridge.
//!
//! plotlink drives a scientific-graphing application through its automation
//! API, exposing the vendor's workbooks, graphs, axes, and plots behind typed
//! Rust wrappers. The vendor surface is version-drifting: properties get
//! renamed, methods appear and disappear between releases. The bridge absorbs
//! that drift in a capability-fallback adapter that tries each known call
//! path in priority order and reports every miss when all of them fail.
//!
//! # Architecture
//!
//! ```text
//! Caller code
//!     └── Session / Folder / pages / layers / Axis   (typed wrappers)
//!           └── capability::resolve                  (fallback adapter)
//!                 └── AutomationApi                  (vendor seam)
//!                       ├── production backend       (the real application)
//!                       └── MockAutomation           (in-memory, for tests)
//! ```
//!
//! All calls are synchronous and blocking; the session handle is a
//! single-writer resource threaded explicitly through every wrapper.

pub mod axis;
pub mod capability;
pub mod config;
pub mod error;
pub mod folder;
pub mod layers;
pub mod pages;
pub mod session;
pub mod vendor;

pub use axis::{Axis, ScaleType, TickStyle};
pub use capability::{AxisKind, Operation, Resolved};
pub use config::{BridgeConfig, SessionConfig};
pub use error::{BridgeError, CapabilityUnavailable, Result, StrategyFailure};
pub use folder::Folder;
pub use layers::{
    ColorMap, Column, DataPlot, GraphLayer, GroupMode, Matrixsheet, PlotType, Worksheet,
    XyTemplate,
};
pub use pages::{
    GraphPage, MatrixPage, NotesPage, ProjectObject, ProjectPage, WorkbookPage,
};
pub use session::{DisplayMode, Session};
pub use vendor::{mock::MockAutomation, AutomationApi, Handle, PageKind, SharedApi};
