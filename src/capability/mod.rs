//! Capability-fallback resolution for a version-drifting vendor surface.
//!
//! The vendor renames axis properties and methods between releases. Instead
//! of pinning one call path per operation, each logical operation carries an
//! ordered list of [`Strategy`] values — "ways to perform X" — and
//! [`resolve`] walks that list until one succeeds.
//!
//! # Contract
//!
//! - Exactly one binding is attempted per call; strategies run in declared
//!   order; the first success short-circuits.
//! - If all strategies fail, the aggregate [`CapabilityUnavailable`] carries
//!   every underlying failure for diagnostics.
//! - Nothing is cached between calls: vendor state can change underneath us
//!   (a 2D layer replaced with a 3D one), so every call re-attempts from the
//!   highest-priority strategy.
//! - A failing strategy may have partially mutated vendor state (a command
//!   string partially applied). The adapter does not roll back before trying
//!   the next strategy; the vendor exposes no transactional surface.
//!
//! Argument validation is the caller's job ([`crate::Axis`] validates before
//! calling in), so a resolution that starts is allowed to touch the vendor.

mod bindings;
mod strategy;

pub use strategy::Strategy;

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::error::{BridgeError, CapabilityUnavailable, Result, StrategyFailure};
use crate::vendor::{AutomationApi, Handle};

/// Semantic axis target of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    /// Horizontal axis.
    X,
    /// Vertical axis.
    Y,
    /// Depth axis (3D layers only).
    Z,
    /// Error-bar axis.
    Error,
}

impl AxisKind {
    /// Vendor property prefix for this axis (`x.from`, `e.label.text`, ...).
    pub fn prefix(self) -> &'static str {
        match self {
            AxisKind::X => "x",
            AxisKind::Y => "y",
            AxisKind::Z => "z",
            AxisKind::Error => "e",
        }
    }

    /// All axis kinds.
    pub const ALL: [AxisKind; 4] = [AxisKind::X, AxisKind::Y, AxisKind::Z, AxisKind::Error];
}

impl fmt::Display for AxisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AxisKind::X => "X",
            AxisKind::Y => "Y",
            AxisKind::Z => "Z",
            AxisKind::Error => "Error",
        };
        f.write_str(label)
    }
}

/// Logical operation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Read the axis range as a numeric pair.
    GetRange,
    /// Write the axis range.
    SetRange,
    /// Read the axis scale as a vendor scale code.
    GetScale,
    /// Write the axis scale.
    SetScale,
    /// Read the axis title.
    GetTitle,
    /// Write the axis title.
    SetTitle,
    /// Read the major tick style as a vendor tick code.
    GetMajorTicks,
    /// Write the major tick style.
    SetMajorTicks,
    /// Read the minor tick count.
    GetMinorTicks,
    /// Write the minor tick count.
    SetMinorTicks,
    /// Read the reversed flag.
    GetReversed,
    /// Write the reversed flag.
    SetReversed,
    /// Rescale the layer to its plotted data.
    Rescale,
}

impl Operation {
    /// Stable operation name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Operation::GetRange => "get_range",
            Operation::SetRange => "set_range",
            Operation::GetScale => "get_scale",
            Operation::SetScale => "set_scale",
            Operation::GetTitle => "get_title",
            Operation::SetTitle => "set_title",
            Operation::GetMajorTicks => "get_major_ticks",
            Operation::SetMajorTicks => "set_major_ticks",
            Operation::GetMinorTicks => "get_minor_ticks",
            Operation::SetMinorTicks => "set_minor_ticks",
            Operation::GetReversed => "get_reversed",
            Operation::SetReversed => "set_reversed",
            Operation::Rescale => "rescale",
        }
    }

    /// Declared result shape of this operation.
    fn shape(self) -> Shape {
        match self {
            Operation::GetRange => Shape::Range,
            Operation::GetScale | Operation::GetMajorTicks | Operation::GetMinorTicks => {
                Shape::Number
            }
            Operation::GetTitle => Shape::Text,
            Operation::GetReversed => Shape::Flag,
            _ => Shape::Unit,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared result shape of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Range,
    Number,
    Text,
    Flag,
    Unit,
}

/// Arguments to an operation, already validated by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum OpArgs {
    /// No arguments (reads, rescale).
    None,
    /// A numeric range.
    Range {
        /// Lower bound.
        from: f64,
        /// Upper bound.
        to: f64,
    },
    /// A single numeric value (vendor codes, counts, flags).
    Number(f64),
    /// A string value (titles).
    Text(String),
}

/// Normalized result of a successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// Numeric pair (axis range).
    Range(f64, f64),
    /// Single number (vendor codes, counts).
    Number(f64),
    /// String value (titles).
    Text(String),
    /// Boolean flag.
    Flag(bool),
    /// Side-effecting operation completed; nothing to return.
    Done,
}

impl Resolved {
    /// Extracts a numeric pair.
    pub fn into_range(self) -> Result<(f64, f64)> {
        match self {
            Resolved::Range(from, to) => Ok((from, to)),
            other => Err(shape_mismatch("numeric pair", &other)),
        }
    }

    /// Extracts a single number.
    pub fn into_number(self) -> Result<f64> {
        match self {
            Resolved::Number(value) => Ok(value),
            other => Err(shape_mismatch("number", &other)),
        }
    }

    /// Extracts a string.
    pub fn into_text(self) -> Result<String> {
        match self {
            Resolved::Text(value) => Ok(value),
            other => Err(shape_mismatch("string", &other)),
        }
    }

    /// Extracts a boolean flag.
    pub fn into_flag(self) -> Result<bool> {
        match self {
            Resolved::Flag(value) => Ok(value),
            other => Err(shape_mismatch("flag", &other)),
        }
    }
}

fn shape_mismatch(expected: &str, got: &Resolved) -> BridgeError {
    BridgeError::Vendor(format!("expected {expected}, vendor produced {got:?}"))
}

/// Resolves one operation against the vendor, walking the fallback chain.
///
/// Returns the normalized value of the first strategy that succeeds, or a
/// [`CapabilityUnavailable`] enumerating every attempt when all of them
/// fail. Arguments must already be validated; this function goes straight to
/// the vendor.
pub fn resolve(
    api: &mut dyn AutomationApi,
    target: Handle,
    operation: Operation,
    axis: AxisKind,
    args: &OpArgs,
) -> std::result::Result<Resolved, CapabilityUnavailable> {
    let binding = bindings::for_operation(operation);
    let mut attempts = Vec::with_capacity(binding.len());

    for candidate in binding {
        match candidate.attempt(api, target, axis, args) {
            Ok(value) => match normalize(operation.shape(), value) {
                Ok(normalized) => return Ok(normalized),
                Err(reason) => {
                    debug!(
                        operation = operation.name(),
                        axis = %axis,
                        strategy = %candidate.describe(axis),
                        %reason,
                        "strategy produced an unusable result; trying next"
                    );
                    attempts.push(StrategyFailure {
                        strategy: candidate.describe(axis),
                        reason,
                    });
                }
            },
            Err(err) => {
                let reason = format!("{err:#}");
                debug!(
                    operation = operation.name(),
                    axis = %axis,
                    strategy = %candidate.describe(axis),
                    error = %reason,
                    "strategy failed; trying next"
                );
                attempts.push(StrategyFailure {
                    strategy: candidate.describe(axis),
                    reason,
                });
            }
        }
    }

    warn!(
        operation = operation.name(),
        axis = %axis,
        attempted = attempts.len(),
        "all strategies exhausted"
    );
    Err(CapabilityUnavailable {
        operation: operation.name(),
        target: axis,
        attempts,
    })
}

/// Coerces a strategy result into the operation's declared shape.
fn normalize(shape: Shape, value: Resolved) -> std::result::Result<Resolved, String> {
    match (shape, value) {
        (Shape::Range, value @ Resolved::Range(..)) => Ok(value),
        (Shape::Number, value @ Resolved::Number(_)) => Ok(value),
        (Shape::Text, value @ Resolved::Text(_)) => Ok(value),
        (Shape::Flag, Resolved::Number(raw)) => Ok(Resolved::Flag(raw != 0.0)),
        (Shape::Flag, value @ Resolved::Flag(_)) => Ok(value),
        (Shape::Unit, Resolved::Done) => Ok(Resolved::Done),
        (shape, value) => Err(format!("result {value:?} does not fit shape {shape:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_prefixes() {
        assert_eq!(AxisKind::X.prefix(), "x");
        assert_eq!(AxisKind::Error.prefix(), "e");
    }

    #[test]
    fn test_flag_normalization() {
        assert_eq!(
            normalize(Shape::Flag, Resolved::Number(1.0)),
            Ok(Resolved::Flag(true))
        );
        assert_eq!(
            normalize(Shape::Flag, Resolved::Number(0.0)),
            Ok(Resolved::Flag(false))
        );
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        assert!(normalize(Shape::Range, Resolved::Number(3.0)).is_err());
        assert!(normalize(Shape::Unit, Resolved::Text("x".into())).is_err());
    }

    #[test]
    fn test_every_operation_has_a_binding() {
        let all = [
            Operation::GetRange,
            Operation::SetRange,
            Operation::GetScale,
            Operation::SetScale,
            Operation::GetTitle,
            Operation::SetTitle,
            Operation::GetMajorTicks,
            Operation::SetMajorTicks,
            Operation::GetMinorTicks,
            Operation::SetMinorTicks,
            Operation::GetReversed,
            Operation::SetReversed,
            Operation::Rescale,
        ];
        for operation in all {
            assert!(
                !bindings::for_operation(operation).is_empty(),
                "operation {operation} has no strategies"
            );
        }
    }
}
