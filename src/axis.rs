//! Caller-facing axis surface.
//!
//! [`Axis`] is where arguments are validated (fail fast, before any vendor
//! call) and where vendor numeric codes are translated into the public
//! enumerations. Everything vendor-facing goes through
//! [`crate::capability::resolve`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::capability::{self, AxisKind, OpArgs, Operation};
use crate::error::{BridgeError, Result};
use crate::vendor::{lock_api, Handle, SharedApi};

/// Axis scale, one of the vendor's fixed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScaleType {
    /// Linear scale.
    Linear,
    /// Base-10 logarithmic scale.
    Log10,
    /// Probability scale.
    Probability,
    /// Probit scale.
    Probit,
    /// Reciprocal scale.
    Reciprocal,
    /// Offset-reciprocal scale.
    OffsetReciprocal,
    /// Logit scale.
    Logit,
    /// Natural-log scale.
    Ln,
}

impl ScaleType {
    /// All scale types, in vendor-code order.
    pub const ALL: [ScaleType; 8] = [
        ScaleType::Linear,
        ScaleType::Log10,
        ScaleType::Probability,
        ScaleType::Probit,
        ScaleType::Reciprocal,
        ScaleType::OffsetReciprocal,
        ScaleType::Logit,
        ScaleType::Ln,
    ];

    /// The vendor's numeric code for this scale.
    pub fn vendor_code(self) -> i32 {
        match self {
            ScaleType::Linear => 1,
            ScaleType::Log10 => 2,
            ScaleType::Probability => 3,
            ScaleType::Probit => 4,
            ScaleType::Reciprocal => 5,
            ScaleType::OffsetReciprocal => 6,
            ScaleType::Logit => 7,
            ScaleType::Ln => 8,
        }
    }

    /// Maps a vendor numeric code back to a scale type.
    pub fn from_vendor_code(code: i32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|scale| scale.vendor_code() == code)
            .ok_or_else(|| BridgeError::Vendor(format!("unrecognized scale code {code}")))
    }

    /// Canonical string form.
    pub fn as_str(self) -> &'static str {
        match self {
            ScaleType::Linear => "linear",
            ScaleType::Log10 => "log10",
            ScaleType::Probability => "probability",
            ScaleType::Probit => "probit",
            ScaleType::Reciprocal => "reciprocal",
            ScaleType::OffsetReciprocal => "offset-reciprocal",
            ScaleType::Logit => "logit",
            ScaleType::Ln => "ln",
        }
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScaleType {
    type Err = BridgeError;

    fn from_str(input: &str) -> Result<Self> {
        let normalized = input.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|scale| scale.as_str() == normalized)
            .ok_or_else(|| {
                BridgeError::InvalidArgument(format!("unrecognized scale type '{input}'"))
            })
    }
}

/// Major tick style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TickStyle {
    /// No major ticks.
    None,
    /// Ticks pointing into the plot area.
    In,
    /// Ticks pointing out of the plot area.
    Out,
    /// Ticks on both sides.
    InOut,
}

impl TickStyle {
    /// All tick styles, in vendor-code order.
    pub const ALL: [TickStyle; 4] =
        [TickStyle::None, TickStyle::In, TickStyle::Out, TickStyle::InOut];

    /// The vendor's numeric code for this style.
    pub fn vendor_code(self) -> i32 {
        match self {
            TickStyle::None => 0,
            TickStyle::In => 1,
            TickStyle::Out => 2,
            TickStyle::InOut => 3,
        }
    }

    /// Maps a vendor numeric code back to a tick style.
    pub fn from_vendor_code(code: i32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|style| style.vendor_code() == code)
            .ok_or_else(|| BridgeError::Vendor(format!("unrecognized tick style code {code}")))
    }

    /// Canonical string form.
    pub fn as_str(self) -> &'static str {
        match self {
            TickStyle::None => "none",
            TickStyle::In => "in",
            TickStyle::Out => "out",
            TickStyle::InOut => "in-out",
        }
    }
}

impl fmt::Display for TickStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TickStyle {
    type Err = BridgeError;

    fn from_str(input: &str) -> Result<Self> {
        let normalized = input.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|style| style.as_str() == normalized)
            .ok_or_else(|| {
                BridgeError::InvalidArgument(format!("unrecognized tick style '{input}'"))
            })
    }
}

/// One axis of a graph layer.
///
/// Obtained from [`crate::GraphLayer`]. All operations go through the
/// capability adapter; arguments are validated here first, so an invalid
/// argument never reaches the vendor.
pub struct Axis {
    api: SharedApi,
    layer: Handle,
    kind: AxisKind,
}

impl Axis {
    /// Wraps a raw layer handle. Callers normally go through
    /// [`crate::GraphLayer::axis`].
    pub fn from_handle(api: SharedApi, layer: Handle, kind: AxisKind) -> Self {
        Self { api, layer, kind }
    }

    /// Which axis this is.
    pub fn kind(&self) -> AxisKind {
        self.kind
    }

    fn run(&self, operation: Operation, args: OpArgs) -> Result<capability::Resolved> {
        let mut api = lock_api(&self.api);
        Ok(capability::resolve(
            &mut *api, self.layer, operation, self.kind, &args,
        )?)
    }

    /// Current axis range as `(from, to)`.
    pub fn range(&self) -> Result<(f64, f64)> {
        self.run(Operation::GetRange, OpArgs::None)?.into_range()
    }

    /// Sets the axis range.
    pub fn set_range(&self, from: f64, to: f64) -> Result<()> {
        if !from.is_finite() || !to.is_finite() {
            return Err(BridgeError::InvalidArgument(format!(
                "axis range bounds must be finite, got ({from}, {to})"
            )));
        }
        self.run(Operation::SetRange, OpArgs::Range { from, to })
            .map(|_| ())
    }

    /// Current axis scale.
    pub fn scale(&self) -> Result<ScaleType> {
        let code = self.run(Operation::GetScale, OpArgs::None)?.into_number()?;
        ScaleType::from_vendor_code(code as i32)
    }

    /// Sets the axis scale.
    pub fn set_scale(&self, scale: ScaleType) -> Result<()> {
        self.run(
            Operation::SetScale,
            OpArgs::Number(f64::from(scale.vendor_code())),
        )
        .map(|_| ())
    }

    /// Current axis title.
    pub fn title(&self) -> Result<String> {
        self.run(Operation::GetTitle, OpArgs::None)?.into_text()
    }

    /// Sets the axis title.
    pub fn set_title(&self, title: &str) -> Result<()> {
        if title.contains('"') {
            return Err(BridgeError::InvalidArgument(
                "axis title may not contain double quotes".to_string(),
            ));
        }
        self.run(Operation::SetTitle, OpArgs::Text(title.to_string()))
            .map(|_| ())
    }

    /// Current major tick style.
    pub fn major_ticks(&self) -> Result<TickStyle> {
        let code = self
            .run(Operation::GetMajorTicks, OpArgs::None)?
            .into_number()?;
        TickStyle::from_vendor_code(code as i32)
    }

    /// Sets the major tick style.
    pub fn set_major_ticks(&self, style: TickStyle) -> Result<()> {
        self.run(
            Operation::SetMajorTicks,
            OpArgs::Number(f64::from(style.vendor_code())),
        )
        .map(|_| ())
    }

    /// Current minor tick count.
    pub fn minor_ticks(&self) -> Result<u32> {
        let count = self
            .run(Operation::GetMinorTicks, OpArgs::None)?
            .into_number()?;
        Ok(count.max(0.0) as u32)
    }

    /// Sets the minor tick count. Rejects negative counts before any vendor
    /// call.
    pub fn set_minor_ticks(&self, count: i32) -> Result<()> {
        if count < 0 {
            return Err(BridgeError::InvalidArgument(format!(
                "minor tick count must be non-negative, got {count}"
            )));
        }
        self.run(Operation::SetMinorTicks, OpArgs::Number(f64::from(count)))
            .map(|_| ())
    }

    /// Whether the axis direction is reversed.
    pub fn is_reversed(&self) -> Result<bool> {
        self.run(Operation::GetReversed, OpArgs::None)?.into_flag()
    }

    /// Sets the reversed flag.
    pub fn set_reversed(&self, reversed: bool) -> Result<()> {
        self.run(
            Operation::SetReversed,
            OpArgs::Number(if reversed { 1.0 } else { 0.0 }),
        )
        .map(|_| ())
    }

    /// Rescales the parent layer to its plotted data.
    pub fn rescale(&self) -> Result<()> {
        self.run(Operation::Rescale, OpArgs::None).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_string_roundtrip() {
        for scale in ScaleType::ALL {
            let parsed: ScaleType = scale.as_str().parse().expect("parse");
            assert_eq!(parsed, scale);
        }
    }

    #[test]
    fn test_scale_accepts_underscore_form() {
        let parsed: ScaleType = "offset_reciprocal".parse().expect("parse");
        assert_eq!(parsed, ScaleType::OffsetReciprocal);
    }

    #[test]
    fn test_unknown_scale_is_invalid_argument() {
        let err = "log2".parse::<ScaleType>().expect_err("must fail");
        assert!(matches!(err, BridgeError::InvalidArgument(_)));
    }

    #[test]
    fn test_scale_vendor_code_roundtrip() {
        for scale in ScaleType::ALL {
            assert_eq!(
                ScaleType::from_vendor_code(scale.vendor_code()).expect("code"),
                scale
            );
        }
    }

    #[test]
    fn test_tick_style_roundtrip() {
        for style in TickStyle::ALL {
            let parsed: TickStyle = style.as_str().parse().expect("parse");
            assert_eq!(parsed, style);
            assert_eq!(
                TickStyle::from_vendor_code(style.vendor_code()).expect("code"),
                style
            );
        }
    }

    #[test]
    fn test_in_out_accepts_underscore_form() {
        let parsed: TickStyle = "in_out".parse().expect("parse");
        assert_eq!(parsed, TickStyle::InOut);
    }
}
