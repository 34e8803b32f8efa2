//! Concrete ways of performing a logical operation against the vendor.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;

use super::{AxisKind, OpArgs, Resolved};
use crate::vendor::{AutomationApi, Handle};

/// One concrete call path for a logical operation.
///
/// Property keys are axis-relative; the axis prefix is prepended at attempt
/// time (`from` on the X axis becomes `x.from`). Command templates use
/// `strfmt` placeholders: `{axis}`, `{from}`, `{to}`, `{value}`, `{text}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Direct numeric property access on the target.
    NumProp {
        /// Axis-relative property key.
        key: &'static str,
    },
    /// A pair of numeric properties forming a range.
    NumPropPair {
        /// Property holding the lower bound.
        low: &'static str,
        /// Property holding the upper bound.
        high: &'static str,
    },
    /// Direct string property access on the target.
    StrProp {
        /// Axis-relative property key.
        key: &'static str,
    },
    /// Direct method invocation on the target.
    Method {
        /// Vendor method name.
        name: &'static str,
    },
    /// Script command executed in the target's context.
    Command {
        /// Command template with `strfmt` placeholders.
        template: &'static str,
    },
}

impl Strategy {
    /// Attempts this strategy. Returns the raw (pre-normalization) result.
    pub(super) fn attempt(
        &self,
        api: &mut dyn AutomationApi,
        target: Handle,
        axis: AxisKind,
        args: &OpArgs,
    ) -> Result<Resolved> {
        match (self, args) {
            (Strategy::NumProp { key }, OpArgs::None) => api
                .num_prop(target, &axis_key(axis, key))
                .map(Resolved::Number),
            (Strategy::NumProp { key }, OpArgs::Number(value)) => api
                .set_num_prop(target, &axis_key(axis, key), *value)
                .map(|()| Resolved::Done),
            (Strategy::NumPropPair { low, high }, OpArgs::None) => {
                let from = api.num_prop(target, &axis_key(axis, low))?;
                let to = api.num_prop(target, &axis_key(axis, high))?;
                Ok(Resolved::Range(from, to))
            }
            (Strategy::NumPropPair { low, high }, OpArgs::Range { from, to }) => {
                api.set_num_prop(target, &axis_key(axis, low), *from)?;
                api.set_num_prop(target, &axis_key(axis, high), *to)?;
                Ok(Resolved::Done)
            }
            (Strategy::StrProp { key }, OpArgs::None) => api
                .str_prop(target, &axis_key(axis, key))
                .map(Resolved::Text),
            (Strategy::StrProp { key }, OpArgs::Text(value)) => api
                .set_str_prop(target, &axis_key(axis, key), value)
                .map(|()| Resolved::Done),
            (Strategy::Method { name }, OpArgs::None) => {
                api.call_method(target, name, None).map(|_| Resolved::Done)
            }
            (Strategy::Command { template }, args) => {
                let command = fill(template, axis, args)?;
                api.execute(target, &command)?;
                Ok(Resolved::Done)
            }
            (strategy, args) => {
                // Binding-table bug: a strategy paired with arguments it
                // cannot serve. Counts as a failed attempt, not a panic.
                bail!("strategy {strategy:?} cannot serve arguments {args:?}")
            }
        }
    }

    /// Human-readable description for diagnostics, with the axis prefix
    /// applied.
    pub(super) fn describe(&self, axis: AxisKind) -> String {
        match self {
            Strategy::NumProp { key } => {
                format!("numeric property '{}'", axis_key(axis, key))
            }
            Strategy::NumPropPair { low, high } => format!(
                "numeric properties '{}'/'{}'",
                axis_key(axis, low),
                axis_key(axis, high)
            ),
            Strategy::StrProp { key } => {
                format!("string property '{}'", axis_key(axis, key))
            }
            Strategy::Method { name } => format!("method '{name}'"),
            Strategy::Command { template } => format!("command `{template}`"),
        }
    }
}

/// Composes an axis-scoped property key.
fn axis_key(axis: AxisKind, key: &str) -> String {
    format!("{}.{}", axis.prefix(), key)
}

/// Fills a command template from the axis prefix and the operation
/// arguments.
fn fill(template: &str, axis: AxisKind, args: &OpArgs) -> Result<String> {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("axis".to_string(), axis.prefix().to_string());
    match args {
        OpArgs::None => {}
        OpArgs::Range { from, to } => {
            vars.insert("from".to_string(), from.to_string());
            vars.insert("to".to_string(), to.to_string());
        }
        OpArgs::Number(value) => {
            vars.insert("value".to_string(), value.to_string());
        }
        OpArgs::Text(text) => {
            vars.insert("text".to_string(), text.clone());
        }
    }
    strfmt::strfmt(template, &vars).context("command template formatting failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_range_template() {
        let command = fill(
            "{axis}.from = {from}; {axis}.to = {to}",
            AxisKind::Y,
            &OpArgs::Range { from: 0.0, to: 100.0 },
        )
        .expect("fill");
        assert_eq!(command, "y.from = 0; y.to = 100");
    }

    #[test]
    fn test_fill_title_template() {
        let command = fill(
            "label -{axis} \"{text}\"",
            AxisKind::X,
            &OpArgs::Text("Time (s)".to_string()),
        )
        .expect("fill");
        assert_eq!(command, "label -x \"Time (s)\"");
    }

    #[test]
    fn test_describe_includes_axis_prefix() {
        let strategy = Strategy::NumProp { key: "type" };
        assert_eq!(
            strategy.describe(AxisKind::Z),
            "numeric property 'z.type'"
        );
    }
}
