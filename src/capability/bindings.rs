//! Per-operation fallback chains.
//!
//! One ordered strategy list per logical operation, highest priority first:
//! the call path current vendor releases expose, then the command-string
//! form, then property names older releases used. The tables are static
//! configuration; nothing mutates them after startup.

use super::{Operation, Strategy};

/// Ordered strategies for an operation.
pub(super) fn for_operation(operation: Operation) -> &'static [Strategy] {
    use Strategy::*;
    match operation {
        Operation::GetRange => &[
            NumPropPair { low: "from", high: "to" },
            NumPropPair { low: "min", high: "max" },
        ],
        Operation::SetRange => &[
            NumPropPair { low: "from", high: "to" },
            Command { template: "{axis}.from = {from}; {axis}.to = {to}" },
            NumPropPair { low: "min", high: "max" },
        ],
        Operation::GetScale => &[
            NumProp { key: "type" },
            NumProp { key: "scale" },
        ],
        Operation::SetScale => &[
            NumProp { key: "type" },
            Command { template: "{axis}.type = {value}" },
            NumProp { key: "scale" },
        ],
        Operation::GetTitle => &[
            StrProp { key: "label.text" },
            StrProp { key: "title" },
        ],
        Operation::SetTitle => &[
            StrProp { key: "label.text" },
            Command { template: "label -{axis} \"{text}\"" },
            StrProp { key: "title" },
        ],
        Operation::GetMajorTicks => &[
            NumProp { key: "majorTicks" },
            NumProp { key: "ticks" },
        ],
        Operation::SetMajorTicks => &[
            NumProp { key: "majorTicks" },
            Command { template: "{axis}.majorTicks = {value}" },
        ],
        Operation::GetMinorTicks => &[
            NumProp { key: "minorTicks" },
            NumProp { key: "minorTickCount" },
        ],
        Operation::SetMinorTicks => &[
            NumProp { key: "minorTicks" },
            Command { template: "{axis}.minorTicks = {value}" },
        ],
        Operation::GetReversed => &[
            NumProp { key: "reversed" },
            NumProp { key: "rev" },
        ],
        Operation::SetReversed => &[
            NumProp { key: "reversed" },
            Command { template: "{axis}.reversed = {value}" },
        ],
        Operation::Rescale => &[
            Method { name: "rescale" },
            Command { template: "rescale" },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_path_comes_first() {
        // Every chain leads with a direct property/method strategy; the
        // command form is never the preferred path.
        for operation in [
            Operation::SetRange,
            Operation::SetScale,
            Operation::SetTitle,
            Operation::Rescale,
        ] {
            let first = &for_operation(operation)[0];
            assert!(
                !matches!(first, Strategy::Command { .. }),
                "operation {operation} prefers a command strategy"
            );
        }
    }

    #[test]
    fn test_set_scale_chain_order() {
        let chain = for_operation(Operation::SetScale);
        assert_eq!(chain.len(), 3);
        assert_eq!(chain[0], Strategy::NumProp { key: "type" });
        assert!(matches!(chain[1], Strategy::Command { .. }));
        assert_eq!(chain[2], Strategy::NumProp { key: "scale" });
    }
}
