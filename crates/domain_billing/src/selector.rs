//! Consumption selector
//!
//! Picks an instance's unbilled consumption inside a billing window. The
//! selection records positions into the instance's consumption list rather
//! than references, so the caller can mark exactly those events once the line
//! item has been built.

use rust_decimal::Decimal;

use core_kernel::{checked_add, AmountOverflow, DateWindow};
use domain_catalog::Instance;

/// Unbilled consumption of one instance inside a window
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnbilledSelection {
    /// Sum of the matched durations
    pub total_hours: Decimal,
    /// Positions of the matched events in [`Instance::consumptions`]
    pub matched: Vec<usize>,
    /// Unbilled events whose timestamp could not be read
    pub unparseable: usize,
    /// Unbilled events that parsed but fell outside the window
    pub outside_window: usize,
}

impl UnbilledSelection {
    /// True when the selection would produce no billable hours
    pub fn is_empty(&self) -> bool {
        self.total_hours.is_zero()
    }
}

/// Selects unbilled consumption stamped within `window`
///
/// Both window bounds are inclusive and taken at midnight. Events whose
/// timestamp does not parse are counted and skipped.
pub fn select_unbilled(instance: &Instance, window: &DateWindow) -> Result<UnbilledSelection, AmountOverflow> {
    let mut selection = UnbilledSelection::default();

    for (position, consumption) in instance.consumptions().iter().enumerate() {
        if consumption.is_billed() {
            continue;
        }
        match consumption.parsed_timestamp() {
            Some(ts) if window.contains(ts) => {
                selection.total_hours = checked_add(selection.total_hours, consumption.duration_hours())?;
                selection.matched.push(position);
            }
            Some(_) => selection.outside_window += 1,
            None => selection.unparseable += 1,
        }
    }

    Ok(selection)
}
