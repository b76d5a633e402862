// SPDX-License-Identifier: MPL-2.0
//! Change notifications for views that mirror the stack rows.

use crate::diagnostics::StackEvent;

/// Which rows a mutation touched. Indices are row positions after the
/// mutation completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowChange {
    Added(usize),
    Swapped(usize, usize),
    /// The row that used to sit at this position is gone; rows above it
    /// moved down by one.
    Removed(usize),
    /// Display parameters of the row were rewritten.
    Updated(usize),
    /// Every row was reset to its default view.
    Reset,
}

/// Registered with [`LayerStack::subscribe`](super::LayerStack::subscribe).
///
/// Observers only receive value snapshots and cannot reach back into the
/// stack while it is being mutated.
pub trait StackObserver {
    fn row_changed(&mut self, change: RowChange);

    /// Called for every event appended to the stack's log.
    fn event_logged(&mut self, _event: &StackEvent) {}
}
