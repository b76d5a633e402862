// SPDX-License-Identifier: MPL-2.0
//! Diagnostics: the in-memory log of what the layer stack did.
//!
//! - [`CircularBuffer`]: ring buffer with a bounded capacity
//! - [`StackEvent`]: messages emitted by stack operations, with a [`Severity`]

mod buffer;
mod events;

pub use buffer::CircularBuffer;
pub use events::{Severity, StackEvent};
