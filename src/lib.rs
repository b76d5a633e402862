// SPDX-License-Identifier: MPL-2.0
//! `layer_lens` is the engine of a 2D viewer for geo-referenced raster and
//! vector layers.
//!
//! It stacks heterogeneous layers, keeps a per-layer view transform and a
//! stack-wide orientation, answers pixel queries across layers of different
//! resolutions, and renders each layer into an off-screen frame. Windowing
//! and painting are left to the embedding application.

#![doc(html_root_url = "https://docs.rs/layer_lens/0.1.0")]

pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod io;
pub mod layer;
pub mod paths;
pub mod stack;
