// SPDX-License-Identifier: MPL-2.0
//! Shared widget styles for the panels and overlays.

pub mod button;
pub mod container;
pub mod overlay;
