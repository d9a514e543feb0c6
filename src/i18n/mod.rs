// SPDX-License-Identifier: MPL-2.0
//! Localization with Fluent.
//!
//! Translation files under `assets/i18n/` are embedded in the binary. The
//! locale comes from the CLI, then the config, then the OS, with `en-US` as
//! the last resort. Keys missing from a locale fall back to `en-US`.

pub mod fluent;
