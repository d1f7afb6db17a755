//! Security profiles, budgets, and parse options.
//!
//! Single source of truth for every numeric limit, scheme allowlist, and
//! plugin allowlist. Callers never hardcode these numbers; the tests in
//! `profile.rs` pin them.

pub mod options;
pub mod profile;

pub use options::{ParseOptions, Preset};
pub use profile::{Budgets, SecurityProfile};
