//! Core traits for the DDNS system
//!
//! - [`Settings`]: one configured provider record and its update protocol
//! - [`SettingsFactory`]: validated construction of [`Settings`] from raw options

pub mod settings;

pub use settings::{Settings, SettingsFactory};
