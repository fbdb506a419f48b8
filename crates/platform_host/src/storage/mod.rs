//! Client-side storage contracts.

pub mod prefs;
