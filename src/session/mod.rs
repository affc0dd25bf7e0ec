//! The recording session state machine and the UI state derived from it.

pub(crate) mod controller;
pub(crate) mod state;
pub(crate) mod ui;
