//! Overlay clip catalog: collections, display names and member ordering.

pub(crate) mod model;
