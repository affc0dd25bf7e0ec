//! Handing a finished recording to the user: share sheet first, download as fallback.

pub(crate) mod deliver;
