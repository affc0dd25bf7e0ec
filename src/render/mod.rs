pub(crate) mod blur;
pub(crate) mod cadence;
pub(crate) mod composite;
pub(crate) mod compositor;
pub(crate) mod frame;
