pub(crate) mod composite;
pub mod context;
pub mod cpu;
pub(crate) mod programs;
pub(crate) mod sampling;
pub mod scene;
pub mod target;
