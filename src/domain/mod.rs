// Domain layer: deposition models and the port the workflow talks through.

pub mod model;
pub mod ports;
