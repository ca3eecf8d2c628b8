// Domain layer: chart models and the renderer port.

pub mod model;
pub mod ports;
pub mod table;
