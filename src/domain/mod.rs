// Domain layer: models and ports. No transport or config details here.

pub mod model;
pub mod ports;
