// Domain layer: tracking records, carrier rules and the ports the pipeline is built on.

pub mod model;
pub mod ports;
pub mod services;
