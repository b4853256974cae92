// Domain layer: configuration documents and the ports the adapters implement.

pub mod model;
pub mod ports;
