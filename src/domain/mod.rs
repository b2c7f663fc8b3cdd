// Domain layer: workload model and the ports the engines are written against.

pub mod model;
pub mod ports;
