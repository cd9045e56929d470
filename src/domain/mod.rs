// Domain layer: order/package models, units, and the collaborator ports the quoter talks through.

pub mod model;
pub mod ports;
pub mod units;
