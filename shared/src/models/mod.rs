//! Domain models for the Ziel Analytics dashboard

mod codes;
mod inbound;
mod sales;
mod sku;
mod stock;

pub use codes::*;
pub use inbound::*;
pub use sales::*;
pub use sku::*;
pub use stock::*;
