//! Business logic services for the Ziel Analytics dashboard

pub mod enrich;
pub mod export;
pub mod filter;
pub mod forecast;
pub mod ingest;
pub mod metrics;
pub mod recommend;
pub mod rfm;
pub mod scenario;
pub mod store;
