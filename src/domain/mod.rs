pub mod analytics;
pub mod errors;
pub mod fulfillment;
pub mod order;
pub mod payment;
pub mod ports;
pub mod product;
pub mod tracking;
