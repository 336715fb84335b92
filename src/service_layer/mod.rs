pub mod client;
pub mod session;

pub use client::ServiceLayerClient;
