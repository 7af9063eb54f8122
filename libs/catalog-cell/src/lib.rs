pub mod client;
pub mod memory;
pub mod models;
pub mod provider;

pub use client::HttpCatalog;
pub use memory::StaticCatalog;
pub use provider::CatalogProvider;
