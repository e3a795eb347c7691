// Re-export modules
pub mod config;
pub mod crawlers;
pub mod error;
pub mod parsers;
pub mod results;
pub mod retry;
pub mod service;
pub mod store;

// Re-export commonly used types for convenience
pub use config::ScraperConfig;
pub use crawlers::{Crawler, Renderer};
pub use results::ProductRecord;
pub use service::{ScrapeRequest, ScrapeResponse, ScrapeService};
pub use store::CatalogStore;
