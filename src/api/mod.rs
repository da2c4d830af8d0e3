// Outbound API clients
pub mod favicon;
pub mod graph;
pub mod oembed;
pub mod scrape;
