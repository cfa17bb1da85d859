pub mod catalog;
pub mod error;
pub mod filter;
pub mod mcp_api;
pub mod model;
pub mod normalizer;
pub mod ranking;
pub mod session;
