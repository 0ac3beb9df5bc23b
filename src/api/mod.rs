// src/api/mod.rs

pub mod apps;
pub mod error;
pub mod handlers;
pub mod reports;
pub mod router;
pub mod scan;
pub mod timeline;

pub use router::api_router;
