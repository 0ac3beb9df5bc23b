// src/lib.rs
//! Sherlock: merchant-facing diagnostics for Shopify stores. Scans the
//! app inventory, theme code, and storefront performance, scores the
//! likely culprits, and serves the results over a polling REST API.

pub mod api;
pub mod config;
pub mod db;
pub mod diagnosis;
pub mod error;
pub mod orchestrator;
pub mod riskdb;
pub mod scanner;
pub mod shopify;
pub mod state;
pub mod timeline;
