//! Role Catalog - browse job roles with their knowledge, soft skills and learning pathways.

pub mod catalog;
pub mod config;
pub mod display;
pub mod server;
