pub mod api;
pub mod backend;
pub mod collector;
pub mod config;
pub mod humanize;
pub mod jobs;
pub mod observability;
pub mod sink;
