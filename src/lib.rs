pub mod aggregator;
pub mod api;
pub mod app;
pub mod catalog;
pub mod config;
pub mod debounce;
pub mod dispatcher;
pub mod filter;
pub mod metrics;
pub mod search;
pub mod trending;
pub mod view;
