pub mod api;
pub mod app;
pub mod config;
pub mod dataset;
pub mod fetch_error;
pub mod fetcher;
pub mod forecast;
pub mod importers;
pub mod map;
pub mod models;
pub mod services;
pub mod stations;
pub mod utils;
