pub mod api;
pub mod audit;
pub mod db;
pub mod engine;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
