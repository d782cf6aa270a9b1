pub mod api;
pub mod config;
pub mod console;
pub mod errors;
pub mod models;
pub mod realtime;
pub mod service;
pub mod session;
pub mod state;
