pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod dashboard;
pub mod error;
pub mod form;
pub mod models;
pub mod session;
