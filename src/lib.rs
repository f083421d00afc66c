pub mod cli;
pub mod configuration;
pub mod console;
pub mod controller;
pub mod gateway;
pub mod models;
pub mod telemetry;
