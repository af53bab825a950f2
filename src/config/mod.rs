// src/config/mod.rs
pub mod service;
pub mod sources;
