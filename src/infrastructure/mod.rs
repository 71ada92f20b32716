// src/infrastructure/mod.rs
pub mod event;
pub mod memory;
