// src/application/ports/mod.rs
pub mod security;
pub mod time;
pub mod transaction;
pub mod util;

