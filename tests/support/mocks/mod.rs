// tests/support/mocks/mod.rs
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod security;
pub mod time;

pub use security::{FakeTokenSigner, StrictPasswordHasher};
pub use time::{ManualClock, fixed_now};
