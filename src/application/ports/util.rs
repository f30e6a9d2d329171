// src/application/ports/util.rs
use uuid::Uuid;

/// Source of fresh random identifiers for users and refresh tokens.
pub trait IdGenerator: Send + Sync {
    fn new_id(&self) -> Uuid;
}
