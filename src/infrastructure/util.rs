use crate::application::ports::util::IdGenerator;
use uuid::Uuid;

/// Random (v4) identifiers.
#[derive(Default, Clone)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn new_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}
