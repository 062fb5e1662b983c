use uuid::Uuid;

/// Source of opaque record ids.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}
