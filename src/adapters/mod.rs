// Adapters layer: concrete implementations for external systems (databases, mail, fixed config).

pub mod database;
pub mod email;
pub mod memory;
