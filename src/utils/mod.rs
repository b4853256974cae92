pub mod error;
pub mod logger;
pub mod retry;
pub mod text;
pub mod timer;
pub mod validation;
pub mod xml;
