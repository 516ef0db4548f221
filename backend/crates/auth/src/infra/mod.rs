//! Infrastructure Layer
//!
//! Repository implementations and outbound integrations.

pub mod memory;
pub mod notifier;
pub mod postgres;

pub use memory::InMemoryAuthRepository;
pub use notifier::LogNotifier;
pub use postgres::PgAuthRepository;
