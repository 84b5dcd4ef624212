//! Database module
//!
//! This module holds the ledger store contract and its adapters: Postgres
//! repositories for production and an in-memory ledger for tests.

pub mod connection;
pub mod memory;
pub mod repositories;
pub mod service;
pub mod store;

// Re-export commonly used database components
pub use connection::{DatabasePool, create_pool, health_check, redact_url, run_migrations};
pub use memory::MemoryLedger;
pub use repositories::{UserRepository, GroupRepository, MemberRepository, ExpenseRepository};
pub use service::DatabaseService;
pub use store::LedgerStore;
