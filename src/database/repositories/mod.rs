//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod user;
pub mod group;
pub mod member;
pub mod expense;

// Re-export repositories
pub use user::UserRepository;
pub use group::GroupRepository;
pub use member::MemberRepository;
pub use expense::ExpenseRepository;
