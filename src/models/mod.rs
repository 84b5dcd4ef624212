//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod user;
pub mod group;
pub mod expense;

// Re-export commonly used models
pub use user::{User, UserId, UpsertUser};
pub use group::{Group, GroupId, GroupMember, MemberStatus, MemberView};
pub use expense::{Expense, ExpenseId, ExpenseView, NewExpense, ExpenseChanges};
