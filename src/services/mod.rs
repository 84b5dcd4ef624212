//! Services module
//!
//! This module contains business logic services

pub mod balance;
pub mod expense;
pub mod membership;

// Re-export commonly used services
pub use balance::{net_balances, settle, NetBalance, Transfer};
pub use expense::ExpenseService;
pub use membership::MembershipService;

use std::sync::Arc;

use crate::config::settings::Settings;
use crate::database::LedgerStore;

/// Service factory for creating and sharing the domain services
#[derive(Clone)]
pub struct ServiceFactory {
    pub expense_service: ExpenseService,
    pub membership_service: MembershipService,
}

impl ServiceFactory {
    /// Create all services over one ledger store
    pub fn new(store: Arc<dyn LedgerStore>, settings: &Settings) -> Self {
        Self {
            expense_service: ExpenseService::new(store.clone(), settings.ledger.clone()),
            membership_service: MembershipService::new(store, settings.ledger.clone()),
        }
    }
}
