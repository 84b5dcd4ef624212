//! Integration tests
//!
//! End-to-end runs through the dispatch serializer and the router over the
//! in-memory ledger and session storage.

pub mod edit_dialog_test;
pub mod expense_flow_test;
pub mod membership_test;
pub mod translations_test;
