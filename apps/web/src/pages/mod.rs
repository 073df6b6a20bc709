// Page view-models: one typed view per route, each fetching independently.
// Display routes fall back to empty or default state plus a notice on failure.

pub mod admin;
pub mod cards;
pub mod checkout;
pub mod content;
pub mod dashboard;
pub mod employee;
pub mod handlers;
pub mod notice;
pub mod stats;
