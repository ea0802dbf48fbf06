//! trustmart-web: HTTP surface for the Trustmart marketplace back-end.
//! Provides:
//!   - Product listing, creation and review submission
//!   - On-demand trust analysis for products and reviews
//!   - Moderator dashboard, approve, dismiss and flag actions
//!
//! Identity is established upstream; review submission reads the author
//! from the `x-user-id` header.

pub mod handlers;
pub mod router;
pub mod state;
