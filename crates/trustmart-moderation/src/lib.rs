//! trustmart-moderation: rating ledger, review submission and the
//! moderator workflow.

pub mod ledger;
pub mod lifecycle;
pub mod reviews;

pub use ledger::{aggregate_of, apply_add, apply_remove, ProductGuard, RatingLedger};
pub use lifecycle::{Dashboard, EntityKind, ModerationService, Moderated, ProductDismissal, ReviewDismissal};
pub use reviews::{ReviewService, ReviewSubmission};
