//! After any sequence of submissions and dismissals the stored aggregate
//! equals the mean of the retained reviews, or the neutral default.

use std::sync::Arc;

use proptest::prelude::*;
use trustmart_common::NEUTRAL_AVERAGE;
use trustmart_db::{Database, EntityStore, ReviewFilter};
use trustmart_moderation::{ModerationService, RatingLedger, ReviewService, ReviewSubmission};
use trustmart_test_utils::product;
use uuid::Uuid;

#[derive(Debug, Clone)]
enum Op {
    Add(u8),
    /// Dismiss the n-th retained review, modulo the retained count.
    Remove(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![(1u8..=5).prop_map(Op::Add), (0usize..64).prop_map(Op::Remove)]
}

async fn run(ops: Vec<Op>) -> Result<(), TestCaseError> {
    let store: Arc<dyn EntityStore> = Arc::new(Database::open_in_memory());
    let ledger = Arc::new(RatingLedger::new(store.clone()));
    let reviews = ReviewService::new(ledger.clone());
    let moderation = ModerationService::new(ledger);
    let p = store.insert_product(product("Desk Fan", 1_999.0)).await.unwrap();

    let mut retained: Vec<(Uuid, u8)> = Vec::new();
    for op in ops {
        match op {
            Op::Add(rating) => {
                let submission = ReviewSubmission { rating, comment: "generated".into() };
                let r = reviews.submit(p.id, Uuid::new_v4(), submission).await.unwrap();
                retained.push((r.id, rating));
            }
            Op::Remove(n) if !retained.is_empty() => {
                let (id, _) = retained.remove(n % retained.len());
                moderation.dismiss_review(id).await.unwrap();
            }
            Op::Remove(_) => {}
        }
    }

    let stored = store.find_product(p.id).await.unwrap().unwrap();
    prop_assert_eq!(stored.ratings.count as usize, retained.len());
    let expected = if retained.is_empty() {
        NEUTRAL_AVERAGE
    } else {
        retained.iter().map(|(_, r)| f64::from(*r)).sum::<f64>() / retained.len() as f64
    };
    prop_assert!((stored.ratings.average - expected).abs() < 1e-9, "{} vs {}", stored.ratings.average, expected);

    let mut listed = stored.reviews.clone();
    let mut kept: Vec<Uuid> = store
        .find_reviews(&ReviewFilter::for_product(p.id))
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    listed.sort();
    kept.sort();
    prop_assert_eq!(listed, kept);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_aggregate_matches_retained_reviews(ops in proptest::collection::vec(op(), 0..60)) {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        runtime.block_on(run(ops))?;
    }
}
