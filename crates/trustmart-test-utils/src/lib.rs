//! Deterministic fakes and fixtures shared by the workspace's integration tests.
//!
//! - [`ScriptedSearchProvider`]: canned web and reverse-image responses,
//!   including quota exhaustion, failure and never-completing calls
//! - [`ScriptedLlm`]: an inference backend with a fixed reply or failure
//! - [`FailingStore`]: the in-memory [`Database`] with injectable delete failures

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use trustmart_common::{NewProduct, Product, ProductImage, Rating, Review};
use trustmart_db::{
    Database, DbError, ProductFilter, ProductPatch, ProductStore, ReviewFilter, ReviewPatch, ReviewStore,
};
use trustmart_evidence::{ImageMatch, ReverseImageResult, SearchError, SearchHit, SearchProvider, SearchResult};
use trustmart_llm::{LlmBackend, LlmError, LlmRequest, LlmResponse};
use uuid::Uuid;

pub use pretty_assertions::{assert_eq, assert_ne};

// ── Search ────────────────────────────────────────────────────────────────────

/// Canned outcome of one provider call.
#[derive(Debug, Clone)]
pub enum Scripted<T> {
    Ok(T),
    Quota,
    Fail,
    /// Never completes; exercises the caller's timeout.
    Hang,
}

impl<T: Clone> Scripted<T> {
    async fn play(&self) -> SearchResult<T> {
        match self {
            Scripted::Ok(value) => Ok(value.clone()),
            Scripted::Quota => Err(SearchError::QuotaExceeded("Your account has run out of searches.".into())),
            Scripted::Fail => Err(SearchError::Unavailable("scripted failure".into())),
            Scripted::Hang => std::future::pending().await,
        }
    }
}

/// Responses are chosen by the first rule whose key is contained in the
/// query (or image URL); unmatched calls get the default.
pub struct ScriptedSearchProvider {
    web_rules: Vec<(String, Scripted<Vec<SearchHit>>)>,
    web_default: Scripted<Vec<SearchHit>>,
    image_rules: Vec<(String, Scripted<ReverseImageResult>)>,
    image_default: Scripted<ReverseImageResult>,
    web_calls: AtomicUsize,
    image_calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl Default for ScriptedSearchProvider {
    fn default() -> Self {
        Self {
            web_rules: Vec::new(),
            web_default: Scripted::Ok(Vec::new()),
            image_rules: Vec::new(),
            image_default: Scripted::Ok(ReverseImageResult::default()),
            web_calls: AtomicUsize::new(0),
            image_calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedSearchProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unmatched calls play these outcomes.
    pub fn all(outcome_web: Scripted<Vec<SearchHit>>, outcome_image: Scripted<ReverseImageResult>) -> Self {
        Self { web_default: outcome_web, image_default: outcome_image, ..Self::default() }
    }

    pub fn failing() -> Self {
        Self::all(Scripted::Fail, Scripted::Fail)
    }

    pub fn quota_exhausted() -> Self {
        Self::all(Scripted::Quota, Scripted::Quota)
    }

    pub fn hanging() -> Self {
        Self::all(Scripted::Hang, Scripted::Hang)
    }

    pub fn web(mut self, query_contains: &str, outcome: Scripted<Vec<SearchHit>>) -> Self {
        self.web_rules.push((query_contains.to_string(), outcome));
        self
    }

    pub fn web_hits(self, query_contains: &str, hits: Vec<SearchHit>) -> Self {
        self.web(query_contains, Scripted::Ok(hits))
    }

    pub fn image(mut self, url_contains: &str, outcome: Scripted<ReverseImageResult>) -> Self {
        self.image_rules.push((url_contains.to_string(), outcome));
        self
    }

    pub fn image_matches(self, url_contains: &str, matches: Vec<ImageMatch>) -> Self {
        self.image(url_contains, Scripted::Ok(ReverseImageResult { matches, knowledge_graph: None }))
    }

    pub fn web_calls(&self) -> usize {
        self.web_calls.load(Ordering::SeqCst)
    }

    pub fn image_calls(&self) -> usize {
        self.image_calls.load(Ordering::SeqCst)
    }

    /// Web queries in the order they were issued.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

fn pick<'a, T>(rules: &'a [(String, Scripted<T>)], default: &'a Scripted<T>, key: &str) -> &'a Scripted<T> {
    rules
        .iter()
        .find(|(needle, _)| key.contains(needle.as_str()))
        .map(|(_, outcome)| outcome)
        .unwrap_or(default)
}

#[async_trait]
impl SearchProvider for ScriptedSearchProvider {
    async fn web_search(&self, query: &str, max_results: usize) -> SearchResult<Vec<SearchHit>> {
        self.web_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }
        let mut hits = pick(&self.web_rules, &self.web_default, query).play().await?;
        hits.truncate(max_results);
        Ok(hits)
    }

    async fn reverse_image(&self, image_url: &str) -> SearchResult<ReverseImageResult> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        pick(&self.image_rules, &self.image_default, image_url).play().await
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

// ── Inference ─────────────────────────────────────────────────────────────────

pub struct ScriptedLlm {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn replying(content: impl Into<String>) -> Self {
        Self { reply: Ok(content.into()), prompts: Mutex::new(Vec::new()) }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self { reply: Err(message.into()), prompts: Mutex::new(Vec::new()) }
    }

    /// User-role prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmBackend for ScriptedLlm {
    async fn complete(&self, req: LlmRequest) -> Result<LlmResponse, LlmError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.extend(req.messages.iter().filter(|m| m.role == "user").map(|m| m.content.clone()));
        }
        match &self.reply {
            Ok(content) => Ok(LlmResponse {
                content: content.clone(),
                model: "scripted-model".into(),
                prompt_tokens: 42,
                completion_tokens: 7,
            }),
            Err(message) => Err(LlmError::Unavailable(message.clone())),
        }
    }

    fn model_id(&self) -> &str {
        "scripted-model"
    }

    fn backend_name(&self) -> &'static str {
        "scripted"
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

/// In-memory store whose product updates, product deletes and review
/// deletes can be made to fail.
#[derive(Default)]
pub struct FailingStore {
    inner: Database,
    fail_product_update: AtomicBool,
    fail_product_delete: AtomicBool,
    fail_review_delete: AtomicBool,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_product_update(&self, fail: bool) {
        self.fail_product_update.store(fail, Ordering::SeqCst);
    }

    pub fn fail_product_delete(&self, fail: bool) {
        self.fail_product_delete.store(fail, Ordering::SeqCst);
    }

    pub fn fail_review_delete(&self, fail: bool) {
        self.fail_review_delete.store(fail, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &Database {
        &self.inner
    }
}

#[async_trait]
impl ProductStore for FailingStore {
    async fn insert_product(&self, product: Product) -> trustmart_db::Result<Product> {
        self.inner.insert_product(product).await
    }

    async fn find_product(&self, id: Uuid) -> trustmart_db::Result<Option<Product>> {
        self.inner.find_product(id).await
    }

    async fn find_products(&self, filter: &ProductFilter) -> trustmart_db::Result<Vec<Product>> {
        self.inner.find_products(filter).await
    }

    async fn update_product(&self, id: Uuid, patch: ProductPatch) -> trustmart_db::Result<Option<Product>> {
        if self.fail_product_update.load(Ordering::SeqCst) {
            return Err(DbError::Unavailable("injected product update failure".into()));
        }
        self.inner.update_product(id, patch).await
    }

    async fn delete_product(&self, id: Uuid) -> trustmart_db::Result<Option<Product>> {
        if self.fail_product_delete.load(Ordering::SeqCst) {
            return Err(DbError::Unavailable("injected product delete failure".into()));
        }
        self.inner.delete_product(id).await
    }
}

#[async_trait]
impl ReviewStore for FailingStore {
    async fn insert_review(&self, review: Review) -> trustmart_db::Result<Review> {
        self.inner.insert_review(review).await
    }

    async fn find_review(&self, id: Uuid) -> trustmart_db::Result<Option<Review>> {
        self.inner.find_review(id).await
    }

    async fn find_reviews(&self, filter: &ReviewFilter) -> trustmart_db::Result<Vec<Review>> {
        self.inner.find_reviews(filter).await
    }

    async fn update_review(&self, id: Uuid, patch: ReviewPatch) -> trustmart_db::Result<Option<Review>> {
        self.inner.update_review(id, patch).await
    }

    async fn delete_review(&self, id: Uuid) -> trustmart_db::Result<Option<Review>> {
        if self.fail_review_delete.load(Ordering::SeqCst) {
            return Err(DbError::Unavailable("injected review delete failure".into()));
        }
        self.inner.delete_review(id).await
    }

    async fn delete_reviews_for_product(&self, product_id: Uuid) -> trustmart_db::Result<Vec<Review>> {
        self.inner.delete_reviews_for_product(product_id).await
    }
}

// ── Fixtures ──────────────────────────────────────────────────────────────────

pub fn new_product(name: &str, price: f64) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        description: format!("{name}, brand new and sealed"),
        category: "Electronics".to_string(),
        price,
        brand: None,
        seller: None,
        images: Vec::new(),
        is_flagged: false,
    }
}

/// A valid product; panics on invalid fixture input.
pub fn product(name: &str, price: f64) -> Product {
    new_product(name, price).into_product().expect("fixture product is valid")
}

pub fn product_with(name: &str, price: f64, brand: Option<&str>, seller: Option<&str>, images: &[&str]) -> Product {
    let mut input = new_product(name, price);
    input.brand = brand.map(str::to_string);
    input.seller = seller.map(str::to_string);
    input.images = images.iter().map(|url| ProductImage { url: url.to_string(), alt: None }).collect();
    input.into_product().expect("fixture product is valid")
}

pub fn review(product_id: Uuid, rating: u8, comment: &str) -> Review {
    let rating = Rating::new(rating).expect("fixture rating in range");
    Review::new(product_id, Uuid::new_v4(), rating, comment).expect("fixture review is valid")
}

pub fn hit(title: &str, snippet: &str, link: &str) -> SearchHit {
    SearchHit { title: title.to_string(), snippet: snippet.to_string(), link: link.to_string() }
}

pub fn image_match(title: &str, link: &str) -> ImageMatch {
    ImageMatch { title: title.to_string(), link: link.to_string(), snippet: None }
}
