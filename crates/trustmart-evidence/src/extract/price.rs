//! Currency-tagged price extraction from snippet text.

use lazy_static::lazy_static;
use regex::Regex;
use trustmart_config::PricingConfig;

use crate::models::{Currency, PriceMention};

lazy_static! {
    // Grouped amounts cover both 12,000 and the Indian 1,49,999 style.
    static ref PREFIXED: Regex = Regex::new(
        r"(?i)(₹|\brs\.?|\binr|us\$|\$|\busd|€|\beur|£|\bgbp)\s?(\d{1,3}(?:,\d{2,3})+(?:\.\d+)?|\d+(?:\.\d+)?)"
    ).unwrap();
    static ref SUFFIXED: Regex = Regex::new(
        r"(?i)\b(\d{1,3}(?:,\d{2,3})+(?:\.\d+)?|\d+(?:\.\d+)?)\s?(inr|rupees|usd|dollars|eur|euros|gbp)\b"
    ).unwrap();
}

fn currency_of(tag: &str) -> Option<Currency> {
    match tag.to_lowercase().trim_end_matches('.') {
        "₹" | "rs" | "inr" | "rupees" => Some(Currency::Inr),
        "$" | "us$" | "usd" | "dollars" => Some(Currency::Usd),
        "€" | "eur" | "euros" => Some(Currency::Eur),
        "£" | "gbp" => Some(Currency::Gbp),
        _ => None,
    }
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse::<f64>().ok().filter(|v| v.is_finite() && *v > 0.0)
}

/// Convert to the local currency. Unknown rates fall back to the USD rate
/// and mark the mention approximate instead of dropping it.
fn to_local(amount: f64, currency: Currency, pricing: &PricingConfig) -> (f64, bool) {
    if currency.code().eq_ignore_ascii_case(&pricing.local_currency) {
        return (amount, false);
    }
    if let Some(rate) = pricing.exchange_rates.get(currency.code()) {
        return (amount * rate, false);
    }
    let fallback = pricing.exchange_rates.get("USD").copied().unwrap_or(1.0);
    (amount * fallback, true)
}

/// All price mentions in `text`, in order of appearance, deduplicated per source.
pub fn extract_prices(text: &str, source_id: &str, pricing: &PricingConfig) -> Vec<PriceMention> {
    let mut found: Vec<(usize, Currency, f64)> = Vec::new();
    for caps in PREFIXED.captures_iter(text) {
        if let (Some(currency), Some(amount)) = (currency_of(&caps[1]), parse_amount(&caps[2])) {
            found.push((caps.get(0).map_or(0, |m| m.start()), currency, amount));
        }
    }
    for caps in SUFFIXED.captures_iter(text) {
        if let (Some(amount), Some(currency)) = (parse_amount(&caps[1]), currency_of(&caps[2])) {
            found.push((caps.get(0).map_or(0, |m| m.start()), currency, amount));
        }
    }
    found.sort_by_key(|(pos, _, _)| *pos);

    let mut mentions: Vec<PriceMention> = Vec::new();
    for (_, currency, amount) in found {
        if mentions.iter().any(|m| m.currency == currency && m.original_amount == amount) {
            continue;
        }
        let (amount_local, approximate) = to_local(amount, currency, pricing);
        mentions.push(PriceMention {
            amount_local,
            original_amount: amount,
            currency,
            source_id: source_id.to_string(),
            approximate,
        });
    }
    mentions
}
