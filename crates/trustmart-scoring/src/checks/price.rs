use trustmart_evidence::{EvidenceSlot, PriceMention};

use super::cite;
use crate::normalise::{format_amount, format_percent, BandPosition, PriceBand, SLIGHT_TOLERANCE};
use crate::status::{CheckResult, PriceStatus};

fn describe(m: &PriceMention, symbol: &str) -> String {
    let local = format_amount(symbol, m.amount_local);
    let approx = if m.approximate { " approx." } else { "" };
    if m.amount_local == m.original_amount {
        format!("{local} ({})", m.source_id)
    } else {
        format!("{local}{approx} from {} {} ({})", m.original_amount, m.currency.code(), m.source_id)
    }
}

/// Declared price against the tolerance band of observed prices.
pub fn check_price(declared: f64, prices: &EvidenceSlot<PriceMention>, symbol: &str) -> CheckResult<PriceStatus> {
    let mentions = match prices {
        EvidenceSlot::Collected(m) if !m.is_empty() => m,
        EvidenceSlot::Insufficient { reason } => {
            return CheckResult::new(0.5, PriceStatus::Unknown, format!("No price comparison possible: {reason}."));
        }
        _ => {
            return CheckResult::new(0.5, PriceStatus::Unknown, "No price comparison possible: no prices were extracted.");
        }
    };

    let amounts: Vec<f64> = mentions.iter().map(|m| m.amount_local).collect();
    let Some(band) = PriceBand::from_amounts(&amounts) else {
        return CheckResult::new(0.5, PriceStatus::Unknown, "No price comparison possible: no usable amounts.");
    };

    let evidence = mentions.iter().map(|m| describe(m, symbol)).collect::<Vec<_>>().join("; ");
    let range = format!(
        "expected range {} to {}",
        format_amount(symbol, band.lower),
        format_amount(symbol, band.upper)
    );
    let declared_fmt = format_amount(symbol, declared);
    let approximate = if mentions.iter().any(|m| m.approximate) {
        " Some amounts used an approximate exchange rate."
    } else {
        ""
    };

    let (score, status, relation) = match band.position(declared) {
        BandPosition::Within => (1.0, PriceStatus::Reasonable, format!("is within the {range}")),
        BandPosition::Below(f) => {
            let status = if f <= SLIGHT_TOLERANCE { PriceStatus::SlightlyOff } else { PriceStatus::TooLow };
            (if status == PriceStatus::TooLow { 0.0 } else { 0.5 }, status, format!("is {} below the {range}", format_percent(f)))
        }
        BandPosition::Above(f) => {
            let status = if f <= SLIGHT_TOLERANCE { PriceStatus::SlightlyOff } else { PriceStatus::TooHigh };
            (if status == PriceStatus::TooHigh { 0.0 } else { 0.5 }, status, format!("is {} above the {range}", format_percent(f)))
        }
    };

    let sources = cite(mentions.iter().map(|m| m.source_id.as_str()));
    tracing::debug!(status = ?status, sources = %sources, "price check");
    CheckResult::new(
        score,
        status,
        format!("Declared {declared_fmt} {relation} (observed {evidence}).{approximate}"),
    )
}
