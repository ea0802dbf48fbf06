use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use url::Url;

lazy_static! {
    static ref SPEC_CLAIM: Regex = Regex::new(
        r#"(?i)(\d+(?:\.\d+)?)\s?(?:(gb|tb|mah|mp|ghz|hz|w|mm|kg|inches|inch|hours|hrs)\b|("))"#
    ).unwrap();
    static ref TOKEN: Regex = Regex::new(r"[\p{L}\p{N}]+").unwrap();
}

/// Host of `link` without a leading `www.`.
pub fn domain_of(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    let host = url.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
}

/// Significant lowercase tokens of a product name: three or more characters,
/// or containing a digit ("2" in "Buds 2").
pub fn name_tokens(name: &str) -> Vec<String> {
    TOKEN
        .find_iter(&name.to_lowercase())
        .map(|m| m.as_str().to_string())
        .filter(|t| t.chars().count() >= 3 || t.chars().any(|c| c.is_ascii_digit()))
        .collect()
}

/// True when at least half of `tokens` occur as tokens of `text`.
pub fn mentions_name(text: &str, tokens: &[String]) -> bool {
    if tokens.is_empty() {
        return false;
    }
    let lower = text.to_lowercase();
    let present: Vec<&str> = TOKEN.find_iter(&lower).map(|m| m.as_str()).collect();
    let hits = tokens.iter().filter(|t| present.contains(&t.as_str())).count();
    hits * 2 >= tokens.len()
}

/// A numeric specification claim such as "40 hours" or "128GB".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecClaim {
    pub value: f64,
    pub unit: &'static str,
    pub raw: String,
}

fn canonical_unit(raw: &str) -> Option<&'static str> {
    Some(match raw.to_lowercase().as_str() {
        "gb" => "GB",
        "tb" => "TB",
        "mah" => "mAh",
        "mp" => "MP",
        "ghz" => "GHz",
        "hz" => "Hz",
        "w" => "W",
        "mm" => "mm",
        "kg" => "kg",
        "inch" | "inches" | "\"" => "inch",
        "hours" | "hrs" => "hours",
        _ => return None,
    })
}

pub fn spec_claims(text: &str) -> Vec<SpecClaim> {
    let mut claims: Vec<SpecClaim> = Vec::new();
    for caps in SPEC_CLAIM.captures_iter(text) {
        let unit = caps.get(2).or_else(|| caps.get(3)).and_then(|m| canonical_unit(m.as_str()));
        let (Ok(value), Some(unit)) = (caps[1].parse::<f64>(), unit) else {
            continue;
        };
        if !claims.iter().any(|c| c.unit == unit && c.value == value) {
            claims.push(SpecClaim { value, unit, raw: caps[0].trim().to_string() });
        }
    }
    claims
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_of_strips_www() {
        assert_eq!(domain_of("https://www.Flipkart.com/x?y=1").as_deref(), Some("flipkart.com"));
        assert_eq!(domain_of("garbage"), None);
    }

    #[test]
    fn test_name_match_threshold() {
        let tokens = name_tokens("Samsung Galaxy Buds 2");
        assert_eq!(tokens, vec!["samsung", "galaxy", "buds", "2"]);
        assert!(mentions_name("Galaxy Buds 2 review", &tokens));
        assert!(!mentions_name("Galaxy Watch 6", &tokens));
    }

    #[test]
    fn test_spec_claims_normalise_units() {
        let claims = spec_claims("Up to 40 hours playback, 6.1\" display, 128GB, 40 hrs");
        let pairs: Vec<(f64, &str)> = claims.iter().map(|c| (c.value, c.unit)).collect();
        assert_eq!(pairs, vec![(40.0, "hours"), (6.1, "inch"), (128.0, "GB")]);
    }
}
