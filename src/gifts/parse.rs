use anyhow::{Context, Result};
use serde::Deserialize;

use super::item::{ItemStatus, PricedItem, symbol_for};

pub const PLACEHOLDER_IMAGE: &str = "https://placehold.co/60x60/333/FFF?text=Gift";

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawGift {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub variant_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub price_usd: Option<f64>,
    #[serde(default)]
    pub price_ton: Option<f64>,
    #[serde(default)]
    pub min_price_usd: Option<f64>,
    #[serde(default)]
    pub min_price_ton: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub is_valid: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawGiftsResponse {
    #[serde(default)]
    pub gifts: Vec<RawGift>,
    #[serde(default)]
    pub ton_price: Option<f64>,
    #[serde(default)]
    pub is_stale: bool,
    #[serde(default)]
    pub source: String,
}

impl RawGiftsResponse {
    /// Upstream marks synthesized responses through `source`.
    pub fn is_placeholder(&self) -> bool {
        matches!(
            self.source.as_str(),
            "placeholder" | "fallback" | "empty_cache"
        )
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawCollection {
    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawCollectionsResponse {
    #[serde(default)]
    pub collections: Vec<RawCollection>,
    #[serde(default)]
    pub is_stale: bool,
    #[serde(default)]
    pub source: String,
}

pub fn parse_gifts_response(raw: &str) -> Result<RawGiftsResponse> {
    serde_json::from_str(raw).context("invalid JSON in gifts response")
}

pub fn parse_collections_response(raw: &str) -> Result<RawCollectionsResponse> {
    serde_json::from_str(raw).context("invalid JSON in collections response")
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|value| value.is_finite() && *value > 0.0)
}

pub(super) fn normalize_gift(raw: &RawGift, index: usize, placeholder_source: bool) -> PricedItem {
    let model_name = non_empty(&raw.model_name)
        .or_else(|| non_empty(&raw.name))
        .unwrap_or("Unknown")
        .to_owned();
    let id = non_empty(&raw.id)
        .map(str::to_owned)
        .or_else(|| non_empty(&raw.model_name).map(str::to_owned))
        .unwrap_or_else(|| format!("gift_{index}"));
    let display_name = non_empty(&raw.name)
        .or_else(|| non_empty(&raw.model_name))
        .unwrap_or("Gift")
        .to_owned();

    let price_usd = positive(raw.price_usd)
        .or_else(|| positive(raw.min_price_usd))
        .unwrap_or(0.0);
    let price_ton = positive(raw.price_ton)
        .or_else(|| positive(raw.min_price_ton))
        .unwrap_or(0.0);

    let is_valid = raw.is_valid.unwrap_or(true);
    let status = if placeholder_source || price_usd <= 0.0 {
        ItemStatus::Pending
    } else if is_valid {
        ItemStatus::Live
    } else {
        ItemStatus::Failed
    };

    PricedItem {
        id,
        symbol_label: symbol_for(&model_name),
        display_name,
        variant_name: non_empty(&raw.variant_name).map(str::to_owned),
        image_ref: Some(
            non_empty(&raw.image)
                .unwrap_or(PLACEHOLDER_IMAGE)
                .to_owned(),
        ),
        value_metric: Some(price_usd),
        change_ratio: raw
            .price_change_percentage_24h
            .filter(|change| change.is_finite()),
        price_usd,
        price_ton,
        status,
        is_sentinel: false,
        model_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_gifts_with_missing_fields() {
        let raw = r#"{
            "gifts": [
                {"id": "1", "model_name": "Plush Pepe", "name": "Plush Pepe", "min_price_usd": 113.0,
                 "min_price_ton": 45.2, "image": "https://example.test/pepe.png",
                 "price_change_percentage_24h": 12.5, "is_valid": true},
                {"model_name": "Top Hat"},
                {}
            ],
            "ton_price": 2.5,
            "source": "cache",
            "success_rate": "66%"
        }"#;

        let response = parse_gifts_response(raw).expect("parse gifts");
        assert_eq!(response.gifts.len(), 3);
        assert_eq!(response.ton_price, Some(2.5));
        assert!(!response.is_placeholder());

        let pepe = normalize_gift(&response.gifts[0], 0, false);
        assert_eq!(pepe.id, "1");
        assert_eq!(pepe.symbol_label, "PLU");
        assert_eq!(pepe.price_usd, 113.0);
        assert_eq!(pepe.value_metric, Some(113.0));
        assert_eq!(pepe.status, ItemStatus::Live);

        let hat = normalize_gift(&response.gifts[1], 1, false);
        assert_eq!(hat.id, "Top Hat");
        assert_eq!(hat.status, ItemStatus::Pending);
        assert_eq!(hat.change_ratio, None);
        assert_eq!(hat.image_ref.as_deref(), Some(PLACEHOLDER_IMAGE));

        let unknown = normalize_gift(&response.gifts[2], 2, false);
        assert_eq!(unknown.id, "gift_2");
        assert_eq!(unknown.model_name, "Unknown");
    }

    #[test]
    fn price_usd_wins_over_floor_price() {
        let raw = RawGift {
            model_name: Some("Swiss Watch".to_owned()),
            price_usd: Some(40.0),
            min_price_usd: Some(38.0),
            ..RawGift::default()
        };
        assert_eq!(normalize_gift(&raw, 0, false).price_usd, 40.0);
    }

    #[test]
    fn placeholder_sources_mark_gifts_pending() {
        let response = parse_gifts_response(
            r#"{"gifts": [{"model_name": "Ion Gem", "min_price_usd": 9.0}], "source": "empty_cache"}"#,
        )
        .expect("parse gifts");
        assert!(response.is_placeholder());
        let gift = normalize_gift(&response.gifts[0], 0, response.is_placeholder());
        assert_eq!(gift.status, ItemStatus::Pending);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(parse_collections_response("[1, 2").is_err());
        let collections = parse_collections_response(
            r#"{"collections": [{"name": "Hex Pot", "count": 3, "floor": "2 TON"}], "is_stale": true}"#,
        )
        .expect("parse collections");
        assert_eq!(collections.collections[0].name, "Hex Pot");
        assert!(collections.is_stale);
    }
}
