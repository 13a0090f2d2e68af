use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use rand::Rng;
use reqwest::blocking::Client;

use super::parse::{
    RawCollection, RawCollectionsResponse, RawGift, RawGiftsResponse, parse_collections_response,
    parse_gifts_response,
};

/// Upstream pricing API. Implementations block; callers run them off the UI thread.
pub trait PriceSource: Send {
    fn cached_gifts(&self, collections: &[String]) -> Result<RawGiftsResponse>;
    fn live_gifts(&self, collections: &[String]) -> Result<RawGiftsResponse>;
    fn cached_collections(&self) -> Result<RawCollectionsResponse>;
    fn live_collections(&self) -> Result<RawCollectionsResponse>;
    fn describe(&self) -> String;
}

pub struct HttpPriceSource {
    base_url: String,
    client: Client,
}

impl HttpPriceSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim_end_matches('/');
        let base_url = trimmed.strip_suffix("/api").unwrap_or(trimmed).to_owned();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { base_url, client })
    }

    fn get_text(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .with_context(|| format!("request to {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("{url} answered with status {status}"));
        }

        response
            .text()
            .with_context(|| format!("failed to read response body from {url}"))
    }
}

impl PriceSource for HttpPriceSource {
    fn cached_gifts(&self, collections: &[String]) -> Result<RawGiftsResponse> {
        let raw = self.get_text(
            "/api/gifts/cache",
            &[("target_items", collections.join(","))],
        )?;
        parse_gifts_response(&raw)
    }

    fn live_gifts(&self, collections: &[String]) -> Result<RawGiftsResponse> {
        let raw = self.get_text(
            "/api/gifts",
            &[
                ("target_items", collections.join(",")),
                ("allow_stale", "true".to_owned()),
            ],
        )?;
        parse_gifts_response(&raw)
    }

    fn cached_collections(&self) -> Result<RawCollectionsResponse> {
        let raw = self.get_text("/api/collections", &[("use_cache", "true".to_owned())])?;
        parse_collections_response(&raw)
    }

    fn live_collections(&self) -> Result<RawCollectionsResponse> {
        let raw = self.get_text("/api/collections", &[])?;
        parse_collections_response(&raw)
    }

    fn describe(&self) -> String {
        format!("api {}", self.base_url)
    }
}

struct MockGift {
    id: &'static str,
    model_name: &'static str,
    name: &'static str,
    variant_name: Option<&'static str>,
    price_ton: f64,
    price_usd: f64,
    change: f64,
}

const MOCK_TON_PRICE: f64 = 2.5;

const MOCK_GIFTS: [MockGift; 5] = [
    MockGift {
        id: "1",
        model_name: "Dragon Series",
        name: "Golden Dragon",
        variant_name: Some("Limited Edition"),
        price_ton: 45.2,
        price_usd: 113.0,
        change: 12.5,
    },
    MockGift {
        id: "2",
        model_name: "Cyber Punk World",
        name: "Cyber Punk Avatar",
        variant_name: Some("Rare"),
        price_ton: 28.7,
        price_usd: 71.75,
        change: -2.3,
    },
    MockGift {
        id: "3",
        model_name: "Ocean Guardians",
        name: "Ocean Warrior",
        variant_name: Some("Epic"),
        price_ton: 67.9,
        price_usd: 169.75,
        change: 5.7,
    },
    MockGift {
        id: "4",
        model_name: "Forest Creatures",
        name: "Forest Guardian",
        variant_name: None,
        price_ton: 15.3,
        price_usd: 38.25,
        change: 8.1,
    },
    MockGift {
        id: "5",
        model_name: "Mythical Beasts",
        name: "Fire Phoenix",
        variant_name: Some("Legendary"),
        price_ton: 120.5,
        price_usd: 301.25,
        change: 15.2,
    },
];

/// Offline stand-in for the pricing API.
#[derive(Default)]
pub struct MockPriceSource;

impl MockPriceSource {
    fn gifts(&self, drift: bool) -> RawGiftsResponse {
        let mut rng = rand::rng();
        let gifts = MOCK_GIFTS
            .iter()
            .map(|gift| {
                let factor = if drift {
                    rng.random_range(0.95..1.05)
                } else {
                    1.0
                };
                let change = if drift {
                    rng.random_range(-15.0..15.0)
                } else {
                    gift.change
                };
                RawGift {
                    id: Some(gift.id.to_owned()),
                    model_name: Some(gift.model_name.to_owned()),
                    variant_name: gift.variant_name.map(str::to_owned),
                    name: Some(gift.name.to_owned()),
                    image: None,
                    price_usd: Some(gift.price_usd * factor),
                    price_ton: Some(gift.price_ton * factor),
                    min_price_usd: Some(gift.price_usd * factor),
                    min_price_ton: Some(gift.price_ton * factor),
                    price_change_percentage_24h: Some(change),
                    is_valid: Some(true),
                }
            })
            .collect();

        let ton_price = if drift {
            MOCK_TON_PRICE + rng.random_range(-0.05..0.05)
        } else {
            MOCK_TON_PRICE
        };

        RawGiftsResponse {
            gifts,
            ton_price: Some(ton_price),
            is_stale: false,
            source: if drift { "mock_data_updated" } else { "mock_data" }.to_owned(),
        }
    }

    fn collections(&self) -> RawCollectionsResponse {
        RawCollectionsResponse {
            collections: MOCK_GIFTS
                .iter()
                .map(|gift| RawCollection {
                    name: gift.model_name.to_owned(),
                })
                .collect(),
            is_stale: false,
            source: "mock_data".to_owned(),
        }
    }
}

impl PriceSource for MockPriceSource {
    fn cached_gifts(&self, _collections: &[String]) -> Result<RawGiftsResponse> {
        Ok(self.gifts(false))
    }

    fn live_gifts(&self, _collections: &[String]) -> Result<RawGiftsResponse> {
        Ok(self.gifts(true))
    }

    fn cached_collections(&self) -> Result<RawCollectionsResponse> {
        Ok(self.collections())
    }

    fn live_collections(&self) -> Result<RawCollectionsResponse> {
        Ok(self.collections())
    }

    fn describe(&self) -> String {
        "mock data".to_owned()
    }
}
