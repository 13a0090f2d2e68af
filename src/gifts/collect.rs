use anyhow::Result;
use tracing::{info, warn};

use super::item::{CollectionList, Freshness, GiftSnapshot, ItemStatus, PricedItem};
use super::parse::{RawGiftsResponse, normalize_gift};
use super::source::PriceSource;

const FALLBACK_COLLECTIONS: &[&str] = &[
    "Plush Pepe",
    "Eternal Candle",
    "Snoop Dogg",
    "Jingle Bells",
    "Pet Snake",
    "Tama Gadget",
    "Lunar Snake",
    "Snow Mittens",
    "Witch Hat",
    "Lol Pop",
    "Spy Agaric",
    "Bunny Muffin",
    "Low Rider",
    "Whip Cupcake",
    "Berry Box",
    "Swag Bag",
    "Precious Peach",
    "Light Sword",
    "Durov's Cap",
    "Bow Tie",
    "Candy Cane",
    "Heroic Helmet",
    "Sleigh Bell",
    "Snake Box",
    "Neko Helmet",
    "Diamond Ring",
    "Sakura Flower",
    "Westside Sign",
    "Evil Eye",
    "Record Player",
    "Skull Flower",
    "Easter Egg",
    "B-Day Candle",
    "Desk Calendar",
    "Star Notepad",
    "Joyful Bundle",
    "Sharp Tongue",
    "Snow Globe",
    "Holiday Drink",
    "Flying Broom",
    "Big Year",
    "Hypno Lollipop",
    "Genie Lamp",
    "Bonded Ring",
    "Spiced Wine",
    "Snoop Cigar",
    "Xmas Stocking",
    "Homemade Cake",
    "Toy Bear",
    "Vintage Cigar",
    "Signet Ring",
    "Gem Signet",
    "Lush Bouquet",
    "Santa Hat",
    "Winter Wreath",
    "Nail Bracelet",
    "Ginger Cookie",
    "Perfume Bottle",
    "Crystal Ball",
    "Mini Oscar",
    "Jelly Bunny",
    "Jester Hat",
    "Cookie Heart",
    "Jack-in-the-Box",
    "Hanging Star",
    "Trapped Heart",
    "Heart Locket",
    "Magic Potion",
    "Mad Pumpkin",
    "Party Sparkler",
    "Cupid Charm",
    "Kissed Frog",
    "Loot Bag",
    "Eternal Rose",
    "Love Candle",
    "Electric Skull",
    "Valentine Box",
    "Hex Pot",
    "Swiss Watch",
    "Top Hat",
    "Scared Cat",
    "Love Potion",
    "Astral Shard",
    "Ion Gem",
    "Voodoo Doll",
    "Restless Jar",
];

fn fallback_collections() -> Vec<String> {
    FALLBACK_COLLECTIONS
        .iter()
        .map(|name| (*name).to_owned())
        .collect()
}

fn dedup_preserving_order(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    names
        .into_iter()
        .map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty() && seen.insert(name.clone()))
        .collect()
}

/// Cached list first, live list second, built-in list when both fail or come back empty.
pub fn load_collections(source: &dyn PriceSource) -> CollectionList {
    let (response, freshness) = match source.cached_collections() {
        Ok(response) => (Ok(response), Freshness::Cache),
        Err(error) => {
            warn!(error = %error, "cached collection list unavailable, trying live list");
            match source.live_collections() {
                Ok(response) => {
                    let freshness = if response.is_stale {
                        Freshness::Stale
                    } else {
                        Freshness::Live
                    };
                    (Ok(response), freshness)
                }
                Err(error) => (Err(error), Freshness::Placeholder),
            }
        }
    };

    match response {
        Ok(response) => {
            let names = dedup_preserving_order(
                response
                    .collections
                    .into_iter()
                    .map(|collection| collection.name),
            );
            if names.is_empty() {
                warn!(source = %response.source, "collection list is empty, using built-in list");
                return CollectionList {
                    names: fallback_collections(),
                    freshness: Freshness::Placeholder,
                    error: None,
                };
            }

            info!(count = names.len(), source = %response.source, "loaded collection list");
            CollectionList {
                names,
                freshness,
                error: None,
            }
        }
        Err(error) => {
            warn!(error = %error, "collection list unavailable, using built-in list");
            CollectionList {
                names: fallback_collections(),
                freshness,
                error: Some(format!("failed to load collection list: {error:#}")),
            }
        }
    }
}

fn fetch_gifts(
    source: &dyn PriceSource,
    collections: &[String],
    prefer_cache: bool,
) -> Result<(RawGiftsResponse, Freshness)> {
    if prefer_cache {
        match source.cached_gifts(collections) {
            Ok(response) => return Ok((response, Freshness::Cache)),
            Err(error) => {
                warn!(error = %error, "cached gift prices unavailable, falling back to live prices");
            }
        }
    }

    let response = source.live_gifts(collections)?;
    let freshness = if response.is_stale {
        Freshness::Stale
    } else {
        Freshness::Live
    };
    Ok((response, freshness))
}

/// Loads prices for `collections` and merges them into one item per collection.
///
/// Never fails: a failed live fetch produces error placeholders so the canvas
/// can still render every collection.
pub fn load_gifts(
    source: &dyn PriceSource,
    collections: &[String],
    prefer_cache: bool,
) -> GiftSnapshot {
    let (response, freshness) = match fetch_gifts(source, collections, prefer_cache) {
        Ok(result) => result,
        Err(error) => {
            warn!(error = %error, "gift prices unavailable, showing placeholders");
            return GiftSnapshot {
                items: collections
                    .iter()
                    .map(|collection| PricedItem::placeholder(collection, ItemStatus::Failed))
                    .collect(),
                freshness: Freshness::Placeholder,
                ton_price: None,
                has_placeholder_data: true,
                error: Some(format!("failed to load gift prices: {error:#}")),
            };
        }
    };

    let placeholder_source = response.is_placeholder();
    let freshness = if placeholder_source {
        Freshness::Placeholder
    } else {
        freshness
    };

    let normalized = response
        .gifts
        .iter()
        .enumerate()
        .map(|(index, raw)| normalize_gift(raw, index, placeholder_source))
        .collect::<Vec<_>>();

    let has_placeholder_data = placeholder_source
        || response
            .gifts
            .iter()
            .zip(&normalized)
            .any(|(raw, gift)| raw.is_valid == Some(false) || gift.price_usd <= 0.0);

    let items = merge_by_collection(collections, normalized);

    info!(
        items = items.len(),
        loaded = items.iter().filter(|item| item.is_loaded()).count(),
        freshness = freshness.label(),
        source = %response.source,
        "loaded gift prices"
    );

    GiftSnapshot {
        items,
        freshness,
        ton_price: response.ton_price.filter(|price| price.is_finite() && *price > 0.0),
        has_placeholder_data,
        error: None,
    }
}

fn merge_by_collection(collections: &[String], gifts: Vec<PricedItem>) -> Vec<PricedItem> {
    let mut gifts = gifts.into_iter().map(Some).collect::<Vec<_>>();
    collections
        .iter()
        .map(|collection| {
            let found = gifts.iter_mut().find(|slot| {
                slot.as_ref()
                    .is_some_and(|gift| &gift.model_name == collection && gift.is_loaded())
            });
            found
                .and_then(Option::take)
                .unwrap_or_else(|| PricedItem::placeholder(collection, ItemStatus::Pending))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use anyhow::anyhow;

    use super::*;
    use crate::gifts::parse::{RawCollection, RawCollectionsResponse, RawGift};

    #[derive(Default)]
    struct ScriptedSource {
        cached_gifts: Option<RawGiftsResponse>,
        live_gifts: Option<RawGiftsResponse>,
        cached_collections: Option<RawCollectionsResponse>,
        live_collections: Option<RawCollectionsResponse>,
        calls: RefCell<Vec<&'static str>>,
    }

    impl PriceSource for ScriptedSource {
        fn cached_gifts(&self, _collections: &[String]) -> Result<RawGiftsResponse> {
            self.calls.borrow_mut().push("cached_gifts");
            self.cached_gifts.clone().ok_or_else(|| anyhow!("cache down"))
        }

        fn live_gifts(&self, _collections: &[String]) -> Result<RawGiftsResponse> {
            self.calls.borrow_mut().push("live_gifts");
            self.live_gifts.clone().ok_or_else(|| anyhow!("api down"))
        }

        fn cached_collections(&self) -> Result<RawCollectionsResponse> {
            self.calls.borrow_mut().push("cached_collections");
            self.cached_collections
                .clone()
                .ok_or_else(|| anyhow!("cache down"))
        }

        fn live_collections(&self) -> Result<RawCollectionsResponse> {
            self.calls.borrow_mut().push("live_collections");
            self.live_collections
                .clone()
                .ok_or_else(|| anyhow!("api down"))
        }

        fn describe(&self) -> String {
            "scripted".to_owned()
        }
    }

    fn gift(model: &str, usd: f64) -> RawGift {
        RawGift {
            id: Some(format!("id-{model}")),
            model_name: Some(model.to_owned()),
            name: Some(model.to_owned()),
            price_usd: Some(usd),
            min_price_usd: Some(usd),
            price_change_percentage_24h: Some(1.5),
            is_valid: Some(true),
            ..RawGift::default()
        }
    }

    fn gifts_response(gifts: Vec<RawGift>, source: &str) -> RawGiftsResponse {
        RawGiftsResponse {
            gifts,
            ton_price: Some(2.5),
            is_stale: false,
            source: source.to_owned(),
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|name| (*name).to_owned()).collect()
    }

    #[test]
    fn cache_hit_skips_live_fetch() {
        let source = ScriptedSource {
            cached_gifts: Some(gifts_response(vec![gift("Top Hat", 12.0)], "cache")),
            ..ScriptedSource::default()
        };

        let snapshot = load_gifts(&source, &names(&["Top Hat"]), true);
        assert_eq!(snapshot.freshness, Freshness::Cache);
        assert_eq!(*source.calls.borrow(), vec!["cached_gifts"]);
        assert_eq!(snapshot.items[0].id, "id-Top Hat");
        assert!(!snapshot.has_placeholder_data);
    }

    #[test]
    fn cache_failure_falls_back_to_live() {
        let mut live = gifts_response(vec![gift("Top Hat", 12.0)], "live");
        live.is_stale = true;
        let source = ScriptedSource {
            live_gifts: Some(live),
            ..ScriptedSource::default()
        };

        let snapshot = load_gifts(&source, &names(&["Top Hat"]), true);
        assert_eq!(snapshot.freshness, Freshness::Stale);
        assert_eq!(*source.calls.borrow(), vec!["cached_gifts", "live_gifts"]);
    }

    #[test]
    fn background_refresh_goes_straight_to_live() {
        let source = ScriptedSource {
            cached_gifts: Some(gifts_response(vec![gift("Top Hat", 12.0)], "cache")),
            live_gifts: Some(gifts_response(vec![gift("Top Hat", 13.0)], "live")),
            ..ScriptedSource::default()
        };

        let snapshot = load_gifts(&source, &names(&["Top Hat"]), false);
        assert_eq!(snapshot.freshness, Freshness::Live);
        assert_eq!(snapshot.items[0].price_usd, 13.0);
        assert_eq!(*source.calls.borrow(), vec!["live_gifts"]);
    }

    #[test]
    fn total_failure_synthesizes_error_placeholders() {
        let source = ScriptedSource::default();
        let snapshot = load_gifts(&source, &names(&["Top Hat", "Swag Bag"]), true);

        assert_eq!(snapshot.freshness, Freshness::Placeholder);
        assert!(snapshot.has_placeholder_data);
        assert!(snapshot.error.is_some());
        let ids = snapshot
            .items
            .iter()
            .map(|item| item.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["error_Top Hat", "error_Swag Bag"]);
        assert!(
            snapshot
                .items
                .iter()
                .all(|item| item.status == ItemStatus::Failed)
        );
    }

    #[test]
    fn merge_keeps_collection_order_and_fills_gaps() {
        let source = ScriptedSource {
            cached_gifts: Some(gifts_response(
                vec![gift("Swag Bag", 4.0), gift("Lol Pop", 0.0)],
                "cache",
            )),
            ..ScriptedSource::default()
        };

        let snapshot = load_gifts(&source, &names(&["Lol Pop", "Swag Bag", "Top Hat"]), true);
        let ids = snapshot
            .items
            .iter()
            .map(|item| item.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["placeholder_Lol Pop", "id-Swag Bag", "placeholder_Top Hat"]);
        assert!(snapshot.has_placeholder_data);
        assert_eq!(snapshot.cheapest().map(|item| item.price_usd), Some(4.0));
    }

    #[test]
    fn placeholder_response_is_tagged() {
        let source = ScriptedSource {
            cached_gifts: Some(gifts_response(vec![gift("Top Hat", 12.0)], "placeholder")),
            ..ScriptedSource::default()
        };

        let snapshot = load_gifts(&source, &names(&["Top Hat"]), true);
        assert_eq!(snapshot.freshness, Freshness::Placeholder);
        assert!(snapshot.has_placeholder_data);
        assert_eq!(snapshot.items[0].status, ItemStatus::Pending);
    }

    #[test]
    fn collections_fall_back_in_order() {
        let source = ScriptedSource {
            live_collections: Some(RawCollectionsResponse {
                collections: vec![
                    RawCollection {
                        name: "Hex Pot".to_owned(),
                    },
                    RawCollection {
                        name: "Hex Pot".to_owned(),
                    },
                    RawCollection {
                        name: "Ion Gem".to_owned(),
                    },
                ],
                is_stale: true,
                source: "live".to_owned(),
            }),
            ..ScriptedSource::default()
        };

        let list = load_collections(&source);
        assert_eq!(list.names, names(&["Hex Pot", "Ion Gem"]));
        assert_eq!(list.freshness, Freshness::Stale);
        assert!(list.error.is_none());
    }

    #[test]
    fn collections_use_builtin_list_when_unavailable() {
        let list = load_collections(&ScriptedSource::default());
        assert_eq!(list.names.len(), FALLBACK_COLLECTIONS.len());
        assert!(list.error.is_some());

        let empty = ScriptedSource {
            cached_collections: Some(RawCollectionsResponse::default()),
            ..ScriptedSource::default()
        };
        let list = load_collections(&empty);
        assert_eq!(list.names.len(), FALLBACK_COLLECTIONS.len());
        assert!(list.error.is_none());
    }
}
