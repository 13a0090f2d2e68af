#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemStatus {
    Live,
    Pending,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Freshness {
    Cache,
    Live,
    Stale,
    Placeholder,
}

impl Freshness {
    pub fn label(self) -> &'static str {
        match self {
            Self::Cache => "cached data",
            Self::Live => "live data",
            Self::Stale => "stale data",
            Self::Placeholder => "placeholder data",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PricedItem {
    pub id: String,
    pub display_name: String,
    pub symbol_label: String,
    pub model_name: String,
    pub variant_name: Option<String>,
    pub image_ref: Option<String>,
    pub value_metric: Option<f64>,
    pub change_ratio: Option<f64>,
    pub price_usd: f64,
    pub price_ton: f64,
    pub status: ItemStatus,
    pub is_sentinel: bool,
}

impl PricedItem {
    /// Missing or negative values collapse to zero; sizing treats zero as minimal.
    pub fn value(&self) -> f64 {
        self.value_metric
            .filter(|value| value.is_finite())
            .map(f64::abs)
            .unwrap_or(0.0)
    }

    pub fn change(&self) -> f64 {
        self.change_ratio
            .filter(|change| change.is_finite())
            .unwrap_or(0.0)
    }

    pub fn is_loaded(&self) -> bool {
        self.status == ItemStatus::Live && self.price_usd > 0.0 && !self.is_sentinel
    }

    pub fn placeholder(collection: &str, status: ItemStatus) -> Self {
        let prefix = if status == ItemStatus::Failed {
            "error"
        } else {
            "placeholder"
        };

        Self {
            id: format!("{prefix}_{collection}"),
            display_name: collection.to_owned(),
            symbol_label: symbol_for(collection),
            model_name: collection.to_owned(),
            variant_name: None,
            image_ref: None,
            value_metric: Some(0.0),
            change_ratio: Some(0.0),
            price_usd: 0.0,
            price_ton: 0.0,
            status,
            is_sentinel: false,
        }
    }
}

pub fn symbol_for(name: &str) -> String {
    name.chars().take(3).collect::<String>().to_uppercase()
}

#[derive(Clone, Debug)]
pub struct GiftSnapshot {
    pub items: Vec<PricedItem>,
    pub freshness: Freshness,
    pub ton_price: Option<f64>,
    pub has_placeholder_data: bool,
    pub error: Option<String>,
}

impl GiftSnapshot {
    pub fn cheapest(&self) -> Option<&PricedItem> {
        self.items
            .iter()
            .filter(|item| item.is_loaded())
            .min_by(|a, b| a.price_usd.total_cmp(&b.price_usd))
    }

    pub fn movers(&self) -> (usize, usize) {
        let up = self
            .items
            .iter()
            .filter(|item| item.change_ratio.is_some_and(|change| change > 0.0))
            .count();
        let down = self
            .items
            .iter()
            .filter(|item| item.change_ratio.is_some_and(|change| change < 0.0))
            .count();
        (up, down)
    }
}

#[derive(Clone, Debug)]
pub struct CollectionList {
    pub names: Vec<String>,
    pub freshness: Freshness,
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priced(id: &str, usd: f64, change: Option<f64>) -> PricedItem {
        PricedItem {
            id: id.to_owned(),
            display_name: id.to_owned(),
            symbol_label: symbol_for(id),
            model_name: id.to_owned(),
            variant_name: None,
            image_ref: None,
            value_metric: Some(usd),
            change_ratio: change,
            price_usd: usd,
            price_ton: usd / 2.5,
            status: ItemStatus::Live,
            is_sentinel: false,
        }
    }

    #[test]
    fn missing_metrics_read_as_neutral() {
        let mut item = priced("Berry Box", 10.0, None);
        item.value_metric = None;
        assert_eq!(item.value(), 0.0);
        assert_eq!(item.change(), 0.0);

        item.value_metric = Some(f64::NAN);
        assert_eq!(item.value(), 0.0);
    }

    #[test]
    fn cheapest_ignores_placeholders() {
        let snapshot = GiftSnapshot {
            items: vec![
                priced("Swag Bag", 12.0, Some(1.0)),
                PricedItem::placeholder("Top Hat", ItemStatus::Pending),
                priced("Lol Pop", 3.5, Some(-2.0)),
            ],
            freshness: Freshness::Cache,
            ton_price: Some(2.5),
            has_placeholder_data: true,
            error: None,
        };

        assert_eq!(snapshot.cheapest().map(|item| item.id.as_str()), Some("Lol Pop"));
        assert_eq!(snapshot.movers(), (1, 1));
    }

    #[test]
    fn placeholder_ids_encode_status() {
        let pending = PricedItem::placeholder("Snow Globe", ItemStatus::Pending);
        let failed = PricedItem::placeholder("Snow Globe", ItemStatus::Failed);
        assert_eq!(pending.id, "placeholder_Snow Globe");
        assert_eq!(failed.id, "error_Snow Globe");
        assert_eq!(pending.symbol_label, "SNO");
        assert!(!pending.is_loaded());
    }
}
