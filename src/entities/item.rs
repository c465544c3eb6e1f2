use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SizeError {
    #[error("size must be either a numeric range or a symbol, not both")]
    SizeExclusive,
}

/// Sellable good within a store category.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    #[serde(rename = "storeID")]
    pub store_id: Uuid,
    #[serde(rename = "categoryID")]
    pub category_id: Uuid,
    pub name: String,
    pub article: String,
    pub description: String,
    #[serde(rename = "iconURL")]
    pub icon_url: String,
    pub color: String,
    /// Retail price.
    pub price: Decimal,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sizes: Vec<Size>,
    pub created_at: DateTime<Utc>,
}

/// Stock of one item size in one warehouse.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Size {
    pub id: Uuid,
    #[serde(rename = "itemID")]
    pub item_id: Uuid,
    #[serde(rename = "warehouseID")]
    pub warehouse_id: Uuid,
    /// Number range such as `36-40`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_number: Option<String>,
    /// Letter size such as `S`, `M`, `XL`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_symbol: Option<String>,
    pub quantity: i64,
    /// Cost of all items with this size.
    pub cost: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Item {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store_id: Uuid,
        category_id: Uuid,
        name: impl Into<String>,
        article: impl Into<String>,
        description: impl Into<String>,
        icon_url: impl Into<String>,
        color: impl Into<String>,
        price: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            store_id,
            category_id,
            name: name.into(),
            article: article.into(),
            description: description.into(),
            icon_url: icon_url.into(),
            color: color.into(),
            price,
            sizes: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Total units across all sizes.
    pub fn total_quantity(&self) -> i64 {
        self.sizes.iter().map(|s| s.quantity).sum()
    }
}

impl Size {
    pub fn new(
        item_id: Uuid,
        warehouse_id: Uuid,
        size_number: Option<String>,
        size_symbol: Option<String>,
        quantity: i64,
        cost: Decimal,
    ) -> Result<Self, SizeError> {
        if size_number.is_some() && size_symbol.is_some() {
            return Err(SizeError::SizeExclusive);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            item_id,
            warehouse_id,
            size_number,
            size_symbol,
            quantity,
            cost,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_number_and_symbol_are_exclusive() {
        let err = Size::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Some("36-40".to_string()),
            Some("M".to_string()),
            3,
            Decimal::new(1500, 2),
        )
        .unwrap_err();
        assert_eq!(err, SizeError::SizeExclusive);
    }

    #[test]
    fn item_sums_quantities() {
        let mut item = Item::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Sneakers",
            "SN-001",
            "",
            "",
            "ffffff",
            Decimal::new(4999, 2),
        );
        let warehouse = Uuid::new_v4();
        item.sizes.push(Size::new(item.id, warehouse, Some("36-40".into()), None, 4, Decimal::ZERO).unwrap());
        item.sizes.push(Size::new(item.id, warehouse, None, Some("XL".into()), 6, Decimal::ZERO).unwrap());
        assert_eq!(item.total_quantity(), 10);
    }
}
