// Blend calculator: weighted average price of an ordered product list.

use crate::error::BlendError;
use crate::reorder;
use serde::Serialize;
use shared::models::{BlendProduct, ProductId};
use shared::utils::number_format::{format_number, parse_formatted_number};

/// The percentages are accepted as summing to 100 within this distance.
pub const PERCENTAGE_TOLERANCE: f64 = 0.01;
pub const PRICE_DECIMALS: usize = 4;
pub const PERCENTAGE_DECIMALS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendField {
    Name,
    Price,
    Percentage,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlendEdit {
    pub product_id: ProductId,
    pub field: BlendField,
    pub raw: String,
}

impl BlendEdit {
    pub fn new(product_id: ProductId, field: BlendField, raw: impl Into<String>) -> Self {
        BlendEdit {
            product_id,
            field,
            raw: raw.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlendEditOutcome {
    Applied,
    Rejected { restored: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlendSummary {
    pub total_percentage: f64,
    pub valid: bool,
    /// 0 whenever `valid` is false.
    pub blended_price: f64,
    pub warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Blend {
    products: Vec<BlendProduct>,
}

impl Default for Blend {
    fn default() -> Self {
        Self::new()
    }
}

impl Blend {
    pub fn new() -> Self {
        Blend {
            products: vec![BlendProduct::empty(), BlendProduct::empty()],
        }
    }

    /// Loads a saved list. Ids are reissued so two loads never collide.
    pub fn from_products(products: Vec<BlendProduct>) -> Self {
        let mut products: Vec<BlendProduct> = products
            .into_iter()
            .map(|product| BlendProduct {
                id: uuid::Uuid::new_v4(),
                ..product
            })
            .collect();
        if products.is_empty() {
            products.push(BlendProduct::empty());
        }
        Blend { products }
    }

    pub fn products(&self) -> &[BlendProduct] {
        &self.products
    }

    pub fn product(&self, id: ProductId) -> Result<&BlendProduct, BlendError> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .ok_or(BlendError::ProductNotFound(id))
    }

    fn product_index(&self, id: ProductId) -> Result<usize, BlendError> {
        reorder::position(&self.products, id).ok_or(BlendError::ProductNotFound(id))
    }

    pub fn add_product(&mut self) -> ProductId {
        let product = BlendProduct::empty();
        let id = product.id;
        self.products.push(product);
        tracing::debug!(product_id = %id, "Adding blend product");
        id
    }

    pub fn remove_product(&mut self, id: ProductId) -> Result<BlendProduct, BlendError> {
        let index = self.product_index(id)?;
        if self.products.len() <= 1 {
            return Err(BlendError::LastProduct);
        }
        Ok(self.products.remove(index))
    }

    pub fn commit_edit(&mut self, edit: &BlendEdit) -> Result<BlendEditOutcome, BlendError> {
        let index = self.product_index(edit.product_id)?;
        let product = &mut self.products[index];

        let accepted = match edit.field {
            BlendField::Name => {
                product.name = edit.raw.clone();
                return Ok(BlendEditOutcome::Applied);
            }
            BlendField::Price => parse_formatted_number(&edit.raw).ok().filter(|v| *v >= 0.0),
            BlendField::Percentage => parse_formatted_number(&edit.raw)
                .ok()
                .filter(|v| (0.0..=100.0).contains(v)),
        };

        match (edit.field, accepted) {
            (BlendField::Price, Some(price)) => product.price = price,
            (BlendField::Percentage, Some(percentage)) => product.percentage = percentage,
            (field, _) => {
                let restored = match field {
                    BlendField::Percentage => format_number(product.percentage, PERCENTAGE_DECIMALS),
                    _ => format_number(product.price, PRICE_DECIMALS),
                };
                tracing::debug!(product_id = %edit.product_id, raw = %edit.raw, "Discarding unparseable blend edit");
                return Ok(BlendEditOutcome::Rejected { restored });
            }
        }
        Ok(BlendEditOutcome::Applied)
    }

    pub fn move_to_index(&mut self, id: ProductId, index: usize) -> Result<bool, BlendError> {
        reorder::move_to_index(&mut self.products, id, index).ok_or(BlendError::ProductNotFound(id))
    }

    pub fn move_up(&mut self, id: ProductId) -> Result<bool, BlendError> {
        reorder::move_up(&mut self.products, id).ok_or(BlendError::ProductNotFound(id))
    }

    pub fn move_down(&mut self, id: ProductId) -> Result<bool, BlendError> {
        reorder::move_down(&mut self.products, id).ok_or(BlendError::ProductNotFound(id))
    }

    pub fn total_percentage(&self) -> f64 {
        self.products.iter().map(|p| p.percentage).sum()
    }

    pub fn is_valid(&self) -> bool {
        (self.total_percentage() - 100.0).abs() < PERCENTAGE_TOLERANCE
    }

    pub fn blended_price(&self) -> f64 {
        if !self.is_valid() {
            return 0.0;
        }
        self.products.iter().map(|p| p.price * p.percentage).sum::<f64>() / 100.0
    }

    pub fn summary(&self) -> BlendSummary {
        let total_percentage = self.total_percentage();
        let valid = self.is_valid();
        let warning = (!valid).then(|| {
            format!(
                "Total percentage must equal 100% (currently {}%)",
                format_number(total_percentage, PERCENTAGE_DECIMALS)
            )
        });
        BlendSummary {
            total_percentage,
            valid,
            blended_price: self.blended_price(),
            warning,
        }
    }
}
