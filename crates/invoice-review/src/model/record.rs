//! The extracted invoice record.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use super::edit::{FieldEdit, LineItemField};
use super::value::{FieldValue, NumericInput};
use crate::error::EditError;

/// Header key that identifies the order on the backend.
pub const ORDER_ID_KEY: &str = "SalesOrderID";
/// Header key shown to the user as the order label.
pub const ORDER_NUMBER_KEY: &str = "SalesOrderNumber";

/// Ordered header fields, exactly as the extraction service returned them.
pub type Header = IndexMap<String, FieldValue>;

/// Text field that the service may also fill with a bare number or bool.
fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(serde_json::Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected text or a number, got {}",
            other
        ))),
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_text(deserializer)?.unwrap_or_default())
}

fn null_as_empty_shared<'de, D>(deserializer: D) -> Result<Arc<str>, D::Error>
where
    D: Deserializer<'de>,
{
    null_as_empty(deserializer).map(Arc::from)
}

fn empty_shared() -> Arc<str> {
    Arc::from("")
}

/// Backend identifier of an order, taken from the `SalesOrderID` header field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderId(String);

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One product row of the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineItem {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub product_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_qty: Option<NumericInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<NumericInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_total: Option<NumericInput>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub color: String,
    #[serde(
        default,
        deserialize_with = "optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub size: Option<String>,
    /// Backend bookkeeping (`SalesOrderDetailID`, `ListPrice`, ...). Sent back
    /// untouched on save.
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl LineItem {
    pub fn new(product_number: impl Into<String>) -> Self {
        Self {
            product_number: product_number.into(),
            order_qty: None,
            unit_price: None,
            line_total: None,
            name: String::new(),
            color: String::new(),
            size: None,
            extra: IndexMap::new(),
        }
    }

    /// Replaces a single field. Numeric fields keep the value as given.
    pub fn set(&mut self, field: LineItemField, value: FieldValue) {
        match field {
            LineItemField::ProductNumber => self.product_number = value.to_input_text(),
            LineItemField::OrderQty => self.order_qty = Some(value.into()),
            LineItemField::UnitPrice => self.unit_price = Some(value.into()),
            LineItemField::LineTotal => self.line_total = Some(value.into()),
            LineItemField::Name => self.name = value.to_input_text(),
            LineItemField::Color => self.color = value.to_input_text(),
            LineItemField::Size => self.size = Some(value.to_input_text()),
        }
    }

    /// Rendering of a field for read-only display.
    pub fn display(&self, field: LineItemField) -> String {
        let numeric = |v: &Option<NumericInput>| {
            v.as_ref().map(ToString::to_string).unwrap_or_default()
        };
        match field {
            LineItemField::ProductNumber => self.product_number.clone(),
            LineItemField::OrderQty => numeric(&self.order_qty),
            LineItemField::UnitPrice => numeric(&self.unit_price),
            LineItemField::LineTotal => numeric(&self.line_total),
            LineItemField::Name => self.name.clone(),
            LineItemField::Color => self.color.clone(),
            LineItemField::Size => self
                .size
                .clone()
                .unwrap_or_else(|| super::value::MISSING_VALUE.to_string()),
        }
    }

    /// Copy with textual amounts converted to numbers. Fields whose text does
    /// not parse are left as entered and named in the returned list.
    fn coerced(&self) -> (LineItem, Vec<LineItemField>) {
        let mut item = self.clone();
        let mut unparsed = Vec::new();
        for (field, slot) in [
            (LineItemField::OrderQty, &mut item.order_qty),
            (LineItemField::UnitPrice, &mut item.unit_price),
            (LineItemField::LineTotal, &mut item.line_total),
        ] {
            let coerced = match slot.as_ref() {
                Some(input) if input.is_text() => input.coerced(),
                _ => continue,
            };
            match coerced {
                Some(number) => *slot = Some(number),
                None => unparsed.push(field),
            }
        }
        (item, unparsed)
    }

    fn has_text_amounts(&self) -> bool {
        [&self.order_qty, &self.unit_price, &self.line_total]
            .iter()
            .any(|slot| slot.as_ref().is_some_and(NumericInput::is_text))
    }
}

/// An invoice as returned by the extraction service.
///
/// Values are immutable: [`ExtractedRecord::apply`] returns a new record that
/// shares every section and line item it did not touch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    #[serde(rename = "SalesOrderHeader", default)]
    header: Arc<Header>,
    #[serde(rename = "SalesOrderDetail", default)]
    line_items: Arc<Vec<Arc<LineItem>>>,
    #[serde(
        rename = "CustomerInfo",
        default = "empty_shared",
        deserialize_with = "null_as_empty_shared"
    )]
    customer_info: Arc<str>,
    #[serde(
        rename = "BillingAddress",
        default = "empty_shared",
        deserialize_with = "null_as_empty_shared"
    )]
    billing_address: Arc<str>,
    #[serde(
        rename = "ShippingAddress",
        default = "empty_shared",
        deserialize_with = "null_as_empty_shared"
    )]
    shipping_address: Arc<str>,
}

impl ExtractedRecord {
    pub fn new(
        header: Header,
        line_items: Vec<LineItem>,
        customer_info: &str,
        billing_address: &str,
        shipping_address: &str,
    ) -> Self {
        Self {
            header: Arc::new(header),
            line_items: Arc::new(line_items.into_iter().map(Arc::new).collect()),
            customer_info: Arc::from(customer_info),
            billing_address: Arc::from(billing_address),
            shipping_address: Arc::from(shipping_address),
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn line_items(&self) -> &[Arc<LineItem>] {
        &self.line_items
    }

    pub fn customer_info(&self) -> &str {
        &self.customer_info
    }

    pub fn billing_address(&self) -> &str {
        &self.billing_address
    }

    pub fn shipping_address(&self) -> &str {
        &self.shipping_address
    }

    /// Identity used by save and delete. `None` when the header has no usable
    /// `SalesOrderID`.
    pub fn order_id(&self) -> Option<OrderId> {
        self.header
            .get(ORDER_ID_KEY)
            .and_then(FieldValue::as_identifier)
            .map(OrderId)
    }

    pub fn order_number(&self) -> Option<String> {
        self.header
            .get(ORDER_NUMBER_KEY)
            .and_then(FieldValue::as_identifier)
    }

    /// Applies one edit and returns the resulting record. `self` is left as it
    /// was; on error no record is produced.
    pub fn apply(&self, edit: &FieldEdit) -> Result<ExtractedRecord, EditError> {
        let mut next = self.clone();
        match edit {
            FieldEdit::Header { key, value } => {
                if !self.header.contains_key(key) {
                    return Err(EditError::UnknownHeaderKey(key.clone()));
                }
                let mut header = (*self.header).clone();
                // Existing key: insert keeps its position.
                header.insert(key.clone(), value.clone());
                next.header = Arc::new(header);
            }
            FieldEdit::LineItem {
                index,
                field,
                value,
            } => {
                let current = self
                    .line_items
                    .get(*index)
                    .ok_or(EditError::IndexOutOfRange {
                        index: *index,
                        len: self.line_items.len(),
                    })?;
                let mut item = (**current).clone();
                item.set(*field, value.clone());

                let mut items = (*self.line_items).clone();
                items[*index] = Arc::new(item);
                next.line_items = Arc::new(items);
            }
            FieldEdit::CustomerInfo(text) => next.customer_info = Arc::from(text.as_str()),
            FieldEdit::BillingAddress(text) => next.billing_address = Arc::from(text.as_str()),
            FieldEdit::ShippingAddress(text) => next.shipping_address = Arc::from(text.as_str()),
        }
        Ok(next)
    }

    /// Copy of the record with entered amounts sent as JSON numbers.
    ///
    /// Returns the record and a description of every amount that could not be
    /// parsed (those are kept as entered). Line items without textual amounts
    /// stay shared with `self`.
    pub fn with_coerced_numbers(&self) -> (ExtractedRecord, Vec<String>) {
        if !self.line_items.iter().any(|item| item.has_text_amounts()) {
            return (self.clone(), Vec::new());
        }

        let mut unparsed = Vec::new();
        let items = self
            .line_items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                if !item.has_text_amounts() {
                    return Arc::clone(item);
                }
                let (coerced, failed) = item.coerced();
                unparsed.extend(
                    failed
                        .into_iter()
                        .map(|field| format!("line {} {}", index, field.wire_name())),
                );
                Arc::new(coerced)
            })
            .collect();

        let mut next = self.clone();
        next.line_items = Arc::new(items);
        (next, unparsed)
    }
}
