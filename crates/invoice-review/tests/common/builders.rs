//! Builders for records as the extraction service would return them.

#![allow(dead_code)]

use invoice_review::model::Header;
use invoice_review::{ExtractedRecord, FieldValue, LineItem, LineItemField};

/// Builder for `ExtractedRecord` instances.
pub struct RecordBuilder {
    header: Header,
    line_items: Vec<LineItem>,
    customer_info: String,
    billing_address: String,
    shipping_address: String,
}

impl RecordBuilder {
    /// An empty record: no header fields, no line items, blank addresses.
    pub fn new() -> Self {
        Self {
            header: Header::new(),
            line_items: Vec::new(),
            customer_info: String::new(),
            billing_address: String::new(),
            shipping_address: String::new(),
        }
    }

    /// The record from the extraction walkthrough: order 42 for Acme.
    pub fn acme_order() -> Self {
        Self::new()
            .header("SalesOrderID", "42")
            .header("SalesOrderNumber", "SO-42")
            .customer_info("Acme")
            .billing_address("1 Main St")
            .shipping_address("1 Main St")
    }

    /// Adds (or replaces) a header field, keeping first-insertion order.
    pub fn header(mut self, key: &str, value: impl Into<FieldValue>) -> Self {
        self.header.insert(key.to_string(), value.into());
        self
    }

    pub fn line_item(mut self, item: LineItemBuilder) -> Self {
        self.line_items.push(item.build());
        self
    }

    pub fn customer_info(mut self, text: &str) -> Self {
        self.customer_info = text.to_string();
        self
    }

    pub fn billing_address(mut self, text: &str) -> Self {
        self.billing_address = text.to_string();
        self
    }

    pub fn shipping_address(mut self, text: &str) -> Self {
        self.shipping_address = text.to_string();
        self
    }

    pub fn build(self) -> ExtractedRecord {
        ExtractedRecord::new(
            self.header,
            self.line_items,
            &self.customer_info,
            &self.billing_address,
            &self.shipping_address,
        )
    }
}

impl Default for RecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `LineItem` instances.
pub struct LineItemBuilder {
    item: LineItem,
}

impl LineItemBuilder {
    pub fn new(product_number: &str) -> Self {
        Self {
            item: LineItem::new(product_number),
        }
    }

    pub fn field(mut self, field: LineItemField, value: impl Into<FieldValue>) -> Self {
        self.item.set(field, value.into());
        self
    }

    pub fn quantity(self, qty: i64) -> Self {
        self.field(LineItemField::OrderQty, qty)
    }

    pub fn name(self, name: &str) -> Self {
        self.field(LineItemField::Name, name)
    }

    /// A field the editor does not know about, passed through on save.
    pub fn extra(mut self, key: &str, value: serde_json::Value) -> Self {
        self.item.extra.insert(key.to_string(), value);
        self
    }

    pub fn build(self) -> LineItem {
        self.item
    }
}
