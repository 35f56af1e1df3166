//! Field-level edits.
//!
//! The presentation layer addresses a field with a `(section, key, index)`
//! triple of strings; [`FieldEdit::parse`] turns that into a typed edit or an
//! [`EditError`].

use std::fmt;
use std::str::FromStr;

use super::value::FieldValue;
use crate::error::EditError;

/// The parts of a record a single edit can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Header,
    LineItems,
    CustomerInfo,
    BillingAddress,
    ShippingAddress,
}

impl FromStr for Section {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "header" | "SalesOrderHeader" => Ok(Section::Header),
            "lineItems" | "SalesOrderDetail" => Ok(Section::LineItems),
            "customerInfo" | "CustomerInfo" => Ok(Section::CustomerInfo),
            "billingAddress" | "BillingAddress" => Ok(Section::BillingAddress),
            "shippingAddress" | "ShippingAddress" => Ok(Section::ShippingAddress),
            other => Err(EditError::UnknownSection(other.to_string())),
        }
    }
}

/// Editable line-item columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineItemField {
    ProductNumber,
    OrderQty,
    UnitPrice,
    LineTotal,
    Name,
    Color,
    Size,
}

impl LineItemField {
    pub const ALL: [LineItemField; 7] = [
        LineItemField::ProductNumber,
        LineItemField::OrderQty,
        LineItemField::UnitPrice,
        LineItemField::LineTotal,
        LineItemField::Name,
        LineItemField::Color,
        LineItemField::Size,
    ];

    /// Key used in the JSON body.
    pub fn wire_name(&self) -> &'static str {
        match self {
            LineItemField::ProductNumber => "ProductNumber",
            LineItemField::OrderQty => "OrderQty",
            LineItemField::UnitPrice => "UnitPrice",
            LineItemField::LineTotal => "LineTotal",
            LineItemField::Name => "Name",
            LineItemField::Color => "Color",
            LineItemField::Size => "Size",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            LineItemField::OrderQty | LineItemField::UnitPrice | LineItemField::LineTotal
        )
    }
}

impl FromStr for LineItemField {
    type Err = EditError;

    /// Accepts both the camelCase and the wire spelling (`orderQty`, `OrderQty`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LineItemField::ALL
            .into_iter()
            .find(|field| {
                let wire = field.wire_name();
                s == wire || (s.len() == wire.len() && lower_first(wire) == s)
            })
            .ok_or_else(|| EditError::UnknownLineItemField(s.to_string()))
    }
}

impl fmt::Display for LineItemField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A single mutation of a record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    Header {
        key: String,
        value: FieldValue,
    },
    LineItem {
        index: usize,
        field: LineItemField,
        value: FieldValue,
    },
    CustomerInfo(String),
    BillingAddress(String),
    ShippingAddress(String),
}

impl FieldEdit {
    /// Builds an edit from the presentation layer's addressing.
    ///
    /// `key` and `index` are ignored for the free-text sections; `index` is
    /// required for line items.
    pub fn parse(
        section: &str,
        key: &str,
        value: impl Into<FieldValue>,
        index: Option<usize>,
    ) -> Result<Self, EditError> {
        let value = value.into();
        let edit = match section.parse::<Section>()? {
            Section::Header => FieldEdit::Header {
                key: key.to_string(),
                value,
            },
            Section::LineItems => FieldEdit::LineItem {
                index: index.ok_or(EditError::MissingIndex)?,
                field: key.parse()?,
                value,
            },
            Section::CustomerInfo => FieldEdit::CustomerInfo(value.to_input_text()),
            Section::BillingAddress => FieldEdit::BillingAddress(value.to_input_text()),
            Section::ShippingAddress => FieldEdit::ShippingAddress(value.to_input_text()),
        };
        Ok(edit)
    }

    pub fn section(&self) -> Section {
        match self {
            FieldEdit::Header { .. } => Section::Header,
            FieldEdit::LineItem { .. } => Section::LineItems,
            FieldEdit::CustomerInfo(_) => Section::CustomerInfo,
            FieldEdit::BillingAddress(_) => Section::BillingAddress,
            FieldEdit::ShippingAddress(_) => Section::ShippingAddress,
        }
    }
}
