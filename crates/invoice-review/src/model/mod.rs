pub mod edit;
pub mod record;
pub mod value;

pub use edit::{FieldEdit, LineItemField, Section};
pub use record::{ExtractedRecord, Header, LineItem, OrderId, ORDER_ID_KEY, ORDER_NUMBER_KEY};
pub use value::{FieldValue, HeaderDate, NumericInput};
