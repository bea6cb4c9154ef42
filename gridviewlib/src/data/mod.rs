//! Data model: what a table reads from its records.
//!
//! - **Values**: typed cells (`Value`) and record identity (`RowId`)
//! - **Columns**: descriptors with typed accessors (`Column`)
//!
//! ## Example
//!
//! ```rust
//! use gridviewlib::data::{Column, Value};
//!
//! struct Order {
//!     client: String,
//!     boxes: u32,
//! }
//!
//! let client = Column::new("client", |o: &Order| Value::from(&o.client)).searchable();
//! let boxes = Column::new("boxes", |o: &Order| Value::from(o.boxes)).with_header("Boxes");
//! assert_eq!(boxes.header(), "Boxes");
//! # let _ = client;
//! ```

pub mod column;
pub mod value;

pub use column::{Accessor, Column, Comparator, FilterKind, FilterStrategy, Predicate};
pub use value::{RowId, Value};
