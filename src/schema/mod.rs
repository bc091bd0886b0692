pub mod inspector;

pub use inspector::{SchemaInspector, CatalogSnapshot, ForeignKey};
