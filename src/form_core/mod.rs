pub mod controller;
pub mod reorder;
pub mod schema;
pub mod values;

pub use controller::FormController;
pub use values::{FieldPath, FieldValue, FormValues};
