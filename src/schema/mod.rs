pub mod extract;
pub mod normalize;
pub mod store;
pub mod types;

pub use extract::extract_table_info;
pub use normalize::{fallback_schema, normalize};
pub use store::StructureStore;
pub use types::{CanonicalSchema, FieldRecord, ResultSet, TableInfo};
