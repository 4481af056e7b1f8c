pub mod schema;
pub mod slug;
pub mod state;

pub use schema::{FieldKind, FieldSpec, FormMode, FormSchema, Rule};
pub use state::FormState;
