//! Service ports: traits + data contracts.

pub mod settings;
pub mod store;

pub use settings::{Settings, ThemeSettings};
pub use store::{
    is_protected, DocCategory, DocEntry, DocumentStore, Result as StoreResult, StaticLookup,
    StoreError, PROTECTED_FILES, ROOT_FILES,
};
