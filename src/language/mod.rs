pub mod core;
pub mod filter;
pub mod pool;

// Re-export the main types for convenience
pub use self::core::{Catalog, CatalogError, WordEntry};
pub use self::filter::filter_words;
pub use self::pool::{CharacterPool, FilterQuery};
