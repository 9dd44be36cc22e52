mod product_cache;

pub use product_cache::ProductCache;
