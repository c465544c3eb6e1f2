pub mod categories;
pub mod manager;
pub mod memory;
pub mod models;
pub mod owners;
pub mod query_builder;
pub mod repository;
pub mod stores;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStorage;
pub use repository::{
    constraints,
    CategoryChanges, CategoryQuery, CategoryRepository, CategorySortField, OwnerRepository, Repositories, Storage,
    StoreChanges, StoreQuery, StoreRepository, StoreSortField,
};
