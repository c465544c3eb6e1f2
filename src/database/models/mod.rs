pub mod category;
pub mod owner;
pub mod store;

pub use category::CategoryRow;
pub use owner::OwnerRow;
pub use store::StoreRow;
