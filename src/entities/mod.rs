pub mod category;
pub mod item;
pub mod owner;
pub mod seller;
pub mod store;
pub mod warehouse;

pub use category::{Category, CategoryNode, CategoryTree};
pub use item::{Item, Size, SizeError};
pub use owner::{Owner, OwnerError, MIN_PASSWORD_LENGTH};
pub use seller::Seller;
pub use store::{OwnerSummary, Store};
pub use warehouse::Warehouse;
