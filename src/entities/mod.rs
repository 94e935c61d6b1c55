//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod cart_item;
pub mod medicine;
pub mod order;
pub mod order_item;
pub mod user;

// Re-export specific types to avoid conflicts
pub use cart_item::{Column as CartItemColumn, Entity as CartItem, Model as CartItemModel};
pub use medicine::{Column as MedicineColumn, Entity as Medicine, Model as MedicineModel};
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel};
pub use order_item::{Column as OrderItemColumn, Entity as OrderItem, Model as OrderItemModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
