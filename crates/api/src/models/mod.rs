//! Domain models.
//!
//! These types represent validated domain objects, separate from the row
//! types the Postgres store maps to and from the wire DTOs the routes accept.

pub mod cart;
pub mod catalog;
pub mod image;
pub mod order;
pub mod user;

pub use cart::{Cart, CartItem, NewCartItem};
pub use catalog::{Category, NewProduct, Product, ProductUpdate};
pub use image::{NewImage, ProductImage};
pub use order::{NewOrder, NewOrderItem, Order, OrderItem};
pub use user::{NewUser, User, UserProfile, UserUpdate};
