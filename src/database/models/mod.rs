pub mod order;
pub mod owner;
pub mod shop;
pub mod user;

pub use order::{Address, Customer, LineItem, NewOrder, Order, OrderRow};
pub use owner::Owner;
pub use shop::{NewShop, Shop, ShopItem, ShopRow, Stock};
pub use user::User;
