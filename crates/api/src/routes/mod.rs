pub mod historic;
pub mod price;
