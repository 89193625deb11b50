pub mod books;
pub mod cache;
pub mod health;
