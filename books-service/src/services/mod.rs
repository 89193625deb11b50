pub mod cache;
pub mod google_books;
pub mod rate_limit;
