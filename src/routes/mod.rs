pub mod cache;
pub mod categories;
pub mod images;
pub mod system;
