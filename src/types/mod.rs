pub mod image;
pub mod unsplash;
