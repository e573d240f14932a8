pub mod cursor;
pub mod keys;
pub mod pages;
