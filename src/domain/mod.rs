pub mod business;
pub mod place;
