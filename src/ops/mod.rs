pub mod fill;
pub mod text;
