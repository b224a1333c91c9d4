pub mod driver;
pub mod frame;
pub mod text;
