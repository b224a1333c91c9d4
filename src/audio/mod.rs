pub mod analysis;
pub mod bars;
pub mod decode;
pub mod source;
pub mod window;
