pub mod error;
pub mod forecast;
pub mod normalize;
pub mod source;
