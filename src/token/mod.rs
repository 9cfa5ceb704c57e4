pub mod claims;
pub mod codec;
