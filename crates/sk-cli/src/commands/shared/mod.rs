pub mod parse;
pub mod requirements;
