#![warn(clippy::pedantic)]

pub mod compression;
pub mod decoder;
pub mod encoding;
pub mod error;

pub use decoder::{DecodingReader, OpenError};
pub use encoding::ContentEncoding;
pub use error::EncodingError;
