#![warn(clippy::pedantic)]

pub mod body;
pub mod config;
pub mod error;
pub mod materializer;
pub mod raw;

pub use body::Body;
pub use config::MaterializeConfig;
pub use error::{ConstructionError, MaterializeError, ResponseError};
pub use lazybody_encoding::ContentEncoding;
pub use materializer::ResponseMaterializer;
pub use raw::RawResponse;

pub use http;
