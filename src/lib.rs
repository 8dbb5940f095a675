use std::error::Error;

pub mod config;
pub mod cursor;
pub mod db;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod extract;
pub mod model;
pub mod page;
pub mod status;
pub mod transport;

pub fn unpack_error(err: &(dyn Error)) -> String {
    let mut parts = Vec::new();
    parts.push(err.to_string());
    let mut current = err.source();
    while let Some(source) = current {
        parts.push(source.to_string());
        current = source.source();
    }
    parts.join(": ")
}
