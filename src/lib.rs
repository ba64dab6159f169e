use std::error::Error;

pub mod api;
pub mod books;
pub mod config;
pub mod context;
pub mod error;
pub mod model;
pub mod store;
pub mod view;

#[cfg(test)]
mod testing;

pub fn unpack_error(err: &dyn Error) -> String {
    let mut parts = Vec::new();
    parts.push(err.to_string());
    let mut current = err.source();
    while let Some(source) = current {
        parts.push(source.to_string());
        current = source.source();
    }
    parts.join(": ")
}
