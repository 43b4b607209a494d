//! FFI crate exposing teamload use cases to the Flutter host.

pub mod api;
