/// Tower middleware for the API server
///
/// Authentication lives in [`crate::app`] as an axum `from_fn` layer; this
/// module holds the response-side layers.

pub mod security;
