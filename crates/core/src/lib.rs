//! Domain logic for the Murmur relay: session configuration, the tool
//! executor, and the in-memory artifact stores. Everything here is
//! transport-agnostic; the `gemini-live` crate and the API service build
//! on these types.

pub mod artifacts;
pub mod session;
pub mod tools;
