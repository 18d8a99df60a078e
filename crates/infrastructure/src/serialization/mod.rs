//! Deterministic JSON for the credential file.
//!
//! Keys come out sorted (the store keeps a `BTreeMap`), indented with two
//! spaces and followed by a trailing newline.

mod json;

pub use json::*;
