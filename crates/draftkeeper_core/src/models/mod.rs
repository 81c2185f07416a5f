//! Data models shared by the store, the HTTP API, and the coordinator.

/// Document rows, identifiers, and request payloads.
pub mod document;

#[cfg(test)]
mod tests;
