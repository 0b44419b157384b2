//! Remote document store access: the domain types, the Firestore REST wire
//! mapping, and the client that performs the five collection operations
//! (list, get, add, update, delete).

pub mod api_types;
pub mod client;
pub mod types;
