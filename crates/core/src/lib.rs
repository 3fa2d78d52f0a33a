//! Pure domain logic for the character catalog.
//!
//! Nothing here talks to the database; the `db` crate renders the
//! predicates and orderings defined in this crate into SQL.

pub mod character;
pub mod filter;
pub mod numeric;
pub mod order;
pub mod search;
pub mod types;
mod wire;
