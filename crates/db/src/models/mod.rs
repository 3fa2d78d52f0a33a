//! Row models and result containers.

pub mod character;
pub mod page;
