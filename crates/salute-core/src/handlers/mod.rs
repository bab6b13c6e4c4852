//! Built-in handlers
//!
//! - `hello` - the root greeting
//! - `not_found` - fallback for requests no route matched

pub mod hello;
pub mod not_found;

pub use hello::{hello, Greeting, GREETING};
pub use not_found::not_found;
