//! Authentication port trait.
//!
//! Independent of the valuation engine; the CLI gates access with it.

pub trait Authenticator {
    fn login(&self, username: &str, password: &str) -> bool;

    /// Returns `false` when the username is already taken.
    fn register(&mut self, username: &str, password: &str) -> bool;
}
