//! Keeps credentials, most importantly the Redsys merchant key, out of logs.
//!
//! The server prints its configuration at startup and the merchant key arrives through `REDSYS_SECRET_KEY`, so the
//! config structs wrap credentials in [`Secret`], which masks them in both `Debug` and `Display` output. Code that
//! genuinely needs the value calls [`Secret::reveal`] at the point of use.
use std::fmt;

const MASK: &str = "****";

/// A value that formats as `****` instead of its contents.
#[derive(Clone, Default)]
pub struct Secret<T>
where T: Clone + Default
{
    value: T,
}

impl<T: Clone + Default> Secret<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }

    /// Hands out the wrapped value. Callers must not pass the reference on to anything that logs it.
    pub fn reveal(&self) -> &T {
        &self.value
    }
}

impl<T: Clone + Default> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

impl<T: Clone + Default> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}
