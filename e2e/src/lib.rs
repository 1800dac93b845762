//! Integration tests for the public `do-try` API.

#[cfg(test)]
mod tests;
