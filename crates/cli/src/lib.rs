//! Wabun fonts CLI library.

pub mod cli;
