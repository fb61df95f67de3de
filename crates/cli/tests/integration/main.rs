#![cfg(unix)]

//! Integration tests driving `exbuild` against a stub compiler.

mod build_tests;
mod common;
