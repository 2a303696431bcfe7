//! Integration tests for ttywrite

mod cli_test;
mod locate_test;
