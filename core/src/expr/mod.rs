mod expr_impl;

#[cfg(test)]
mod expr_recover_test;

pub use expr_impl::*;
