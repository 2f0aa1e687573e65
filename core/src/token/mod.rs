mod error;
mod lexer;


pub use error::*;
pub use lexer::*;
