mod builder;
mod scope;


pub use builder::ScopeBuilder;
pub use scope::*;
