pub mod builtins;
pub mod executor;
pub mod redirect;

pub use executor::Executor;
