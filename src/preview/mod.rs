pub mod channel;
pub mod controller;
pub mod debounce;
pub mod evaluator;
