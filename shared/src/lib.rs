pub mod models;
pub mod utils;

// Data models and number formatting shared by the engine and any UI binding.
// Nothing in this crate performs I/O.
