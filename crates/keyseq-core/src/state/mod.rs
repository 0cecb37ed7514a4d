// Keyseq State Management
// Per-handler press history

pub mod history;

pub use history::{collapses_into, History};
