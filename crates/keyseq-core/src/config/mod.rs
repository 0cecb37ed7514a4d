// Keyseq Configuration Module
// Binding string grammar, subscription options and the TOML keymap file

pub mod binding_parser;
pub mod options;
#[cfg(feature = "config")]
pub mod parser;

pub use binding_parser::{parse_binding, parse_press, BindingParser};
pub use options::{KeyBindingOptions, DEFAULT_TIMEOUT};
#[cfg(feature = "config")]
pub use parser::{Config, ConfigError, ConfigToml, OptionsToml, TIMEOUT_RANGE_MS};
