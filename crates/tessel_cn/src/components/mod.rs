//! Themed components built on tessel_core primitives
//!
//! Each component follows a consistent pattern:
//! - Builder function (e.g., `select()`)
//! - Config struct with fluent setters (e.g., `SelectConfig`)
//! - A mounted instance that owns listeners and state (e.g., `SelectInstance`)

pub mod select;

pub use select::{
    select, CallerOption, CanonicalOption, ChangeEvent, DropdownProps, KeyExtractor,
    NoOptionsMessage, ResolvedValue, SelectConfig, SelectInstance, Selection, WidgetTree,
    WidgetValue,
};
