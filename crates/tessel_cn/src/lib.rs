//! # Tessel Component Library (tessel_cn)
//!
//! Themed components built on `tessel_core` primitives.
//!
//! The main component is a select that adapts a simple configuration surface
//! (loose option trees, raw keys as values) onto a general-purpose dropdown
//! widget (canonical option records, record-valued selection).
//!
//! ## Example
//!
//! ```ignore
//! use tessel_cn::prelude::*;
//!
//! // Plain select: passed through unchanged
//! cn::select()
//!     .option(CallerOption::new("sm", "Small"))
//!     .option(CallerOption::new("lg", "Large"))
//!     .value("sm")
//!
//! // Searchable multi-select with grouped options
//! cn::select()
//!     .multiple(true)
//!     .searchable(true)
//!     .options(parse_options(
//!         r#"[{"groupName": "Citrus", "items": [{"value": "lime", "text": "Lime"}]}]"#,
//!     )?)
//!     .value(serde_json::json!(["lime"]))
//! ```
//!
//! ## Components
//!
//! - **Select** - Single/multi value select with grouping, search and async loading

pub mod components;
pub mod error;

pub use components::*;
pub use error::{Result, SelectError};

/// Convenience module for accessing components with `cn::` prefix
pub mod cn {
    pub use crate::components::select::select;
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::cn;
    pub use crate::components::select::{
        parse_options, select, CacheToken, CallerOption, CanonicalOption, ChangeEvent,
        FloatingMenu, KeyExtractor, OptionsLoader, ResolvedValue, SelectConfig, SelectInstance,
        Selection, WidgetTree, WidgetValue,
    };
    pub use crate::error::{Result, SelectError};
    pub use tessel_core::{EventSurface, State};
}
