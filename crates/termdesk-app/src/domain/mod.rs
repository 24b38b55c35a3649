//! Domain types for the TermDesk engine.
//!
//! The only aggregate here is [`Settings`], the process-wide configuration
//! record.  It is deliberately a plain owned struct: the composition root
//! constructs one instance and passes references down the call graph, and
//! tests construct as many throwaway instances as they like.

pub mod settings;

pub use settings::{
    JsonMap, PluginCategory, Settings, SettingsError, WriteProtection, BASE_STYLESHEET,
};
