// Adapters layer: concrete implementations for external systems (passwd db, logging, handlers)

pub mod diagnostics;
pub mod identity;
pub mod internal;
pub mod process;
