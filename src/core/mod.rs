pub mod container;
pub mod engine;
pub mod identity;
pub mod provisioner;
pub mod selector;
pub mod validator;

pub use crate::domain::model::{ResolvedServiceRecord, ServiceRecord, SocketType, WaitMode};
pub use crate::domain::ports::{ConfigProvider, ConnectionHandler, DiagnosticSink, IdentityDirectory};
pub use crate::utils::error::Result;
