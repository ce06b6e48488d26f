use std::fmt;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InetdError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("{path}:{line}: {message}")]
    ParseError {
        path: String,
        line: usize,
        message: String,
    },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    /// 資料報服務無法共用 stream 的連線處理模型，整個 provisioning 中止
    #[error("datagram transport not supported: {name} (port {port})")]
    UnsupportedTransport { name: String, port: u16 },

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

impl InetdError {
    /// CLI 結束碼
    pub fn exit_code(&self) -> i32 {
        match self {
            InetdError::ConfigError { .. }
            | InetdError::ParseError { .. }
            | InetdError::InvalidConfigValueError { .. } => 1,
            InetdError::UnsupportedTransport { .. } => 2,
            InetdError::IoError(_) | InetdError::Bind { .. } => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, InetdError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKind {
    User,
    Group,
}

impl fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityKind::User => f.write_str("user"),
            IdentityKind::Group => f.write_str("group"),
        }
    }
}

/// 單筆服務被略過的原因；只會被記錄，不會傳給呼叫端
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("rpc unsupported")]
    UnsupportedProtocol,

    #[error("unsupported type/protocol combination: {socket_type}/{protocol}")]
    UnsupportedCombination {
        socket_type: String,
        protocol: String,
    },

    #[error("unknown {kind}: {value}")]
    UnknownIdentity { kind: IdentityKind, value: String },

    #[error("internal services disabled")]
    DisabledInternal,

    #[error("unknown internal service: {name}")]
    UnknownInternalService { name: String },
}
