use std::fmt;
use std::str::FromStr;

pub const INTERNAL_PROGRAM: &str = "internal";

/// inetd.conf 第二欄；不認得的類型原樣保留，交給驗證階段略過
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketType {
    Stream,
    Dgram,
    Other(String),
}

impl fmt::Display for SocketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocketType::Stream => f.write_str("stream"),
            SocketType::Dgram => f.write_str("dgram"),
            SocketType::Other(name) => f.write_str(name),
        }
    }
}

impl From<&str> for SocketType {
    fn from(s: &str) -> Self {
        match s {
            "stream" => SocketType::Stream,
            "dgram" => SocketType::Dgram,
            other => SocketType::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitMode {
    Wait,
    NoWait,
}

impl FromStr for WaitMode {
    type Err = String;

    /// 接受 `wait` / `nowait`，`.max` 後綴會被忽略
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mode = s.split('.').next().unwrap_or(s);
        match mode {
            "wait" => Ok(WaitMode::Wait),
            "nowait" => Ok(WaitMode::NoWait),
            other => Err(format!("invalid wait mode: {}", other)),
        }
    }
}

/// inetd.conf 中的一行服務設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRecord {
    pub name: String,
    pub port: u16,
    pub socket_type: SocketType,
    pub protocol: String,
    pub wait_mode: WaitMode,
    pub user: String,
    pub group: Option<String>,
    pub program: String,
    /// 完整 argv，第一個元素為 argv[0]
    pub arguments: Vec<String>,
}

impl ServiceRecord {
    pub fn is_internal(&self) -> bool {
        self.program == INTERNAL_PROGRAM
    }
}

/// 使用者與群組都已解析成數字 ID 的服務
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedServiceRecord {
    pub record: ServiceRecord,
    pub uid: u32,
    pub gid: u32,
}

impl ResolvedServiceRecord {
    pub fn new(record: ServiceRecord, uid: u32, gid: u32) -> Self {
        Self { record, uid, gid }
    }
}
