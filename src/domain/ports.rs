use crate::domain::model::ServiceRecord;
use crate::utils::error::{InetdError, Result, SkipReason};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;

/// 系統帳號資料庫 (passwd / group)
pub trait IdentityDirectory: Send + Sync {
    fn uid_by_name(&self, name: &str) -> Option<u32>;
    /// 以 uid 查詢該使用者的主要群組
    fn primary_gid(&self, uid: u32) -> Option<u32>;
    fn gid_by_name(&self, name: &str) -> Option<u32>;
}

/// Provisioning 過程中的診斷輸出
pub trait DiagnosticSink: Send + Sync {
    fn skipped(&self, record: &ServiceRecord, reason: &SkipReason);
    fn fatal(&self, record: &ServiceRecord, error: &InetdError);
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for Arc<T> {
    fn skipped(&self, record: &ServiceRecord, reason: &SkipReason) {
        (**self).skipped(record, reason)
    }

    fn fatal(&self, record: &ServiceRecord, error: &InetdError) {
        (**self).fatal(record, error)
    }
}

/// 每個接受的連線都交給 handler 處理
#[async_trait]
pub trait ConnectionHandler: Send + Sync {
    fn name(&self) -> &str;
    async fn handle(&self, stream: TcpStream, peer: SocketAddr) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn inetd_conf_path(&self) -> &str;
    fn services_path(&self) -> &str;
    fn internal_services_enabled(&self) -> bool;
    fn bind_address(&self) -> &str;
}
