use crate::adapters::internal::InternalRegistry;
use crate::core::container::{ServiceContainer, StreamListener};
use crate::core::{identity, selector, validator};
use crate::domain::model::{ResolvedServiceRecord, ServiceRecord, SocketType};
use crate::domain::ports::{ConnectionHandler, DiagnosticSink, IdentityDirectory};
use crate::utils::error::{InetdError, Result, SkipReason};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

#[derive(Debug)]
pub enum ProvisioningOutcome {
    Bound(StreamListener),
    Skipped(SkipReason),
}

impl ProvisioningOutcome {
    pub fn is_bound(&self) -> bool {
        matches!(self, ProvisioningOutcome::Bound(_))
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            ProvisioningOutcome::Skipped(reason) => Some(reason),
            ProvisioningOutcome::Bound(_) => None,
        }
    }
}

/// 將服務設定逐筆轉成監聽器：驗證 → 解析身分 → 選擇 handler → 依傳輸層掛載。
///
/// 略過的服務只會透過 [`DiagnosticSink`] 回報；唯一會往外傳的錯誤是
/// 資料報服務造成的 [`InetdError::UnsupportedTransport`]。
pub struct Provisioner<D: IdentityDirectory, S: DiagnosticSink> {
    directory: D,
    sink: S,
    registry: InternalRegistry,
    internal_enabled: bool,
    bind_address: IpAddr,
}

impl<D: IdentityDirectory, S: DiagnosticSink> Provisioner<D, S> {
    pub fn new(directory: D, sink: S) -> Self {
        Self {
            directory,
            sink,
            registry: InternalRegistry::builtin(),
            internal_enabled: true,
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        }
    }

    pub fn with_registry(mut self, registry: InternalRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_internal_services(mut self, enabled: bool) -> Self {
        self.internal_enabled = enabled;
        self
    }

    pub fn with_bind_address(mut self, bind_address: IpAddr) -> Self {
        self.bind_address = bind_address;
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// 依檔案順序處理所有服務。遇到資料報服務時整個流程中止，
    /// 已建立的監聽器隨容器一起丟棄 (此時尚未綁定任何 socket)。
    pub fn provision<I>(&self, records: I) -> Result<ServiceContainer>
    where
        I: IntoIterator<Item = ServiceRecord>,
    {
        let mut container = ServiceContainer::new(self.bind_address);
        for record in records {
            if let ProvisioningOutcome::Bound(listener) = self.provision_record(record)? {
                container.attach(listener);
            }
        }
        Ok(container)
    }

    pub fn provision_record(&self, record: ServiceRecord) -> Result<ProvisioningOutcome> {
        let handler = match self.bind_handler(&record) {
            Ok(handler) => handler,
            Err(reason) => {
                self.sink.skipped(&record, &reason);
                return Ok(ProvisioningOutcome::Skipped(reason));
            }
        };

        // 通過驗證後只剩 stream/tcp 與 dgram/udp
        match &record.socket_type {
            SocketType::Stream => Ok(ProvisioningOutcome::Bound(StreamListener::new(
                record.name,
                record.port,
                record.wait_mode,
                handler,
            ))),
            SocketType::Dgram | SocketType::Other(_) => {
                let error = InetdError::UnsupportedTransport {
                    name: record.name.clone(),
                    port: record.port,
                };
                self.sink.fatal(&record, &error);
                Err(error)
            }
        }
    }

    fn bind_handler(
        &self,
        record: &ServiceRecord,
    ) -> std::result::Result<Arc<dyn ConnectionHandler>, SkipReason> {
        validator::validate(record)?;

        let (uid, gid) = identity::resolve(&self.directory, &record.user, record.group.as_deref())?;
        let resolved = ResolvedServiceRecord::new(record.clone(), uid, gid);

        selector::select(&resolved, &self.registry, self.internal_enabled)
    }
}
