use crate::adapters::diagnostics::TracingSink;
use crate::adapters::identity::SystemDirectory;
use crate::config::inetd_conf::load_inetd_conf;
use crate::config::services_db::ServicesDb;
use crate::core::container::ServiceContainer;
use crate::core::provisioner::Provisioner;
use crate::domain::model::ServiceRecord;
use crate::domain::ports::{ConfigProvider, DiagnosticSink, IdentityDirectory};
use crate::utils::error::{InetdError, Result};
use crate::utils::validation::validate_ip_addr;
use std::path::Path;

/// 讀取設定、執行 provisioning，並負責監聽器的生命週期
pub struct InetdEngine<C: ConfigProvider> {
    config: C,
}

impl<C: ConfigProvider> InetdEngine<C> {
    pub fn new(config: C) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// 服務資料庫不存在時只警告，數字 port 仍然可用
    pub fn load_services(&self) -> Result<ServicesDb> {
        let path = self.config.services_path();
        if !Path::new(path).exists() {
            tracing::warn!("Services database {} not found, only numeric ports will work", path);
            return Ok(ServicesDb::empty());
        }
        let db = ServicesDb::from_file(path)?;
        tracing::debug!("Loaded {} service names from {}", db.len(), path);
        Ok(db)
    }

    pub fn load_records(&self) -> Result<Vec<ServiceRecord>> {
        let services = self.load_services()?;
        let path = self.config.inetd_conf_path();
        tracing::info!("Loading service configuration from {}", path);
        let records = load_inetd_conf(path, &services)?;
        tracing::info!("Parsed {} service entries", records.len());
        Ok(records)
    }

    pub fn provision_with<D, S>(&self, directory: D, sink: S) -> Result<ServiceContainer>
    where
        D: IdentityDirectory,
        S: DiagnosticSink,
    {
        let bind_address = validate_ip_addr("bind_address", self.config.bind_address())?;
        let records = self.load_records()?;

        let provisioner = Provisioner::new(directory, sink)
            .with_internal_services(self.config.internal_services_enabled())
            .with_bind_address(bind_address);
        let container = provisioner.provision(records)?;

        for listener in container.listeners() {
            tracing::debug!(
                "Attached {} on port {} ({:?}) -> {}",
                listener.name(),
                listener.port(),
                listener.wait_mode(),
                listener.handler_name()
            );
        }
        tracing::info!("Provisioned {} listeners", container.len());
        Ok(container)
    }

    pub fn provision(&self) -> Result<ServiceContainer> {
        self.provision_with(SystemDirectory::new(), TracingSink)
    }

    /// 啟動所有監聽器，直到收到 SIGINT / SIGTERM
    pub async fn run(&self) -> Result<()> {
        let container = self.provision()?;
        if container.is_empty() {
            tracing::warn!("No services to run");
        }

        let running = container.start().await?;
        wait_for_shutdown().await?;
        tracing::info!("Shutting down");
        running.stop().await;
        Ok(())
    }
}

async fn wait_for_shutdown() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate()).map_err(InetdError::IoError)?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result?,
        _ = terminate.recv() => {}
    }
    Ok(())
}
