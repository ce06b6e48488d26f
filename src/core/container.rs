use crate::domain::model::WaitMode;
use crate::domain::ports::ConnectionHandler;
use crate::utils::error::{InetdError, Result};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;

const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// 尚未綁定的 TCP 監聽器；建構時不做任何 I/O
pub struct StreamListener {
    name: String,
    port: u16,
    wait_mode: WaitMode,
    handler: Arc<dyn ConnectionHandler>,
}

impl StreamListener {
    pub fn new(
        name: String,
        port: u16,
        wait_mode: WaitMode,
        handler: Arc<dyn ConnectionHandler>,
    ) -> Self {
        Self {
            name,
            port,
            wait_mode,
            handler,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn wait_mode(&self) -> WaitMode {
        self.wait_mode
    }

    pub fn handler_name(&self) -> &str {
        self.handler.name()
    }
}

impl fmt::Debug for StreamListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamListener")
            .field("name", &self.name)
            .field("port", &self.port)
            .field("wait_mode", &self.wait_mode)
            .field("handler", &self.handler.name())
            .finish()
    }
}

/// 所有監聽器的集合，以單一單位啟動與停止
#[derive(Debug)]
pub struct ServiceContainer {
    bind_address: IpAddr,
    listeners: Vec<StreamListener>,
}

impl ServiceContainer {
    pub fn new(bind_address: IpAddr) -> Self {
        Self {
            bind_address,
            listeners: Vec::new(),
        }
    }

    pub fn attach(&mut self, listener: StreamListener) {
        self.listeners.push(listener);
    }

    pub fn listeners(&self) -> &[StreamListener] {
        &self.listeners
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn bind_address(&self) -> IpAddr {
        self.bind_address
    }

    /// 綁定所有 port 並開始接受連線。任何一個綁定失敗時，
    /// 已綁定的 socket 會一併關閉。
    pub async fn start(self) -> Result<RunningServices> {
        let mut bound = Vec::with_capacity(self.listeners.len());
        for service in self.listeners {
            let addr = SocketAddr::new(self.bind_address, service.port);
            let listener = TcpListener::bind(addr)
                .await
                .map_err(|source| InetdError::Bind { addr, source })?;
            let local_addr = listener.local_addr()?;
            tracing::info!(
                service = %service.name,
                addr = %local_addr,
                handler = service.handler.name(),
                "Listening"
            );
            bound.push((listener, local_addr, service));
        }

        let (shutdown, signal) = watch::channel(false);
        let mut local_addrs = Vec::with_capacity(bound.len());
        let mut tasks = Vec::with_capacity(bound.len());
        for (listener, local_addr, service) in bound {
            local_addrs.push((service.name.clone(), local_addr));
            tasks.push(tokio::spawn(accept_loop(listener, service, signal.clone())));
        }

        Ok(RunningServices {
            local_addrs,
            shutdown,
            tasks,
        })
    }
}

async fn accept_loop(
    listener: TcpListener,
    service: StreamListener,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    tracing::debug!(service = %service.name, peer = %peer, "Accepted connection");
                    let handler = Arc::clone(&service.handler);
                    let name = service.name.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handler.handle(stream, peer).await {
                            tracing::warn!(service = %name, peer = %peer, error = %e, "Connection failed");
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(service = %service.name, error = %e, "Accept failed");
                    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                }
            },
        }
    }
    tracing::debug!(service = %service.name, "Listener stopped");
}

/// 執行中的服務；`stop` 會關閉所有監聽 socket
#[derive(Debug)]
pub struct RunningServices {
    local_addrs: Vec<(String, SocketAddr)>,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl RunningServices {
    pub fn local_addrs(&self) -> &[(String, SocketAddr)] {
        &self.local_addrs
    }

    pub fn local_addr(&self, name: &str) -> Option<SocketAddr> {
        self.local_addrs
            .iter()
            .find(|(service, _)| service == name)
            .map(|(_, addr)| *addr)
    }

    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Listener task ended abnormally");
            }
        }
        tracing::info!("All listeners stopped");
    }
}
