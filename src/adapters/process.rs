use crate::domain::model::ResolvedServiceRecord;
use crate::domain::ports::ConnectionHandler;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::net::SocketAddr;
use std::os::fd::OwnedFd;
use std::process::Stdio;
use tokio::net::TcpStream;
use tokio::process::Command;

/// 每個連線啟動一個外部程式，socket 直接作為子行程的 stdin / stdout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessHandler {
    program: String,
    arguments: Vec<String>,
    uid: u32,
    gid: u32,
}

impl ProcessHandler {
    pub fn new(program: String, arguments: Vec<String>, uid: u32, gid: u32) -> Self {
        Self {
            program,
            arguments,
            uid,
            gid,
        }
    }

    pub fn from_resolved(resolved: &ResolvedServiceRecord) -> Self {
        Self::new(
            resolved.record.program.clone(),
            resolved.record.arguments.clone(),
            resolved.uid,
            resolved.gid,
        )
    }

    /// argv[0] 與其餘參數；沒有參數時 argv[0] 用程式路徑
    pub fn argv(&self) -> (&str, &[String]) {
        match self.arguments.split_first() {
            Some((first, rest)) => (first.as_str(), rest),
            None => (self.program.as_str(), &[]),
        }
    }

    fn command(&self, stdin: Stdio, stdout: Stdio) -> Command {
        let (argv0, rest) = self.argv();
        let mut command = Command::new(&self.program);
        command
            .arg0(argv0)
            .args(rest)
            .uid(self.uid)
            .gid(self.gid)
            .stdin(stdin)
            .stdout(stdout)
            .stderr(Stdio::inherit());
        command
    }
}

#[async_trait]
impl ConnectionHandler for ProcessHandler {
    fn name(&self) -> &str {
        &self.program
    }

    async fn handle(&self, stream: TcpStream, peer: SocketAddr) -> Result<()> {
        // 子行程預期阻塞式的 fd
        let socket = stream.into_std()?;
        socket.set_nonblocking(false)?;
        let output = socket.try_clone()?;

        let mut command = self.command(
            Stdio::from(OwnedFd::from(socket)),
            Stdio::from(OwnedFd::from(output)),
        );
        let mut child = command.spawn()?;
        // 關閉父行程手上的 socket，對方才看得到 EOF
        drop(command);

        tracing::debug!(
            program = %self.program,
            pid = ?child.id(),
            peer = %peer,
            "Spawned child for connection"
        );

        let status = child.wait().await?;
        tracing::debug!(program = %self.program, peer = %peer, %status, "Child exited");
        Ok(())
    }
}
