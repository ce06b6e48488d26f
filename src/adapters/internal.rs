use crate::domain::ports::ConnectionHandler;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;

pub type HandlerFactory = fn() -> Arc<dyn ConnectionHandler>;

/// 內建服務名稱對應的 handler 建構函式
#[derive(Clone)]
pub struct InternalRegistry {
    factories: HashMap<&'static str, HandlerFactory>,
}

impl InternalRegistry {
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    pub fn builtin() -> Self {
        Self::empty()
            .register("echo", echo)
            .register("discard", discard)
            .register("chargen", chargen)
            .register("daytime", daytime)
            .register("time", time)
    }

    pub fn register(mut self, name: &'static str, factory: HandlerFactory) -> Self {
        self.factories.insert(name, factory);
        self
    }

    pub fn get(&self, name: &str) -> Option<HandlerFactory> {
        self.factories.get(name).copied()
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for InternalRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for InternalRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InternalRegistry")
            .field("services", &self.names())
            .finish()
    }
}

fn echo() -> Arc<dyn ConnectionHandler> {
    Arc::new(Echo)
}

fn discard() -> Arc<dyn ConnectionHandler> {
    Arc::new(Discard)
}

fn chargen() -> Arc<dyn ConnectionHandler> {
    Arc::new(Chargen)
}

fn daytime() -> Arc<dyn ConnectionHandler> {
    Arc::new(Daytime)
}

fn time() -> Arc<dyn ConnectionHandler> {
    Arc::new(Time)
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::BrokenPipe | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
    )
}

/// RFC 862
pub struct Echo;

#[async_trait]
impl ConnectionHandler for Echo {
    fn name(&self) -> &str {
        "echo"
    }

    async fn handle(&self, mut stream: TcpStream, _peer: SocketAddr) -> Result<()> {
        let (mut reader, mut writer) = stream.split();
        match tokio::io::copy(&mut reader, &mut writer).await {
            Ok(_) => Ok(()),
            Err(e) if is_disconnect(e.kind()) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// RFC 863
pub struct Discard;

#[async_trait]
impl ConnectionHandler for Discard {
    fn name(&self) -> &str {
        "discard"
    }

    async fn handle(&self, mut stream: TcpStream, _peer: SocketAddr) -> Result<()> {
        match tokio::io::copy(&mut stream, &mut tokio::io::sink()).await {
            Ok(_) => Ok(()),
            Err(e) if is_disconnect(e.kind()) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

const CHARGEN_FIRST: u8 = b' ';
const CHARGEN_SPAN: usize = 95;
const CHARGEN_WIDTH: usize = 72;

/// 第 `index` 行：從可列印字元輪轉的位置開始取 72 個字元，CRLF 結尾
pub fn chargen_line(index: usize) -> Vec<u8> {
    let start = index % CHARGEN_SPAN;
    let mut line: Vec<u8> = (0..CHARGEN_WIDTH)
        .map(|i| CHARGEN_FIRST + ((start + i) % CHARGEN_SPAN) as u8)
        .collect();
    line.extend_from_slice(b"\r\n");
    line
}

/// RFC 864，持續輸出直到對方斷線
pub struct Chargen;

#[async_trait]
impl ConnectionHandler for Chargen {
    fn name(&self) -> &str {
        "chargen"
    }

    async fn handle(&self, stream: TcpStream, _peer: SocketAddr) -> Result<()> {
        let mut writer = BufWriter::new(stream);
        let mut index = 0usize;
        loop {
            if let Err(e) = writer.write_all(&chargen_line(index)).await {
                return if is_disconnect(e.kind()) {
                    Ok(())
                } else {
                    Err(e.into())
                };
            }
            index = index.wrapping_add(1);
        }
    }
}

pub fn daytime_string(now: DateTime<Utc>) -> String {
    format!("{}\r\n", now.format("%a %b %e %H:%M:%S %Y"))
}

/// 1900-01-01 到 1970-01-01 的秒數
const RFC868_EPOCH_OFFSET: i64 = 2_208_988_800;

pub fn rfc868_seconds(now: DateTime<Utc>) -> u32 {
    // 32 位元欄位，2036 年後自然回繞
    (now.timestamp() + RFC868_EPOCH_OFFSET) as u32
}

/// RFC 867
pub struct Daytime;

#[async_trait]
impl ConnectionHandler for Daytime {
    fn name(&self) -> &str {
        "daytime"
    }

    async fn handle(&self, mut stream: TcpStream, _peer: SocketAddr) -> Result<()> {
        stream
            .write_all(daytime_string(Utc::now()).as_bytes())
            .await?;
        stream.shutdown().await?;
        Ok(())
    }
}

/// RFC 868
pub struct Time;

#[async_trait]
impl ConnectionHandler for Time {
    fn name(&self) -> &str {
        "time"
    }

    async fn handle(&self, mut stream: TcpStream, _peer: SocketAddr) -> Result<()> {
        stream
            .write_all(&rfc868_seconds(Utc::now()).to_be_bytes())
            .await?;
        stream.shutdown().await?;
        Ok(())
    }
}
