use crate::utils::error::Result;
use std::collections::HashMap;
use std::path::Path;

/// `/etc/services` 格式：`name port/proto [aliases...]`
#[derive(Debug, Clone, Default)]
pub struct ServicesDb {
    ports: HashMap<(String, String), u16>,
    names: HashMap<(u16, String), String>,
}

impl ServicesDb {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// 格式錯誤的行直接略過，與系統 resolver 的行為一致
    pub fn parse(content: &str) -> Self {
        let mut db = Self::empty();
        for line in content.lines() {
            let line = line.split('#').next().unwrap_or("");
            let mut fields = line.split_whitespace();
            let (Some(name), Some(port_proto)) = (fields.next(), fields.next()) else {
                continue;
            };
            let Some((port, protocol)) = port_proto.split_once('/') else {
                continue;
            };
            let Ok(port) = port.parse::<u16>() else {
                continue;
            };

            db.insert(name, port, protocol);
            for alias in fields {
                db.ports
                    .entry((alias.to_string(), protocol.to_string()))
                    .or_insert(port);
            }
        }
        db
    }

    pub fn insert(&mut self, name: &str, port: u16, protocol: &str) {
        self.ports
            .entry((name.to_string(), protocol.to_string()))
            .or_insert(port);
        self.names
            .entry((port, protocol.to_string()))
            .or_insert_with(|| name.to_string());
    }

    pub fn port(&self, name: &str, protocol: &str) -> Option<u16> {
        self.ports
            .get(&(name.to_string(), protocol.to_string()))
            .copied()
    }

    /// 以 port 反查正式服務名稱 (不含別名)
    pub fn name(&self, port: u16, protocol: &str) -> Option<&str> {
        self.names
            .get(&(port, protocol.to_string()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICES: &str = "\
# Network services, Internet style
echo            7/tcp
echo            7/udp
discard         9/tcp           sink null
daytime         13/tcp
time            37/tcp          timserver
bogus           notaport/tcp
incomplete
";

    #[test]
    fn test_parse_services() {
        let db = ServicesDb::parse(SERVICES);
        assert_eq!(db.port("echo", "tcp"), Some(7));
        assert_eq!(db.port("echo", "udp"), Some(7));
        assert_eq!(db.port("daytime", "udp"), None);
        assert_eq!(db.port("bogus", "tcp"), None);
    }

    #[test]
    fn test_aliases_resolve_to_same_port() {
        let db = ServicesDb::parse(SERVICES);
        assert_eq!(db.port("sink", "tcp"), Some(9));
        assert_eq!(db.port("null", "tcp"), Some(9));
        assert_eq!(db.port("timserver", "tcp"), Some(37));
    }

    #[test]
    fn test_reverse_lookup_uses_canonical_name() {
        let db = ServicesDb::parse(SERVICES);
        assert_eq!(db.name(9, "tcp"), Some("discard"));
        assert_eq!(db.name(37, "tcp"), Some("time"));
        assert_eq!(db.name(8123, "tcp"), None);
    }
}
