use crate::config::services_db::ServicesDb;
use crate::domain::model::{ServiceRecord, SocketType, WaitMode};
use crate::utils::error::{InetdError, Result};
use std::path::Path;

const MIN_FIELDS: usize = 6;

/// 服務名稱必須能在 services 檔中查到的協定
const SERVICE_PROTOCOLS: [&str; 2] = ["tcp", "udp"];

/// 讀取 inetd.conf 格式的服務設定檔
pub fn load_inetd_conf<P: AsRef<Path>>(path: P, services: &ServicesDb) -> Result<Vec<ServiceRecord>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| InetdError::ConfigError {
        message: format!("cannot read {}: {}", path.display(), e),
    })?;
    parse_inetd_conf(&content, &path.display().to_string(), services)
}

/// 每行格式：
/// `service socket-type protocol wait user[:group] program [argv...]`
pub fn parse_inetd_conf(content: &str, path: &str, services: &ServicesDb) -> Result<Vec<ServiceRecord>> {
    let mut records = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("");
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        let record = parse_fields(&fields, services).map_err(|message| InetdError::ParseError {
            path: path.to_string(),
            line: index + 1,
            message,
        })?;
        records.push(record);
    }
    Ok(records)
}

fn parse_fields(fields: &[&str], services: &ServicesDb) -> std::result::Result<ServiceRecord, String> {
    if fields.len() < MIN_FIELDS {
        return Err(format!(
            "expected at least {} fields, found {}",
            MIN_FIELDS,
            fields.len()
        ));
    }

    let protocol = fields[2];
    let socket_type = SocketType::from(fields[1]);
    let wait_mode: WaitMode = fields[3].parse()?;
    let (user, group) = split_owner(fields[4])?;
    let (name, port) = lookup_service(fields[0], protocol, services)?;

    Ok(ServiceRecord {
        name,
        port,
        socket_type,
        protocol: protocol.to_string(),
        wait_mode,
        user,
        group,
        program: fields[5].to_string(),
        arguments: fields[6..].iter().map(|s| s.to_string()).collect(),
    })
}

/// `user:group`；沒有冒號時接受舊式的 `user.group`
fn split_owner(owner: &str) -> std::result::Result<(String, Option<String>), String> {
    let (user, group) = match owner.split_once(':').or_else(|| owner.split_once('.')) {
        Some((user, group)) => (user, Some(group).filter(|g| !g.is_empty())),
        None => (owner, None),
    };
    if user.is_empty() {
        return Err(format!("missing user in '{}'", owner));
    }
    Ok((user.to_string(), group.map(str::to_string)))
}

fn lookup_service(
    service: &str,
    protocol: &str,
    services: &ServicesDb,
) -> std::result::Result<(String, u16), String> {
    if let Some(port) = services.port(service, protocol) {
        return Ok((service.to_string(), port));
    }

    if let Ok(port) = service.parse::<u16>() {
        let name = services.name(port, protocol).unwrap_or(service);
        return Ok((name.to_string(), port));
    }

    // rpc、tcp6 等協定沒有對應的 port，之後會在驗證階段被略過
    if !SERVICE_PROTOCOLS.contains(&protocol) {
        return Ok((service.to_string(), 0));
    }

    Err(format!("unknown service: {} ({})", service, protocol))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn services() -> ServicesDb {
        ServicesDb::parse("echo 7/tcp\ndaytime 13/tcp\ndaytime 13/udp\n")
    }

    #[test]
    fn test_parse_basic_entries() {
        let conf = "\
# sample
echo    stream  tcp  nowait  root        internal
8123    stream  tcp  wait    glyph:users /bin/cat cat -
";
        let records = parse_inetd_conf(conf, "inetd.conf", &services()).unwrap();
        assert_eq!(records.len(), 2);

        let echo = &records[0];
        assert_eq!(echo.name, "echo");
        assert_eq!(echo.port, 7);
        assert_eq!(echo.socket_type, SocketType::Stream);
        assert_eq!(echo.wait_mode, WaitMode::NoWait);
        assert_eq!(echo.group, None);
        assert!(echo.is_internal());

        let cat = &records[1];
        assert_eq!(cat.name, "8123");
        assert_eq!(cat.port, 8123);
        assert_eq!(cat.user, "glyph");
        assert_eq!(cat.group.as_deref(), Some("users"));
        assert_eq!(cat.program, "/bin/cat");
        assert_eq!(cat.arguments, vec!["cat", "-"]);
    }

    #[test]
    fn test_numeric_service_takes_known_name() {
        let conf = "7 stream tcp nowait root internal\n";
        let records = parse_inetd_conf(conf, "inetd.conf", &services()).unwrap();
        assert_eq!(records[0].name, "echo");
        assert_eq!(records[0].port, 7);
    }

    #[test]
    fn test_legacy_dot_separator() {
        let conf = "echo stream tcp nowait nobody.nogroup internal\n";
        let records = parse_inetd_conf(conf, "inetd.conf", &services()).unwrap();
        assert_eq!(records[0].user, "nobody");
        assert_eq!(records[0].group.as_deref(), Some("nogroup"));
    }

    #[test]
    fn test_dotted_user_without_colon_splits_group() {
        let conf = "\
echo stream tcp nowait john.doe       internal
echo stream tcp nowait john.doe:staff internal
";
        let records = parse_inetd_conf(conf, "inetd.conf", &services()).unwrap();
        assert_eq!(records[0].user, "john");
        assert_eq!(records[0].group.as_deref(), Some("doe"));

        // 有冒號時，點號屬於使用者名稱
        assert_eq!(records[1].user, "john.doe");
        assert_eq!(records[1].group.as_deref(), Some("staff"));
    }

    #[test]
    fn test_wait_max_suffix_ignored() {
        let conf = "echo stream tcp nowait.400 root internal\n";
        let records = parse_inetd_conf(conf, "inetd.conf", &services()).unwrap();
        assert_eq!(records[0].wait_mode, WaitMode::NoWait);
    }

    #[test]
    fn test_rpc_entries_get_port_zero() {
        let conf = "rstatd/1-3 dgram rpc/udp wait root /usr/sbin/rpc.rstatd rpc.rstatd\n";
        let records = parse_inetd_conf(conf, "inetd.conf", &services()).unwrap();
        assert_eq!(records[0].port, 0);
        assert_eq!(records[0].protocol, "rpc/udp");
    }

    #[test]
    fn test_unsupported_transports_are_kept_as_records() {
        let conf = "\
echo     stream     tcp6  nowait  root  internal
echo     seqpacket  tcp   nowait  root  internal
";
        let records = parse_inetd_conf(conf, "inetd.conf", &services()).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].protocol, "tcp6");
        assert_eq!(records[0].port, 0);

        assert_eq!(records[1].socket_type, SocketType::Other("seqpacket".to_string()));
        assert_eq!(records[1].port, 7);
    }

    #[test]
    fn test_unknown_service_reports_line() {
        let conf = "\n\necho stream tcp nowait root internal\nfrobnicate stream tcp nowait root internal\n";
        match parse_inetd_conf(conf, "inetd.conf", &services()) {
            Err(InetdError::ParseError { path, line, message }) => {
                assert_eq!(path, "inetd.conf");
                assert_eq!(line, 4);
                assert_eq!(message, "unknown service: frobnicate (tcp)");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_short_line_and_bad_wait_mode() {
        assert!(parse_inetd_conf("echo stream tcp nowait root\n", "f", &services()).is_err());
        assert!(parse_inetd_conf("echo stream tcp sometimes root internal\n", "f", &services()).is_err());
        assert!(parse_inetd_conf("echo stream tcp nowait :users internal\n", "f", &services()).is_err());
    }
}
