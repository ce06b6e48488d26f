use crate::domain::model::{ServiceRecord, SocketType};
use crate::utils::error::SkipReason;

const RPC_PREFIX: &str = "rpc/";

/// 檢查協定與 socket 類型；rpc 必須先於組合檢查被攔下
pub fn validate(record: &ServiceRecord) -> Result<(), SkipReason> {
    if record.protocol.starts_with(RPC_PREFIX) {
        return Err(SkipReason::UnsupportedProtocol);
    }

    let supported = matches!(
        (record.protocol.as_str(), &record.socket_type),
        ("tcp", SocketType::Stream) | ("udp", SocketType::Dgram)
    );

    if !supported {
        return Err(SkipReason::UnsupportedCombination {
            socket_type: record.socket_type.to_string(),
            protocol: record.protocol.clone(),
        });
    }

    Ok(())
}
