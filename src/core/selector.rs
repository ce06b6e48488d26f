use crate::adapters::internal::InternalRegistry;
use crate::adapters::process::ProcessHandler;
use crate::domain::model::ResolvedServiceRecord;
use crate::domain::ports::ConnectionHandler;
use crate::utils::error::SkipReason;
use std::sync::Arc;

pub fn select(
    resolved: &ResolvedServiceRecord,
    registry: &InternalRegistry,
    internal_enabled: bool,
) -> Result<Arc<dyn ConnectionHandler>, SkipReason> {
    let record = &resolved.record;

    if !record.is_internal() {
        return Ok(Arc::new(ProcessHandler::from_resolved(resolved)));
    }

    if !internal_enabled {
        return Err(SkipReason::DisabledInternal);
    }

    let factory = registry
        .get(&record.name)
        .ok_or_else(|| SkipReason::UnknownInternalService {
            name: record.name.clone(),
        })?;

    Ok(factory())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ServiceRecord, SocketType, WaitMode};

    fn resolved(name: &str, program: &str) -> ResolvedServiceRecord {
        let record = ServiceRecord {
            name: name.to_string(),
            port: 8123,
            socket_type: SocketType::Stream,
            protocol: "tcp".to_string(),
            wait_mode: WaitMode::Wait,
            user: "glyph".to_string(),
            group: None,
            program: program.to_string(),
            arguments: vec!["cat".to_string(), "-".to_string()],
        };
        ResolvedServiceRecord::new(record, 1000, 100)
    }

    #[test]
    fn test_internal_service_from_registry() {
        let registry = InternalRegistry::builtin();
        let handler = select(&resolved("echo", "internal"), &registry, true).unwrap();
        assert_eq!(handler.name(), "echo");
    }

    #[test]
    fn test_internal_disabled() {
        let registry = InternalRegistry::builtin();
        let result = select(&resolved("echo", "internal"), &registry, false);
        assert_eq!(result.err(), Some(SkipReason::DisabledInternal));
    }

    #[test]
    fn test_unknown_internal_service() {
        let registry = InternalRegistry::builtin();
        let result = select(&resolved("qotd", "internal"), &registry, true);
        assert_eq!(
            result.err(),
            Some(SkipReason::UnknownInternalService {
                name: "qotd".to_string()
            })
        );
    }

    #[test]
    fn test_external_program_ignores_internal_flag() {
        let registry = InternalRegistry::empty();
        let handler = select(&resolved("8123", "/bin/cat"), &registry, false).unwrap();
        assert_eq!(handler.name(), "/bin/cat");
    }
}
