use crate::domain::ports::IdentityDirectory;
use crate::utils::error::{IdentityKind, SkipReason};

/// 將 user / group 字串解析成 `(uid, gid)`。
///
/// 數字字串一律優先，不會查詢帳號資料庫。未指定 group 時，
/// 使用已解析 uid 的主要群組。
pub fn resolve<D>(directory: &D, user: &str, group: Option<&str>) -> Result<(u32, u32), SkipReason>
where
    D: IdentityDirectory + ?Sized,
{
    let uid = match user.parse::<u32>() {
        Ok(uid) => uid,
        Err(_) => directory
            .uid_by_name(user)
            .ok_or_else(|| unknown(IdentityKind::User, user))?,
    };

    let gid = match group {
        None => directory
            .primary_gid(uid)
            .ok_or_else(|| unknown(IdentityKind::User, &uid.to_string()))?,
        Some(group) => match group.parse::<u32>() {
            Ok(gid) => gid,
            Err(_) => directory
                .gid_by_name(group)
                .ok_or_else(|| unknown(IdentityKind::Group, group))?,
        },
    };

    Ok((uid, gid))
}

fn unknown(kind: IdentityKind, value: &str) -> SkipReason {
    SkipReason::UnknownIdentity {
        kind,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::identity::StaticDirectory;

    fn directory() -> StaticDirectory {
        StaticDirectory::new()
            .with_user("root", 0, 0)
            .with_user("glyph", 1000, 100)
            .with_user("0", 4242, 4242)
            .with_group("wheel", 10)
            .with_group("users", 100)
    }

    #[test]
    fn test_resolve_names() {
        let dir = directory();
        assert_eq!(resolve(&dir, "glyph", Some("wheel")), Ok((1000, 10)));
    }

    #[test]
    fn test_absent_group_uses_primary_group_of_uid() {
        let dir = directory();
        assert_eq!(resolve(&dir, "glyph", None), Ok((1000, 100)));
        // 數字 uid 也用 uid 查主要群組
        assert_eq!(resolve(&dir, "1000", None), Ok((1000, 100)));
    }

    #[test]
    fn test_numeric_strings_bypass_lookup() {
        let dir = directory();
        // 帳號 "0" 存在 (uid 4242)，但數字優先
        assert_eq!(resolve(&dir, "0", Some("0")), Ok((0, 0)));
        assert_eq!(resolve(&dir, "0", None), Ok((0, 0)));
        assert_eq!(resolve(&dir, "31337", Some("31337")), Ok((31337, 31337)));
    }

    #[test]
    fn test_unknown_user() {
        let dir = directory();
        assert_eq!(
            resolve(&dir, "nosuchuser", Some("wheel")),
            Err(SkipReason::UnknownIdentity {
                kind: IdentityKind::User,
                value: "nosuchuser".to_string(),
            })
        );
    }

    #[test]
    fn test_unknown_group() {
        let dir = directory();
        assert_eq!(
            resolve(&dir, "root", Some("nosuchgroup")),
            Err(SkipReason::UnknownIdentity {
                kind: IdentityKind::Group,
                value: "nosuchgroup".to_string(),
            })
        );
    }

    #[test]
    fn test_numeric_uid_without_account_needs_group() {
        let dir = directory();
        assert_eq!(
            resolve(&dir, "31337", None),
            Err(SkipReason::UnknownIdentity {
                kind: IdentityKind::User,
                value: "31337".to_string(),
            })
        );
    }

    #[test]
    fn test_negative_numbers_are_names() {
        let dir = directory();
        assert!(matches!(
            resolve(&dir, "-1", None),
            Err(SkipReason::UnknownIdentity {
                kind: IdentityKind::User,
                ..
            })
        ));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let dir = directory();
        let first = resolve(&dir, "glyph", None);
        let second = resolve(&dir, "glyph", None);
        assert_eq!(first, second);
    }
}
