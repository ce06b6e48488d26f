use crate::domain::ports::IdentityDirectory;
use nix::unistd::{Group, Uid, User};
use std::collections::HashMap;

/// 透過 getpwnam / getpwuid / getgrnam 查詢系統帳號
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemDirectory;

impl SystemDirectory {
    pub fn new() -> Self {
        Self
    }
}

impl IdentityDirectory for SystemDirectory {
    fn uid_by_name(&self, name: &str) -> Option<u32> {
        match User::from_name(name) {
            Ok(user) => user.map(|u| u.uid.as_raw()),
            Err(errno) => {
                tracing::warn!(user = name, error = %errno, "passwd lookup failed");
                None
            }
        }
    }

    fn primary_gid(&self, uid: u32) -> Option<u32> {
        match User::from_uid(Uid::from_raw(uid)) {
            Ok(user) => user.map(|u| u.gid.as_raw()),
            Err(errno) => {
                tracing::warn!(uid, error = %errno, "passwd lookup failed");
                None
            }
        }
    }

    fn gid_by_name(&self, name: &str) -> Option<u32> {
        match Group::from_name(name) {
            Ok(group) => group.map(|g| g.gid.as_raw()),
            Err(errno) => {
                tracing::warn!(group = name, error = %errno, "group lookup failed");
                None
            }
        }
    }
}

/// 記憶體中的帳號表，測試與離線檢查用
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    users: HashMap<String, (u32, u32)>,
    groups: HashMap<String, u32>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, name: &str, uid: u32, primary_gid: u32) -> Self {
        self.users.insert(name.to_string(), (uid, primary_gid));
        self
    }

    pub fn with_group(mut self, name: &str, gid: u32) -> Self {
        self.groups.insert(name.to_string(), gid);
        self
    }
}

impl IdentityDirectory for StaticDirectory {
    fn uid_by_name(&self, name: &str) -> Option<u32> {
        self.users.get(name).map(|(uid, _)| *uid)
    }

    fn primary_gid(&self, uid: u32) -> Option<u32> {
        self.users
            .values()
            .find(|(u, _)| *u == uid)
            .map(|(_, gid)| *gid)
    }

    fn gid_by_name(&self, name: &str) -> Option<u32> {
        self.groups.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_directory_knows_root() {
        let dir = SystemDirectory::new();
        assert_eq!(dir.uid_by_name("root"), Some(0));
        assert_eq!(dir.primary_gid(0), Some(0));
    }

    #[test]
    fn test_system_directory_unknown_names() {
        let dir = SystemDirectory::new();
        assert_eq!(dir.uid_by_name("small-inetd-no-such-user"), None);
        assert_eq!(dir.gid_by_name("small-inetd-no-such-group"), None);
    }

    #[test]
    fn test_static_directory_primary_gid_by_uid() {
        let dir = StaticDirectory::new().with_user("glyph", 1000, 100);
        assert_eq!(dir.primary_gid(1000), Some(100));
        assert_eq!(dir.primary_gid(1001), None);
    }
}
