//! LDAP directory backend
//!
//! Role groups are `groupOfNames` entries at `cn={role},{group_base}`; the
//! bind DN is kept as a placeholder member because `groupOfNames` requires at
//! least one `member`. Users are `inetOrgPerson` entries at
//! `uid={name},{user_base}`.

use crate::config::DirectoryConfig;
use crate::core::traits::DirectoryService;
use crate::utils::error::Result;
use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, Mod, Scope, SearchEntry, dn_escape, ldap_escape};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info};

/// LDAP result codes treated as success for idempotent operations
const RC_NO_SUCH_ATTRIBUTE: u32 = 16;
const RC_ATTRIBUTE_OR_VALUE_EXISTS: u32 = 20;
const RC_NO_SUCH_OBJECT: u32 = 32;

/// Directory backend speaking LDAP
pub struct LdapDirectory {
    config: DirectoryConfig,
}

impl std::fmt::Debug for LdapDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapDirectory")
            .field("url", &self.config.url)
            .field("group_base", &self.config.group_base)
            .finish()
    }
}

impl LdapDirectory {
    pub fn new(config: &DirectoryConfig) -> Self {
        info!("LDAP directory mirror enabled at {}", config.url);
        Self {
            config: config.clone(),
        }
    }

    /// Open a connection and bind as the configured root DN
    async fn connect(&self) -> Result<Ldap> {
        let settings =
            LdapConnSettings::new().set_conn_timeout(Duration::from_secs(self.config.conn_timeout));
        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &self.config.url).await?;
        ldap3::drive!(conn);

        ldap.simple_bind(&self.config.root_dn, &self.config.root_password)
            .await?
            .success()?;
        Ok(ldap)
    }

    pub(crate) fn group_dn(&self, group: &str) -> String {
        format!("cn={},{}", dn_escape(group), self.config.group_base)
    }

    pub(crate) fn user_dn(&self, user: &str) -> String {
        format!("uid={},{}", dn_escape(user), self.config.user_base)
    }
}

#[async_trait]
impl DirectoryService for LdapDirectory {
    async fn create_user(&self, user: &str, email: &str, password_hash: Option<&str>) -> Result<()> {
        let mut ldap = self.connect().await?;
        let dn = self.user_dn(user);
        let mut attrs = vec![
            (
                "objectClass",
                HashSet::from(["inetOrgPerson", "organizationalPerson", "person", "top"]),
            ),
            ("uid", HashSet::from([user])),
            ("cn", HashSet::from([user])),
            ("sn", HashSet::from([user])),
            ("displayName", HashSet::from([user])),
            ("mail", HashSet::from([email])),
        ];
        if let Some(hash) = password_hash {
            attrs.push(("userPassword", HashSet::from([hash])));
        }
        ldap.add(&dn, attrs).await?.success()?;
        let _ = ldap.unbind().await;

        info!("Created LDAP user {}", dn);
        Ok(())
    }

    async fn delete_user(&self, user: &str) -> Result<()> {
        let mut ldap = self.connect().await?;
        let dn = self.user_dn(user);
        let res = ldap.delete(&dn).await?;
        let _ = ldap.unbind().await;

        if res.rc != RC_NO_SUCH_OBJECT {
            res.success()?;
        }
        info!("Deleted LDAP user {}", dn);
        Ok(())
    }

    async fn update_user_password(&self, user: &str, password_hash: &str) -> Result<()> {
        let mut ldap = self.connect().await?;
        let dn = self.user_dn(user);
        ldap.modify(
            &dn,
            vec![Mod::Replace("userPassword", HashSet::from([password_hash]))],
        )
        .await?
        .success()?;
        let _ = ldap.unbind().await;

        debug!("Replaced password of LDAP user {}", dn);
        Ok(())
    }

    async fn group_exists(&self, group: &str) -> Result<bool> {
        let mut ldap = self.connect().await?;
        let filter = format!("(cn={})", ldap_escape(group));
        let (entries, _) = ldap
            .search(&self.config.group_base, Scope::Subtree, &filter, vec!["cn"])
            .await?
            .success()?;
        let _ = ldap.unbind().await;

        let exists = entries.into_iter().any(|entry| {
            SearchEntry::construct(entry)
                .attrs
                .get("cn")
                .is_some_and(|values| values.iter().any(|cn| cn == group))
        });
        debug!(group, exists, "LDAP group lookup");
        Ok(exists)
    }

    async fn create_group(&self, group: &str) -> Result<()> {
        let mut ldap = self.connect().await?;
        let dn = self.group_dn(group);
        let attrs = vec![
            ("objectClass", HashSet::from(["groupOfNames", "top"])),
            ("cn", HashSet::from([group])),
            ("member", HashSet::from([self.config.root_dn.as_str()])),
        ];
        ldap.add(&dn, attrs).await?.success()?;
        let _ = ldap.unbind().await;

        info!("Created LDAP group {}", dn);
        Ok(())
    }

    async fn delete_group(&self, group: &str) -> Result<()> {
        let mut ldap = self.connect().await?;
        let dn = self.group_dn(group);
        let res = ldap.delete(&dn).await?;
        let _ = ldap.unbind().await;

        if res.rc != RC_NO_SUCH_OBJECT {
            res.success()?;
        }
        info!("Deleted LDAP group {}", dn);
        Ok(())
    }

    async fn add_member(&self, group: &str, user: &str) -> Result<()> {
        let mut ldap = self.connect().await?;
        let group_dn = self.group_dn(group);
        let user_dn = self.user_dn(user);
        let res = ldap
            .modify(
                &group_dn,
                vec![Mod::Add("member", HashSet::from([user_dn.as_str()]))],
            )
            .await?;
        let _ = ldap.unbind().await;

        if res.rc != RC_ATTRIBUTE_OR_VALUE_EXISTS {
            res.success()?;
        }
        debug!("Added {} to LDAP group {}", user_dn, group_dn);
        Ok(())
    }

    async fn remove_member(&self, group: &str, user: &str) -> Result<()> {
        let mut ldap = self.connect().await?;
        let group_dn = self.group_dn(group);
        let user_dn = self.user_dn(user);
        let res = ldap
            .modify(
                &group_dn,
                vec![Mod::Delete("member", HashSet::from([user_dn.as_str()]))],
            )
            .await?;
        let _ = ldap.unbind().await;

        if res.rc != RC_NO_SUCH_ATTRIBUTE {
            res.success()?;
        }
        debug!("Removed {} from LDAP group {}", user_dn, group_dn);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> LdapDirectory {
        LdapDirectory::new(&DirectoryConfig {
            enabled: true,
            user_base: "ou=users,dc=example,dc=org".to_string(),
            group_base: "ou=groups,dc=example,dc=org".to_string(),
            ..DirectoryConfig::default()
        })
    }

    #[test]
    fn test_dn_conventions() {
        let dir = directory();
        assert_eq!(dir.group_dn("viewer"), "cn=viewer,ou=groups,dc=example,dc=org");
        assert_eq!(dir.user_dn("alice"), "uid=alice,ou=users,dc=example,dc=org");
    }

    #[test]
    fn test_dn_values_are_escaped() {
        let dir = directory();
        assert!(!dir.group_dn("a,b").starts_with("cn=a,b,"));
    }
}
