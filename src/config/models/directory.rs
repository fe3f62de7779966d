//! Directory mirror configuration

use super::default_connection_timeout;
use serde::{Deserialize, Serialize};

/// LDAP directory configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Mirror roles and memberships into the directory
    #[serde(default)]
    pub enabled: bool,
    /// Server URL, `ldap://` or `ldaps://`
    #[serde(default = "default_directory_url")]
    pub url: String,
    /// DN used to bind, also the placeholder member of new groups
    #[serde(default = "default_root_dn")]
    pub root_dn: String,
    #[serde(default)]
    pub root_password: String,
    /// Base DN under which users live as `uid={name}`
    #[serde(default = "default_user_base")]
    pub user_base: String,
    /// Base DN under which role groups live as `cn={role}`
    #[serde(default = "default_group_base")]
    pub group_base: String,
    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub conn_timeout: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: default_directory_url(),
            root_dn: default_root_dn(),
            root_password: String::new(),
            user_base: default_user_base(),
            group_base: default_group_base(),
            conn_timeout: default_connection_timeout(),
        }
    }
}

impl std::fmt::Debug for DirectoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryConfig")
            .field("enabled", &self.enabled)
            .field("url", &self.url)
            .field("root_dn", &self.root_dn)
            .field("root_password", &"[REDACTED]")
            .field("user_base", &self.user_base)
            .field("group_base", &self.group_base)
            .field("conn_timeout", &self.conn_timeout)
            .finish()
    }
}

fn default_directory_url() -> String {
    "ldap://127.0.0.1:389".to_string()
}

fn default_root_dn() -> String {
    "cn=admin,dc=example,dc=org".to_string()
}

fn default_user_base() -> String {
    "ou=users,dc=example,dc=org".to_string()
}

fn default_group_base() -> String {
    "ou=groups,dc=example,dc=org".to_string()
}
