//! Shell settings loaded via OrthoConfig.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use ortho_config::OrthoConfig;
use serde::Deserialize;

use marketplace_shell::domain::LogoutPolicy;

const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_STORAGE_URL: &str = "http://127.0.0.1:8080/storage";

/// Values controlling how the shell binds and which adapters it seeds.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "MARKETPLACE")]
pub struct ShellSettings {
    /// Interface to bind.
    pub host: Option<IpAddr>,
    /// Port to bind.
    pub port: Option<u16>,
    /// Skip seeding the demo accounts.
    #[ortho_config(default = false)]
    pub skip_demo_accounts: bool,
    /// Keep the session when the remote sign-out fails.
    #[ortho_config(default = false)]
    pub retain_session_on_failed_sign_out: bool,
    /// Public base URL for uploaded profile pictures.
    pub storage_base_url: Option<String>,
}

impl ShellSettings {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(
            self.host.unwrap_or(DEFAULT_HOST),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }

    pub fn seed_demo_accounts(&self) -> bool {
        !self.skip_demo_accounts
    }

    pub fn logout_policy(&self) -> LogoutPolicy {
        if self.retain_session_on_failed_sign_out {
            LogoutPolicy::RetainOnRemoteFailure
        } else {
            LogoutPolicy::ClearLocally
        }
    }

    pub fn storage_base_url(&self) -> &str {
        self.storage_base_url
            .as_deref()
            .unwrap_or(DEFAULT_STORAGE_URL)
    }
}
