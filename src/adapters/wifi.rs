//! WiFi station-mode adapter.
//!
//! Implements [`NetworkPort`].  The radio is off for the whole wake cycle
//! unless a command needs the network; `begin` powers it and starts
//! association without blocking, `shutdown` powers it down again.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::wifi::EspWifi` in STA mode,
//!   with an optional fixed-address netif swapped in before the first start.
//! - **all other targets**: a scripted link for host-side tests.

use core::fmt;
use log::{info, warn};

use crate::app::ports::NetworkPort;
use crate::config::NetworkConfig;
use crate::error::CommsError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialError {
    InvalidSsid,
    InvalidPassword,
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
        }
    }
}

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

pub fn validate_credentials(config: &NetworkConfig) -> Result<(), CredentialError> {
    let ssid = config.ssid.as_str();
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(CredentialError::InvalidSsid);
    }
    let password = config.password.as_str();
    if !password.is_empty() && !(8..=64).contains(&password.len()) {
        return Err(CredentialError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Link state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Off,
    Associating,
    Up,
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    #[cfg(target_os = "espidf")]
    wifi: EspWifi<'static>,
    #[cfg(target_os = "espidf")]
    static_ip_applied: bool,
    /// Simulation: polls needed before the link comes up; `None` never does.
    #[cfg(not(target_os = "espidf"))]
    sim_polls_to_up: Option<u32>,
    #[cfg(not(target_os = "espidf"))]
    sim_polls: u32,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(wifi: EspWifi<'static>) -> Self {
        Self {
            state: WifiState::Off,
            wifi,
            static_ip_applied: false,
        }
    }

    /// Simulated link that associates after `polls_to_up` polls, or never.
    #[cfg(not(target_os = "espidf"))]
    pub fn new(polls_to_up: Option<u32>) -> Self {
        Self {
            state: WifiState::Off,
            sim_polls_to_up: polls_to_up,
            sim_polls: 0,
        }
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_begin(&mut self, config: &NetworkConfig) -> Result<(), CommsError> {
        if let (Some(ip), false) = (config.static_ip, self.static_ip_applied) {
            let netif = build_sta_netif(&ip).map_err(|e| {
                warn!("WiFi: static IP netif rejected ({})", e);
                CommsError::WifiFailed
            })?;
            self.wifi.swap_netif_sta(netif).map_err(|e| {
                warn!("WiFi: netif swap failed ({})", e);
                CommsError::WifiFailed
            })?;
            self.static_ip_applied = true;
        }

        let auth_method = if config.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        self.wifi
            .set_configuration(&Configuration::Client(ClientConfiguration {
                ssid: config
                    .ssid
                    .as_str()
                    .try_into()
                    .map_err(|_| CommsError::WifiFailed)?,
                password: config
                    .password
                    .as_str()
                    .try_into()
                    .map_err(|_| CommsError::WifiFailed)?,
                auth_method,
                ..Default::default()
            }))
            .map_err(|e| {
                warn!("WiFi: configuration rejected ({})", e);
                CommsError::WifiFailed
            })?;

        self.wifi.start().map_err(|e| {
            warn!("WiFi: start failed ({})", e);
            CommsError::WifiFailed
        })?;
        self.wifi.connect().map_err(|e| {
            warn!("WiFi: connect failed ({})", e);
            CommsError::WifiFailed
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_begin(&mut self, config: &NetworkConfig) -> Result<(), CommsError> {
        self.sim_polls = 0;
        info!(
            "WiFi(sim): associating with '{}'{}",
            config.ssid,
            if config.static_ip.is_some() { " (static IP)" } else { "" }
        );
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_up(&mut self) -> bool {
        self.wifi.is_up().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_up(&mut self) -> bool {
        self.sim_polls_to_up.is_some_and(|n| self.sim_polls >= n)
    }

    #[cfg(target_os = "espidf")]
    fn platform_poll(&mut self) {}

    #[cfg(not(target_os = "espidf"))]
    fn platform_poll(&mut self) {
        self.sim_polls = self.sim_polls.saturating_add(1);
    }

    #[cfg(target_os = "espidf")]
    fn platform_shutdown(&mut self) {
        let _ = self.wifi.disconnect();
        let _ = self.wifi.stop();
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_shutdown(&mut self) {
        self.sim_polls = 0;
    }
}

#[cfg(target_os = "espidf")]
fn build_sta_netif(
    ip: &crate::config::StaticIpConfig,
) -> Result<esp_idf_svc::netif::EspNetif, esp_idf_svc::sys::EspError> {
    use esp_idf_svc::ipv4::{
        ClientConfiguration as IpClientConfiguration, ClientSettings as IpClientSettings,
        Configuration as IpConfiguration, Mask, Subnet,
    };
    use esp_idf_svc::netif::{EspNetif, NetifConfiguration};
    use std::net::Ipv4Addr;

    let conf = NetifConfiguration {
        ip_configuration: Some(IpConfiguration::Client(IpClientConfiguration::Fixed(
            IpClientSettings {
                ip: Ipv4Addr::from(ip.address),
                subnet: Subnet {
                    gateway: Ipv4Addr::from(ip.gateway),
                    mask: Mask(ip.prefix_len()),
                },
                dns: Some(Ipv4Addr::from(ip.dns)),
                secondary_dns: None,
            },
        ))),
        ..NetifConfiguration::wifi_default_client()
    };
    EspNetif::new_with_conf(&conf)
}

// ───────────────────────────────────────────────────────────────
// NetworkPort
// ───────────────────────────────────────────────────────────────

impl NetworkPort for WifiAdapter {
    fn begin(&mut self, config: &NetworkConfig) -> Result<(), CommsError> {
        if let Err(e) = validate_credentials(config) {
            warn!("WiFi: {}", e);
            return Err(CommsError::WifiFailed);
        }
        info!("WiFi: connecting to '{}'", config.ssid);
        self.state = WifiState::Associating;
        if let Err(e) = self.platform_begin(config) {
            self.platform_shutdown();
            self.state = WifiState::Off;
            return Err(e);
        }
        Ok(())
    }

    fn is_up(&mut self) -> bool {
        if self.state == WifiState::Off {
            return false;
        }
        let up = self.platform_is_up();
        if up && self.state != WifiState::Up {
            info!("WiFi: link up");
            self.state = WifiState::Up;
        }
        up
    }

    fn poll_network(&mut self) {
        if self.state != WifiState::Off {
            self.platform_poll();
        }
    }

    fn shutdown(&mut self) {
        if self.state == WifiState::Off {
            return;
        }
        self.platform_shutdown();
        self.state = WifiState::Off;
        info!("WiFi: radio off");
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
