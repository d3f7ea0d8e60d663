//! Wi-Fi station-mode adapter.
//!
//! Implements [`NetworkPort`] — the hexagonal boundary for link-layer
//! connectivity.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF Wi-Fi driver calls via
//!   `esp_idf_svc::wifi::BlockingWifi`.
//! - **all other targets**: simulation stub for host-side builds.
//!
//! `connect` is a synchronous, blocking call bounded by the Wi-Fi stack's
//! own association timeout; the supervisor treats it as one recovery step
//! and never blocks longer than the stack allows.

use log::{info, warn};

use crate::app::ports::NetworkPort;
use crate::config::NodeConfig;
use crate::error::NetError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::modem::Modem,
    nvs::EspDefaultNvsPartition,
    wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi},
};

pub struct WifiAdapter {
    ssid: &'static str,
    password: &'static str,
    #[cfg(target_os = "espidf")]
    wifi: BlockingWifi<EspWifi<'static>>,
    #[cfg(not(target_os = "espidf"))]
    sim_link: bool,
    #[cfg(not(target_os = "espidf"))]
    sim_radio_on: bool,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
        config: &NodeConfig,
    ) -> anyhow::Result<Self> {
        let wifi = EspWifi::new(modem, sysloop.clone(), Some(nvs))?;
        let wifi = BlockingWifi::wrap(wifi, sysloop)?;
        Ok(Self {
            ssid: config.wifi_ssid,
            password: config.wifi_password,
            wifi,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(config: &NodeConfig) -> anyhow::Result<Self> {
        info!("wifi(sim): adapter for '{}'", config.wifi_ssid);
        Ok(Self {
            ssid: config.wifi_ssid,
            password: config.wifi_password,
            sim_link: false,
            sim_radio_on: true,
        })
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self) -> Result<(), NetError> {
        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let client_config = Configuration::Client(ClientConfiguration {
            ssid: self.ssid.try_into().map_err(|_| NetError::AssociationFailed)?,
            password: self
                .password
                .try_into()
                .map_err(|_| NetError::AssociationFailed)?,
            auth_method,
            ..Default::default()
        });

        let connect = || -> anyhow::Result<()> {
            self.wifi.set_configuration(&client_config)?;
            if !self.wifi.wifi().is_started()? {
                self.wifi.start()?;
            }
            self.wifi.connect()?;
            self.wifi.wait_netif_up()?;
            Ok(())
        };

        match connect() {
            Ok(()) => {
                self.log_ip_info();
                Ok(())
            }
            Err(e) => {
                warn!("wifi: association with '{}' failed: {e}", self.ssid);
                Err(NetError::AssociationFailed)
            }
        }
    }

    #[cfg(target_os = "espidf")]
    fn log_ip_info(&self) {
        match self.wifi.wifi().sta_netif().get_ip_info() {
            Ok(ip) => info!(
                "wifi: STA ip={} gw={} mask=/{}",
                ip.ip,
                ip.subnet.gateway,
                ip.subnet.mask.0
            ),
            Err(e) => warn!("wifi: could not read IP info: {e}"),
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self) -> Result<(), NetError> {
        if !self.sim_radio_on {
            warn!("wifi(sim): connect refused, radio disabled");
            return Err(NetError::RadioDisabled);
        }
        self.sim_link = true;
        let auth = if self.password.is_empty() { "open" } else { "wpa2-psk" };
        info!("wifi(sim): associated with '{}' ({auth})", self.ssid);
        Ok(())
    }
}

impl NetworkPort for WifiAdapter {
    fn connect(&mut self) -> Result<(), NetError> {
        info!("wifi: associating with '{}'", self.ssid);
        self.platform_connect()
    }

    fn link_up(&self) -> bool {
        #[cfg(target_os = "espidf")]
        {
            self.wifi.wifi().is_connected().unwrap_or(false)
        }

        #[cfg(not(target_os = "espidf"))]
        {
            self.sim_link
        }
    }

    fn set_radio_enabled(&mut self, enabled: bool) {
        #[cfg(target_os = "espidf")]
        {
            let result = if enabled {
                self.wifi.start()
            } else {
                self.wifi.stop()
            };
            if let Err(e) = result {
                warn!("wifi: radio {} failed: {e}", if enabled { "start" } else { "stop" });
            } else {
                info!("wifi: radio {}", if enabled { "enabled" } else { "disabled" });
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            self.sim_radio_on = enabled;
            if !enabled {
                self.sim_link = false;
            }
            info!("wifi(sim): radio {}", if enabled { "enabled" } else { "disabled" });
        }
    }
}
