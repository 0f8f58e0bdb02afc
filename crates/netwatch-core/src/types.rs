// # Connectivity Data Model
//
// Platform-neutral value types shared by the probe boundary, the state
// machine, and the observer API.
//
// Two vocabularies are kept deliberately separate:
//
// - `Transport` / `CellularSubtype`: the raw classification a platform probe
//   reports for a network.
// - `ConnectionType`: the canonical classification consumers see, with
//   cellular generations collapsed into a single variant carrying a hint.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque platform-assigned handle for a network (netlink ifindex on Linux).
///
/// Ids may be reused by the platform after a disconnect; holding one implies
/// nothing about liveness.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct NetworkId(pub u32);

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw network class as reported by a platform probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    Wifi,
    Ethernet,
    Cellular,
    Wimax,
    Bluetooth,
    Vpn,
    Other,
}

impl Transport {
    /// Canonical connection type for this transport, given the cellular
    /// subtype when one is known. Wimax reports as a 4G cellular bearer.
    pub fn connection_type(self, subtype: CellularSubtype) -> ConnectionType {
        match self {
            Transport::Wifi => ConnectionType::Wifi,
            Transport::Ethernet => ConnectionType::Ethernet,
            Transport::Cellular => ConnectionType::Cellular(subtype.generation()),
            Transport::Wimax => ConnectionType::Cellular(CellularGeneration::G4),
            Transport::Bluetooth => ConnectionType::Bluetooth,
            Transport::Vpn => ConnectionType::Vpn,
            Transport::Other => ConnectionType::Unknown,
        }
    }
}

/// Cellular generation hint carried inside [`ConnectionType::Cellular`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellularGeneration {
    G2,
    G3,
    G4,
    G5,
    Unknown,
}

impl fmt::Display for CellularGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CellularGeneration::G2 => "2g",
            CellularGeneration::G3 => "3g",
            CellularGeneration::G4 => "4g",
            CellularGeneration::G5 => "5g",
            CellularGeneration::Unknown => "unknown",
        };
        write!(f, "{label}")
    }
}

/// Radio technology of a cellular bearer, as reported by the platform.
///
/// Drives both the generation hint and the downlink bandwidth estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CellularSubtype {
    #[default]
    Unknown,
    Gsm,
    Iden,
    Cdma,
    OneXRtt,
    Gprs,
    Edge,
    Umts,
    EvdoRev0,
    EvdoRevA,
    EvdoRevB,
    Hsdpa,
    Hsupa,
    Hspa,
    HspaPlus,
    Ehrpd,
    Lte,
    LteAdvanced,
    Nr,
}

impl CellularSubtype {
    pub fn generation(self) -> CellularGeneration {
        match self {
            CellularSubtype::Gsm
            | CellularSubtype::Iden
            | CellularSubtype::Cdma
            | CellularSubtype::OneXRtt
            | CellularSubtype::Gprs
            | CellularSubtype::Edge => CellularGeneration::G2,
            CellularSubtype::Umts
            | CellularSubtype::EvdoRev0
            | CellularSubtype::EvdoRevA
            | CellularSubtype::EvdoRevB
            | CellularSubtype::Hsdpa
            | CellularSubtype::Hsupa
            | CellularSubtype::Hspa
            | CellularSubtype::HspaPlus
            | CellularSubtype::Ehrpd => CellularGeneration::G3,
            CellularSubtype::Lte | CellularSubtype::LteAdvanced => CellularGeneration::G4,
            CellularSubtype::Nr => CellularGeneration::G5,
            CellularSubtype::Unknown => CellularGeneration::Unknown,
        }
    }

    /// Nominal downlink figure in Mbps for this radio technology.
    ///
    /// Figures follow the netinfo downlinkMax table. Technologies without a
    /// published figure report unbounded rather than guessing.
    pub fn max_bandwidth_mbps(self) -> f64 {
        match self {
            CellularSubtype::Gsm => 0.01,
            CellularSubtype::Iden => 0.064,
            CellularSubtype::Cdma => 0.115,
            CellularSubtype::OneXRtt => 0.153,
            CellularSubtype::Gprs => 0.237,
            CellularSubtype::Edge => 0.384,
            CellularSubtype::Umts => 2.0,
            CellularSubtype::EvdoRev0 => 2.46,
            CellularSubtype::EvdoRevA => 3.1,
            CellularSubtype::Hspa => 3.6,
            CellularSubtype::Hsdpa => 14.3,
            CellularSubtype::Hsupa => 14.4,
            CellularSubtype::EvdoRevB => 14.7,
            CellularSubtype::Ehrpd => 21.0,
            CellularSubtype::HspaPlus => 42.0,
            CellularSubtype::Lte | CellularSubtype::LteAdvanced => 100.0,
            CellularSubtype::Nr | CellularSubtype::Unknown => f64::INFINITY,
        }
    }
}

/// Canonical connection classification exposed to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    /// No network connection.
    #[default]
    None,
    /// Connected, but the bearer could not be classified.
    Unknown,
    Wifi,
    Ethernet,
    Bluetooth,
    Vpn,
    Cellular(CellularGeneration),
}

impl ConnectionType {
    /// Whether this type counts as online. `Unknown` does: the platform
    /// reported a connection it could not classify, not the absence of one.
    pub fn is_online(self) -> bool {
        !matches!(self, ConnectionType::None)
    }
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionType::None => write!(f, "none"),
            ConnectionType::Unknown => write!(f, "unknown"),
            ConnectionType::Wifi => write!(f, "wifi"),
            ConnectionType::Ethernet => write!(f, "ethernet"),
            ConnectionType::Bluetooth => write!(f, "bluetooth"),
            ConnectionType::Vpn => write!(f, "vpn"),
            ConnectionType::Cellular(generation) => write!(f, "cellular/{generation}"),
        }
    }
}

/// The platform's report of its distinguished default network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveNetworkState {
    /// Whether any network is currently active.
    pub exists: bool,
    pub transport: Transport,
    pub subtype: CellularSubtype,
}

impl ActiveNetworkState {
    pub fn offline() -> Self {
        Self {
            exists: false,
            transport: Transport::Other,
            subtype: CellularSubtype::Unknown,
        }
    }

    pub fn online(transport: Transport) -> Self {
        Self {
            exists: true,
            transport,
            subtype: CellularSubtype::Unknown,
        }
    }

    pub fn cellular(subtype: CellularSubtype) -> Self {
        Self {
            exists: true,
            transport: Transport::Cellular,
            subtype,
        }
    }
}

/// Capability summary for one network, built by probes as a plain value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkCapabilities {
    /// Transports this network rides on. A VPN lists [`Transport::Vpn`]
    /// alongside its underlying transport when known.
    pub transports: Vec<Transport>,
    /// Whether the platform believes this network provides internet access.
    pub has_internet: bool,
}

impl NetworkCapabilities {
    pub fn new(transports: Vec<Transport>, has_internet: bool) -> Self {
        Self {
            transports,
            has_internet,
        }
    }

    /// Internet-capable network on a single transport.
    pub fn single(transport: Transport) -> Self {
        Self::new(vec![transport], true)
    }

    /// Internet-capable VPN riding on `underlying`.
    pub fn vpn_over(underlying: Transport) -> Self {
        Self::new(vec![Transport::Vpn, underlying], true)
    }

    pub fn has_transport(&self, transport: Transport) -> bool {
        self.transports.contains(&transport)
    }

    /// The most specific transport, picked by fixed priority.
    pub fn primary_transport(&self) -> Transport {
        const PRIORITY: [Transport; 6] = [
            Transport::Cellular,
            Transport::Wifi,
            Transport::Bluetooth,
            Transport::Ethernet,
            Transport::Wimax,
            Transport::Vpn,
        ];
        PRIORITY
            .into_iter()
            .find(|t| self.has_transport(*t))
            .unwrap_or(Transport::Other)
    }
}

/// Roster entry for one tracked network.
///
/// Owned exclusively by the state machine; clones cross the API boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDescriptor {
    pub id: NetworkId,
    /// Underlying transport (for a VPN, the bearer it rides on when known).
    pub transport: Transport,
    pub is_vpn: bool,
    /// For VPNs, whether this process can route traffic through it.
    pub vpn_accessible: bool,
}

impl NetworkDescriptor {
    /// Inaccessible VPNs are tracked silently: they raise no connect events
    /// and never count toward canonical state, but their eventual loss is
    /// still reported.
    pub fn suppressed(&self) -> bool {
        self.is_vpn && !self.vpn_accessible
    }

    pub fn is_accessible_vpn(&self) -> bool {
        self.is_vpn && self.vpn_accessible
    }

    pub fn connection_type(&self) -> ConnectionType {
        if self.is_vpn {
            ConnectionType::Vpn
        } else {
            self.transport.connection_type(CellularSubtype::Unknown)
        }
    }
}

/// Canonical connectivity state published to consumers.
///
/// Compared by value equality; an unchanged recompute produces no
/// notifications. The SSID is part of the comparison basis so that roaming
/// between access points of the same type still notifies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalState {
    pub connection_type: ConnectionType,
    /// Estimated maximum downlink in Mbps. `f64::INFINITY` means unknown or
    /// unbounded; `0.0` means offline.
    pub max_bandwidth_mbps: f64,
    /// Populated only while on WiFi.
    pub wifi_ssid: Option<String>,
}

impl CanonicalState {
    pub fn offline() -> Self {
        Self {
            connection_type: ConnectionType::None,
            max_bandwidth_mbps: 0.0,
            wifi_ssid: None,
        }
    }

    pub fn is_online(&self) -> bool {
        self.connection_type.is_online()
    }
}

impl Default for CanonicalState {
    fn default() -> Self {
        Self::offline()
    }
}
