// # Netlink Platform Probe
//
// Linux implementation of `PlatformProbe` on top of rtnetlink broadcast
// groups and the kernel's sysfs/procfs views.
//
// ## Push events
//
// A raw `AF_NETLINK`/`NETLINK_ROUTE` socket joins the link, v4/v6 address
// and v4/v6 route multicast groups. Only the fixed `nlmsghdr`/`ifinfomsg`
// headers are parsed: link messages map to per-network events, address and
// route messages degrade to the `ConnectivityChanged` catch-all that makes
// the state machine re-query.
//
// ## Snapshot queries
//
// Queries read `/sys/class/net` (ifindex, operstate, ARPHRD type, wireless
// marker) and `/proc/net/route` (default route). Both roots are constructor
// parameters so tests can point the probe at fixture trees.
//
// ## Platform support
//
// Linux only. The daemon falls back to `netwatch-probe-poll` elsewhere.

#[cfg(target_os = "linux")]
use std::fs;
#[cfg(target_os = "linux")]
use std::io;
#[cfg(target_os = "linux")]
use std::mem;
#[cfg(target_os = "linux")]
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
#[cfg(target_os = "linux")]
use std::path::{Path, PathBuf};
#[cfg(target_os = "linux")]
use std::sync::Mutex;

#[cfg(target_os = "linux")]
use async_trait::async_trait;
#[cfg(target_os = "linux")]
use tokio::io::unix::AsyncFd;
#[cfg(target_os = "linux")]
use tokio::io::Interest;
#[cfg(target_os = "linux")]
use tokio::task::JoinHandle;
#[cfg(target_os = "linux")]
use tracing::{debug, warn};

#[cfg(target_os = "linux")]
use netwatch_core::traits::{PlatformProbe, ProbeEvent, ProbeEventSender};
#[cfg(target_os = "linux")]
use netwatch_core::types::{ActiveNetworkState, NetworkCapabilities, NetworkId, Transport};
#[cfg(target_os = "linux")]
use netwatch_core::{Error, Result};

#[cfg(target_os = "linux")]
const SYSFS_NET_ROOT: &str = "/sys/class/net";
#[cfg(target_os = "linux")]
const PROC_NET_ROOT: &str = "/proc/net";

/// One recv per datagram; rtnetlink batches fit comfortably in a page pair.
#[cfg(target_os = "linux")]
const RECV_BUFFER_LEN: usize = 8192;

#[cfg(target_os = "linux")]
const NLMSG_HDRLEN: usize = mem::size_of::<libc::nlmsghdr>();
#[cfg(target_os = "linux")]
const IFINFOMSG_LEN: usize = mem::size_of::<libc::ifinfomsg>();

/// rtnetlink-backed probe.
///
/// Cheap to construct; holds no file descriptors until `subscribe`.
#[cfg(target_os = "linux")]
pub struct NetlinkProbe {
    sysfs_net: PathBuf,
    proc_net: PathBuf,
    reader: Mutex<Option<JoinHandle<()>>>,
}

#[cfg(target_os = "linux")]
impl NetlinkProbe {
    pub fn new() -> Self {
        Self::with_roots(SYSFS_NET_ROOT, PROC_NET_ROOT)
    }

    /// Probe reading interface state from `sysfs_net` (the `/sys/class/net`
    /// equivalent) and routes from `proc_net` (the `/proc/net` equivalent).
    pub fn with_roots(sysfs_net: impl Into<PathBuf>, proc_net: impl Into<PathBuf>) -> Self {
        Self {
            sysfs_net: sysfs_net.into(),
            proc_net: proc_net.into(),
            reader: Mutex::new(None),
        }
    }

    /// Non-loopback interface names, sorted for deterministic enumeration.
    fn interface_names(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.sysfs_net) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .flatten()
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name != "lo")
            .collect();
        names.sort();
        names
    }

    fn read_attribute(&self, name: &str, attribute: &str) -> Option<String> {
        fs::read_to_string(self.sysfs_net.join(name).join(attribute))
            .ok()
            .map(|value| value.trim().to_string())
    }

    fn interface_index(&self, name: &str) -> Option<NetworkId> {
        self.read_attribute(name, "ifindex")?
            .parse::<u32>()
            .ok()
            .map(NetworkId)
    }

    /// Tunnel devices commonly report "unknown" rather than "up"; treat both
    /// as carrying traffic.
    fn is_up(&self, name: &str) -> bool {
        matches!(
            self.read_attribute(name, "operstate").as_deref(),
            Some("up") | Some("unknown")
        )
    }

    fn interface_for(&self, id: NetworkId) -> Option<String> {
        self.interface_names()
            .into_iter()
            .find(|name| self.interface_index(name) == Some(id))
    }

    /// Transport classification from the wireless sysfs marker, then the
    /// kernel naming conventions, then the ARPHRD link type. The name check
    /// runs before the link type because cellular modems usually present as
    /// plain ethernet.
    fn classify(&self, name: &str) -> Transport {
        let iface_dir = self.sysfs_net.join(name);
        if iface_dir.join("wireless").is_dir() || iface_dir.join("phy80211").exists() {
            return Transport::Wifi;
        }
        if let Some(transport) = classify_by_name(name) {
            return transport;
        }
        match self
            .read_attribute(name, "type")
            .and_then(|value| value.parse::<u16>().ok())
        {
            Some(libc::ARPHRD_NONE) => Transport::Vpn,
            Some(libc::ARPHRD_ETHER) => Transport::Ethernet,
            _ => Transport::Other,
        }
    }

    /// Interface carrying the default route, from the procfs route table.
    /// A destination of all zeroes marks the default route.
    fn default_route_interface(&self) -> Option<String> {
        let table = fs::read_to_string(self.proc_net.join("route")).ok()?;
        for line in table.lines().skip(1) {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() >= 2 && fields[1] == "00000000" {
                return Some(fields[0].to_string());
            }
        }
        None
    }

    fn wifi_interface(&self) -> Option<String> {
        self.interface_names()
            .into_iter()
            .find(|name| self.is_up(name) && self.classify(name) == Transport::Wifi)
    }
}

#[cfg(target_os = "linux")]
impl Default for NetlinkProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "linux")]
#[async_trait]
impl PlatformProbe for NetlinkProbe {
    async fn active_network_state(&self) -> Result<ActiveNetworkState> {
        match self.default_route_interface() {
            Some(name) if self.is_up(&name) => {
                Ok(ActiveNetworkState::online(self.classify(&name)))
            }
            _ => Ok(ActiveNetworkState::offline()),
        }
    }

    async fn all_network_ids(&self) -> Vec<NetworkId> {
        self.interface_names()
            .into_iter()
            .filter(|name| self.is_up(name))
            .filter_map(|name| self.interface_index(&name))
            .collect()
    }

    async fn network_capabilities(&self, id: NetworkId) -> Option<NetworkCapabilities> {
        let name = self.interface_for(id)?;
        if !self.is_up(&name) {
            return None;
        }
        // sysfs cannot prove internet reach, so an up interface is assumed
        // to bear it.
        Some(match self.classify(&name) {
            Transport::Vpn => NetworkCapabilities::new(vec![Transport::Vpn], true),
            transport => NetworkCapabilities::single(transport),
        })
    }

    async fn is_vpn_accessible(&self, _id: NetworkId) -> bool {
        // One routing domain per host: a visible tunnel serves every
        // process.
        true
    }

    async fn default_network_id(&self) -> Option<NetworkId> {
        let name = self.default_route_interface()?;
        self.interface_index(&name)
    }

    async fn wifi_link_speed_mbps(&self) -> Option<u32> {
        let name = self.wifi_interface()?;
        // Drivers report -1 when the rate is unknown.
        let mbps = self.read_attribute(&name, "speed")?.parse::<i64>().ok()?;
        u32::try_from(mbps).ok()
    }

    async fn wifi_ssid(&self) -> Option<String> {
        // The SSID lives behind the nl80211 generic family, which this
        // probe does not speak.
        None
    }

    async fn subscribe(&self, events: ProbeEventSender) -> Result<()> {
        let socket = RouteSocket::open().map_err(|error| {
            Error::registration(format!("rtnetlink socket unavailable: {error}"))
        })?;
        let reader = tokio::spawn(read_loop(socket, events));
        if let Some(stale) = self.reader.lock().unwrap().replace(reader) {
            stale.abort();
        }
        Ok(())
    }

    async fn unsubscribe(&self) {
        if let Some(reader) = self.reader.lock().unwrap().take() {
            reader.abort();
        }
    }

    fn probe_name(&self) -> &'static str {
        "netlink"
    }
}

/// Nonblocking `NETLINK_ROUTE` socket joined to the link, address and route
/// multicast groups.
#[cfg(target_os = "linux")]
struct RouteSocket {
    fd: OwnedFd,
}

#[cfg(target_os = "linux")]
impl RouteSocket {
    fn open() -> io::Result<Self> {
        // SAFETY: plain socket(2); the fd is wrapped immediately.
        let raw = unsafe {
            libc::socket(
                libc::AF_NETLINK,
                libc::SOCK_RAW | libc::SOCK_NONBLOCK | libc::SOCK_CLOEXEC,
                libc::NETLINK_ROUTE,
            )
        };
        if raw < 0 {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: `raw` is a freshly-created, owned descriptor.
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };

        // SAFETY: sockaddr_nl is valid when zeroed.
        let mut addr: libc::sockaddr_nl = unsafe { mem::zeroed() };
        addr.nl_family = libc::AF_NETLINK as libc::sa_family_t;
        addr.nl_groups = (libc::RTMGRP_LINK
            | libc::RTMGRP_IPV4_IFADDR
            | libc::RTMGRP_IPV6_IFADDR
            | libc::RTMGRP_IPV4_ROUTE
            | libc::RTMGRP_IPV6_ROUTE) as u32;
        // SAFETY: addr points at a properly-sized sockaddr_nl for the
        // lifetime of the call.
        let rc = unsafe {
            libc::bind(
                fd.as_raw_fd(),
                &addr as *const libc::sockaddr_nl as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_nl>() as libc::socklen_t,
            )
        };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Self { fd })
    }

    fn recv(&self, buffer: &mut [u8]) -> io::Result<usize> {
        // SAFETY: buffer is valid for writes of its full length.
        let len = unsafe {
            libc::recv(
                self.fd.as_raw_fd(),
                buffer.as_mut_ptr().cast(),
                buffer.len(),
                0,
            )
        };
        if len < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(len as usize)
        }
    }
}

#[cfg(target_os = "linux")]
impl AsRawFd for RouteSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}

/// Reader task: forwards kernel messages until the receiver goes away or
/// the task is aborted by `unsubscribe`.
#[cfg(target_os = "linux")]
async fn read_loop(socket: RouteSocket, events: ProbeEventSender) {
    let socket = match AsyncFd::with_interest(socket, Interest::READABLE) {
        Ok(socket) => socket,
        Err(error) => {
            warn!(%error, "failed to register netlink socket with the runtime");
            return;
        }
    };
    let mut buffer = vec![0u8; RECV_BUFFER_LEN];
    loop {
        let mut guard = match socket.readable().await {
            Ok(guard) => guard,
            Err(error) => {
                warn!(%error, "netlink readiness poll failed");
                return;
            }
        };
        match guard.try_io(|fd| fd.get_ref().recv(&mut buffer)) {
            Ok(Ok(len)) => {
                for event in parse_events(&buffer[..len]) {
                    debug!(?event, "netlink event");
                    if events.send(event).is_err() {
                        debug!("event receiver gone, stopping netlink reader");
                        return;
                    }
                }
            }
            Ok(Err(error)) => {
                warn!(%error, "netlink recv failed");
                return;
            }
            Err(_would_block) => continue,
        }
    }
}

/// Walk a datagram of netlink messages and translate the interesting ones.
///
/// Parses fixed headers only. Attribute payloads (addresses, link names)
/// are deliberately skipped: per-network identity comes from the ifindex,
/// and everything else is re-queried from sysfs on demand.
#[cfg(target_os = "linux")]
fn parse_events(buffer: &[u8]) -> Vec<ProbeEvent> {
    let mut events = Vec::new();
    let mut offset = 0;
    while buffer.len().saturating_sub(offset) >= NLMSG_HDRLEN {
        let Some(msg_len) = read_u32(buffer, offset).map(|len| len as usize) else {
            break;
        };
        let Some(msg_type) = read_u16(buffer, offset + 4) else {
            break;
        };
        if msg_len < NLMSG_HDRLEN || offset + msg_len > buffer.len() {
            break;
        }
        if msg_type == libc::NLMSG_DONE as u16 {
            break;
        }
        let payload = &buffer[offset + NLMSG_HDRLEN..offset + msg_len];
        match msg_type {
            libc::RTM_NEWLINK => {
                if let Some(event) = link_event(payload, false) {
                    events.push(event);
                }
            }
            libc::RTM_DELLINK => {
                if let Some(event) = link_event(payload, true) {
                    events.push(event);
                }
            }
            libc::RTM_NEWADDR | libc::RTM_DELADDR | libc::RTM_NEWROUTE
            | libc::RTM_DELROUTE => {
                events.push(ProbeEvent::ConnectivityChanged);
            }
            _ => {}
        }
        offset += nlmsg_align(msg_len);
    }
    events
}

/// `ifinfomsg`: family u8, pad u8, type u16, index i32, flags u32, change
/// u32. An interface counts as connected only with both UP and RUNNING set.
#[cfg(target_os = "linux")]
fn link_event(payload: &[u8], deleted: bool) -> Option<ProbeEvent> {
    if payload.len() < IFINFOMSG_LEN {
        return None;
    }
    let index = read_i32(payload, 4)?;
    let flags = read_u32(payload, 8)?;
    if index <= 0 || flags & libc::IFF_LOOPBACK as u32 != 0 {
        return None;
    }
    let id = NetworkId(index as u32);
    if deleted {
        return Some(ProbeEvent::NetworkLost(id));
    }
    let connected = libc::IFF_UP as u32 | libc::IFF_RUNNING as u32;
    if flags & connected == connected {
        Some(ProbeEvent::NetworkAvailable(id))
    } else {
        Some(ProbeEvent::NetworkLost(id))
    }
}

#[cfg(target_os = "linux")]
fn classify_by_name(name: &str) -> Option<Transport> {
    const PREFIXES: &[(&str, Transport)] = &[
        ("wl", Transport::Wifi),
        ("ww", Transport::Cellular),
        ("rmnet", Transport::Cellular),
        ("tun", Transport::Vpn),
        ("tap", Transport::Vpn),
        ("wg", Transport::Vpn),
        ("ppp", Transport::Vpn),
        ("bnep", Transport::Bluetooth),
        ("en", Transport::Ethernet),
        ("eth", Transport::Ethernet),
    ];
    PREFIXES
        .iter()
        .find(|(prefix, _)| name.starts_with(prefix))
        .map(|(_, transport)| *transport)
}

#[cfg(target_os = "linux")]
fn nlmsg_align(len: usize) -> usize {
    (len + 3) & !3
}

#[cfg(target_os = "linux")]
fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    data.get(offset..offset + 4)?
        .try_into()
        .ok()
        .map(u32::from_ne_bytes)
}

#[cfg(target_os = "linux")]
fn read_i32(data: &[u8], offset: usize) -> Option<i32> {
    data.get(offset..offset + 4)?
        .try_into()
        .ok()
        .map(i32::from_ne_bytes)
}

#[cfg(target_os = "linux")]
fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    data.get(offset..offset + 2)?
        .try_into()
        .ok()
        .map(u16::from_ne_bytes)
}

#[cfg(test)]
#[cfg(target_os = "linux")]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_iface(
        root: &Path,
        name: &str,
        ifindex: u32,
        operstate: &str,
        arphrd: u16,
        wireless: bool,
    ) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("ifindex"), format!("{ifindex}\n")).unwrap();
        fs::write(dir.join("operstate"), format!("{operstate}\n")).unwrap();
        fs::write(dir.join("type"), format!("{arphrd}\n")).unwrap();
        if wireless {
            fs::create_dir_all(dir.join("wireless")).unwrap();
        }
    }

    /// Fixture host: wired default route, associated wifi, a down modem and
    /// a tun device.
    fn fixture() -> (TempDir, NetlinkProbe) {
        let dir = TempDir::new().unwrap();
        let sysfs = dir.path().join("net");
        let proc = dir.path().join("proc");
        fs::create_dir_all(&sysfs).unwrap();
        fs::create_dir_all(&proc).unwrap();
        write_iface(&sysfs, "lo", 1, "unknown", libc::ARPHRD_LOOPBACK, false);
        write_iface(&sysfs, "eth0", 2, "up", libc::ARPHRD_ETHER, false);
        write_iface(&sysfs, "wlp3s0", 3, "up", libc::ARPHRD_ETHER, true);
        write_iface(&sysfs, "wwan0", 4, "down", libc::ARPHRD_ETHER, false);
        write_iface(&sysfs, "tun0", 7, "unknown", libc::ARPHRD_NONE, false);
        fs::write(
            proc.join("route"),
            "Iface\tDestination\tGateway\tFlags\tRefCnt\tUse\tMetric\tMask\tMTU\tWindow\tIRTT\n\
             eth0\t00000000\t0101A8C0\t0003\t0\t0\t100\t00000000\t0\t0\t0\n\
             eth0\t0001A8C0\t00000000\t0001\t0\t0\t100\t00FFFFFF\t0\t0\t0\n",
        )
        .unwrap();
        let probe = NetlinkProbe::with_roots(&sysfs, &proc);
        (dir, probe)
    }

    #[test]
    fn classification_prefers_wireless_marker_then_name_then_link_type() {
        let (_dir, probe) = fixture();
        assert_eq!(probe.classify("eth0"), Transport::Ethernet);
        assert_eq!(probe.classify("wlp3s0"), Transport::Wifi);
        // Modems present as ethernet links; the name wins.
        assert_eq!(probe.classify("wwan0"), Transport::Cellular);
        assert_eq!(probe.classify("tun0"), Transport::Vpn);
    }

    #[test]
    fn name_prefix_table_covers_the_conventions() {
        assert_eq!(classify_by_name("wlan0"), Some(Transport::Wifi));
        assert_eq!(classify_by_name("enp0s31f6"), Some(Transport::Ethernet));
        assert_eq!(classify_by_name("rmnet_data0"), Some(Transport::Cellular));
        assert_eq!(classify_by_name("wg0"), Some(Transport::Vpn));
        assert_eq!(classify_by_name("bnep0"), Some(Transport::Bluetooth));
        assert_eq!(classify_by_name("docker0"), None);
    }

    #[tokio::test]
    async fn enumeration_skips_loopback_and_down_interfaces() {
        let (_dir, probe) = fixture();
        let mut ids = probe.all_network_ids().await;
        ids.sort();
        assert_eq!(ids, vec![NetworkId(2), NetworkId(3), NetworkId(7)]);
    }

    #[tokio::test]
    async fn active_network_follows_the_default_route() {
        let (_dir, probe) = fixture();
        let state = probe.active_network_state().await.unwrap();
        assert!(state.exists);
        assert_eq!(state.transport, Transport::Ethernet);
        assert_eq!(probe.default_network_id().await, Some(NetworkId(2)));
    }

    #[tokio::test]
    async fn missing_route_table_reads_as_offline() {
        let (_dir, probe) = fixture();
        let lonely = NetlinkProbe::with_roots(&probe.sysfs_net, "/nonexistent");
        let state = lonely.active_network_state().await.unwrap();
        assert!(!state.exists);
        assert_eq!(lonely.default_network_id().await, None);
    }

    #[tokio::test]
    async fn capabilities_classify_tunnels_as_vpn() {
        let (_dir, probe) = fixture();
        let caps = probe.network_capabilities(NetworkId(7)).await.unwrap();
        assert!(caps.has_transport(Transport::Vpn));
        assert!(caps.has_internet);
        // Down interfaces cannot be classified.
        assert!(probe.network_capabilities(NetworkId(4)).await.is_none());
        assert!(probe.network_capabilities(NetworkId(99)).await.is_none());
    }

    #[tokio::test]
    async fn wifi_link_speed_reads_sysfs_and_rejects_unknown() {
        let (dir, probe) = fixture();
        assert_eq!(probe.wifi_link_speed_mbps().await, None);
        fs::write(dir.path().join("net/wlp3s0/speed"), "866\n").unwrap();
        assert_eq!(probe.wifi_link_speed_mbps().await, Some(866));
        fs::write(dir.path().join("net/wlp3s0/speed"), "-1\n").unwrap();
        assert_eq!(probe.wifi_link_speed_mbps().await, None);
    }

    fn nlmsg(msg_type: u16, payload: &[u8]) -> Vec<u8> {
        let total = NLMSG_HDRLEN + payload.len();
        let mut out = Vec::with_capacity(nlmsg_align(total));
        out.extend_from_slice(&(total as u32).to_ne_bytes());
        out.extend_from_slice(&msg_type.to_ne_bytes());
        out.extend_from_slice(&0u16.to_ne_bytes()); // flags
        out.extend_from_slice(&0u32.to_ne_bytes()); // seq
        out.extend_from_slice(&0u32.to_ne_bytes()); // pid
        out.extend_from_slice(payload);
        out.resize(nlmsg_align(total), 0);
        out
    }

    fn ifinfo(index: i32, flags: u32) -> Vec<u8> {
        let mut out = vec![0u8; IFINFOMSG_LEN];
        out[4..8].copy_from_slice(&index.to_ne_bytes());
        out[8..12].copy_from_slice(&flags.to_ne_bytes());
        out
    }

    const UP_RUNNING: u32 = libc::IFF_UP as u32 | libc::IFF_RUNNING as u32;

    #[test]
    fn newlink_with_up_running_is_available() {
        let datagram = nlmsg(libc::RTM_NEWLINK, &ifinfo(5, UP_RUNNING));
        assert_eq!(
            parse_events(&datagram),
            vec![ProbeEvent::NetworkAvailable(NetworkId(5))]
        );
    }

    #[test]
    fn newlink_without_running_is_lost() {
        let datagram = nlmsg(libc::RTM_NEWLINK, &ifinfo(5, libc::IFF_UP as u32));
        assert_eq!(
            parse_events(&datagram),
            vec![ProbeEvent::NetworkLost(NetworkId(5))]
        );
    }

    #[test]
    fn dellink_is_lost_and_loopback_is_filtered() {
        let datagram = nlmsg(libc::RTM_DELLINK, &ifinfo(5, UP_RUNNING));
        assert_eq!(
            parse_events(&datagram),
            vec![ProbeEvent::NetworkLost(NetworkId(5))]
        );
        let datagram = nlmsg(
            libc::RTM_NEWLINK,
            &ifinfo(1, UP_RUNNING | libc::IFF_LOOPBACK as u32),
        );
        assert_eq!(parse_events(&datagram), vec![]);
    }

    #[test]
    fn address_and_route_messages_degrade_to_connectivity_changed() {
        for msg_type in [
            libc::RTM_NEWADDR,
            libc::RTM_DELADDR,
            libc::RTM_NEWROUTE,
            libc::RTM_DELROUTE,
        ] {
            let datagram = nlmsg(msg_type, &[0u8; 8]);
            assert_eq!(
                parse_events(&datagram),
                vec![ProbeEvent::ConnectivityChanged]
            );
        }
    }

    #[test]
    fn batched_messages_all_parse() {
        let mut datagram = nlmsg(libc::RTM_NEWLINK, &ifinfo(5, UP_RUNNING));
        datagram.extend(nlmsg(libc::RTM_NEWADDR, &[0u8; 8]));
        datagram.extend(nlmsg(libc::RTM_DELLINK, &ifinfo(6, 0)));
        assert_eq!(
            parse_events(&datagram),
            vec![
                ProbeEvent::NetworkAvailable(NetworkId(5)),
                ProbeEvent::ConnectivityChanged,
                ProbeEvent::NetworkLost(NetworkId(6)),
            ]
        );
    }

    #[test]
    fn truncated_and_malformed_datagrams_parse_to_nothing() {
        assert_eq!(parse_events(&[]), vec![]);
        assert_eq!(parse_events(&[0u8; 7]), vec![]);
        // Header promising more bytes than the datagram holds.
        let mut datagram = nlmsg(libc::RTM_NEWLINK, &ifinfo(5, UP_RUNNING));
        datagram[0..4].copy_from_slice(&1024u32.to_ne_bytes());
        assert_eq!(parse_events(&datagram), vec![]);
    }
}
