//! The forwarder
//!
//! Glues faces, channels, FIB and PIT into a packet processing
//! pipeline. Single-threaded and cooperative: the host calls
//! `process_events()` from one thread, and all table mutation happens
//! inside that call. Forwarding is byte-transparent: the original
//! element, including any LP wrapper, is what goes back out.

use crate::dataplane::channel::{Channel, TcpChannel, UdpChannel};
use crate::dataplane::face::{Face, FaceId, PollOutcome};
use crate::dataplane::fib::Fib;
use crate::dataplane::pit::Pit;
use crate::protocol::name::{self, Component};
use crate::protocol::tlv::{TYPE_DATA, TYPE_INTEREST, TYPE_LP_PACKET};
use crate::protocol::{ControlParameters, ControlResponse, Data, Interest, LpPacket, Name};
use crate::telemetry::MetricsRegistry;
use crate::transport::{internal_pair, InternalHandle, TcpTransport, Transport, UdpTransport};
use crate::{Error, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info, warn};

/// Default Interest lifetime when the packet does not carry one.
const DEFAULT_INTEREST_LIFETIME_SECS: u64 = 4;

/// Default minimum time a PIT entry is retained for nonce suppression.
const MIN_PIT_ENTRY_LIFETIME_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct ForwarderConfig {
    /// Retention window for PIT entries past their Interest timeout.
    pub min_pit_entry_lifetime: Duration,
    /// Lifetime assumed for Interests that do not specify one.
    pub default_interest_lifetime: Duration,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            min_pit_entry_lifetime: Duration::from_secs(MIN_PIT_ENTRY_LIFETIME_SECS),
            default_interest_lifetime: Duration::from_secs(DEFAULT_INTEREST_LIFETIME_SECS),
        }
    }
}

/// Host-side view of an in-flight remote prefix registration.
pub struct RegistrationHandle {
    handle: InternalHandle,
    face_id: FaceId,
}

impl RegistrationHandle {
    /// The hidden internal face carrying the registration Interest.
    pub fn face_id(&self) -> FaceId {
        self.face_id
    }

    /// The ControlResponse from the remote forwarder, once it arrives.
    pub fn try_response(&self) -> Option<ControlResponse> {
        let element = self.handle.try_recv()?;
        match Data::parse(&element).and_then(|data| ControlResponse::parse(&data.content)) {
            Ok(response) => Some(response),
            Err(e) => {
                warn!("unparseable registration response: {}", e);
                None
            }
        }
    }
}

pub struct Forwarder {
    config: ForwarderConfig,
    faces: Vec<Face>,
    channels: Vec<Channel>,
    fib: Fib,
    pit: Pit,
    next_face_id: u64,
    register_seq: u32,
    prefix_localhost: Name,
    prefix_localhop: Name,
    prefix_register: Name,
    prefix_broadcast: Name,
    metrics: Arc<MetricsRegistry>,
}

impl Forwarder {
    pub fn new(config: ForwarderConfig, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            config,
            faces: Vec::new(),
            channels: Vec::new(),
            fib: Fib::new(),
            pit: Pit::new(),
            next_face_id: 1,
            register_seq: 0,
            prefix_localhost: name::literal("/localhost"),
            prefix_localhop: name::literal("/localhop"),
            prefix_register: name::literal("/localhost/nfd/rib/register"),
            prefix_broadcast: name::literal("/ndn/broadcast"),
            metrics,
        }
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    pub fn fib(&self) -> &Fib {
        &self.fib
    }

    pub fn pit(&self) -> &Pit {
        &self.pit
    }

    // ========================================
    // Face and channel lifecycle
    // ========================================

    /// Register a face around an arbitrary transport.
    pub fn add_face(&mut self, uri: impl Into<String>, transport: Box<dyn Transport>) -> FaceId {
        let id = FaceId(self.next_face_id);
        self.next_face_id += 1;
        let uri = uri.into();

        info!("created face {}: {}", id, uri);
        self.metrics.register_face(id.0);
        self.faces.push(Face::new(id, uri, transport));
        self.metrics.set_face_count(self.faces.len());
        id
    }

    /// Connect a TCP face to a remote forwarder.
    pub fn add_tcp_face(&mut self, host: &str, port: u16) -> Result<FaceId> {
        let transport = TcpTransport::connect(host, port)?;
        Ok(self.add_face(format!("tcp://{}:{}", host, port), Box::new(transport)))
    }

    /// Connect a UDP face to a remote forwarder.
    pub fn add_udp_face(&mut self, host: &str, port: u16) -> Result<FaceId> {
        let transport = UdpTransport::connect(host, port)?;
        Ok(self.add_face(format!("udp://{}:{}", host, port), Box::new(transport)))
    }

    /// Create an in-process face and the handle to drive it.
    pub fn add_internal_face(&mut self) -> (FaceId, InternalHandle) {
        let (transport, handle) = internal_pair();
        let uri = format!("internal://{}", self.next_face_id);
        let id = self.add_face(uri, Box::new(transport));
        (id, handle)
    }

    /// Remove a face, scrubbing every FIB next hop and PIT entry that
    /// references it before the face is dropped.
    pub fn remove_face(&mut self, face: FaceId) -> bool {
        for removed in self.fib.remove_face(face) {
            info!("removed FIB entry {}", removed.to_uri());
        }
        self.metrics.set_fib_size(self.fib.len());

        self.pit.remove_in_face(face);
        self.metrics.set_pit_size(self.pit.len());

        let Some(index) = self.faces.iter().position(|f| f.id() == face) else {
            warn!("face {} not found", face);
            return false;
        };
        self.faces.remove(index);
        self.metrics.set_face_count(self.faces.len());
        info!("removed face {}", face);
        true
    }

    /// Bind a TCP listen channel; returns the bound address.
    pub fn add_tcp_channel(&mut self, addr: SocketAddr) -> Result<SocketAddr> {
        let channel = TcpChannel::bind(addr)?;
        let bound = channel.local_addr()?;
        info!("created TCP listen channel on {}", bound);
        self.channels.push(Channel::Tcp(channel));
        Ok(bound)
    }

    /// Bind a UDP listen channel; returns the bound address.
    pub fn add_udp_channel(&mut self, addr: SocketAddr) -> Result<SocketAddr> {
        let channel = UdpChannel::bind(addr)?;
        let bound = channel.local_addr()?;
        info!("created UDP listen channel on {}", bound);
        self.channels.push(Channel::Udp(channel));
        Ok(bound)
    }

    pub fn get_faces(&self) -> Vec<(FaceId, String)> {
        self.faces
            .iter()
            .map(|f| (f.id(), f.uri().to_string()))
            .collect()
    }

    pub fn get_routes(&self) -> Vec<(String, Vec<FaceId>)> {
        self.fib
            .entries()
            .iter()
            .map(|entry| {
                (
                    entry.name().to_uri(),
                    entry.next_hops().iter().map(|h| h.face).collect(),
                )
            })
            .collect()
    }

    fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.iter().find(|f| f.id() == id)
    }

    fn face_mut(&mut self, id: FaceId) -> Option<&mut Face> {
        self.faces.iter_mut().find(|f| f.id() == id)
    }

    fn find_face_by_uri(&self, uri: &str) -> Option<FaceId> {
        self.faces.iter().find(|f| f.uri() == uri).map(|f| f.id())
    }

    // ========================================
    // Routes
    // ========================================

    /// Install a route. Returns false when the face is unknown.
    pub fn add_route(&mut self, prefix: &Name, face: FaceId, cost: u32) -> bool {
        if self.face(face).is_none() {
            info!("add_route: unrecognized face {}", face);
            return false;
        }

        if self.fib.add(prefix.clone(), face, cost) {
            info!("add_route: face {} on new FIB entry {}", face, prefix.to_uri());
        } else {
            info!(
                "add_route: face {} on existing FIB entry {}",
                face,
                prefix.to_uri()
            );
        }
        self.metrics.set_fib_size(self.fib.len());
        true
    }

    /// Register `prefix` with the remote forwarder reachable through
    /// `out_face`, using a hidden in-process face whose Interests are
    /// pinned to that face. The registration Interest is unsigned;
    /// remotes that insist on signed commands will never answer, which
    /// shows up as a response that never arrives on the handle.
    pub fn remote_register_prefix(
        &mut self,
        out_face: FaceId,
        prefix: &Name,
    ) -> Result<RegistrationHandle> {
        if self.face(out_face).is_none() {
            info!("remote_register_prefix: unrecognized face {}", out_face);
            return Err(Error::FaceNotFound { id: out_face.0 });
        }

        let (face_id, handle) = self.add_internal_face();
        if let Some(face) = self.face_mut(face_id) {
            face.mark_non_local();
            face.set_out_face_id(out_face);
        }

        let params = ControlParameters::with_name(prefix.clone());
        let mut name = name::literal("/localhop/nfd/rib/register");
        name.push(Component::new(params.encode()));

        let mut interest = Interest::new(name);
        interest.lifetime = Some(self.config.default_interest_lifetime);
        interest.nonce = self.next_nonce();
        handle.send(&interest.encode());

        info!(
            "remote_register_prefix: registering {} via face {}",
            prefix.to_uri(),
            out_face
        );
        Ok(RegistrationHandle { handle, face_id })
    }

    fn next_nonce(&mut self) -> Vec<u8> {
        self.register_seq = self.register_seq.wrapping_add(1);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(0);
        (nanos ^ self.register_seq.rotate_left(16)).to_be_bytes().to_vec()
    }

    // ========================================
    // Event loop
    // ========================================

    /// One cooperative poll pass: faces in registration order, then
    /// listen channels. Returns promptly when nothing is ready.
    pub fn process_events(&mut self) -> Result<()> {
        let mut batch: Vec<(FaceId, Vec<u8>)> = Vec::new();
        let mut closed: Vec<FaceId> = Vec::new();

        for face in &mut self.faces {
            match face.poll() {
                PollOutcome::Elements(elements) => {
                    batch.extend(elements.into_iter().map(|e| (face.id(), e)));
                }
                PollOutcome::Closed => closed.push(face.id()),
            }
        }
        for face in closed {
            self.remove_face(face);
        }

        for (face, element) in batch {
            self.metrics.record_rx(face.0, element.len());
            self.on_element(face, &element);
        }

        self.poll_channels()
    }

    fn poll_channels(&mut self) -> Result<()> {
        let mut accepted = Vec::new();
        let mut datagrams = Vec::new();
        for (index, channel) in self.channels.iter_mut().enumerate() {
            match channel {
                Channel::Tcp(tcp) => accepted.extend(tcp.poll()?),
                Channel::Udp(udp) => {
                    datagrams.extend(udp.poll()?.into_iter().map(|d| (index, d)))
                }
            }
        }

        for conn in accepted {
            if self.find_face_by_uri(&conn.uri).is_some() {
                // Keep the old face; dropping the new socket closes it.
                warn!("new connection from existing face {}", conn.uri);
                continue;
            }
            match TcpTransport::from_stream(conn.stream) {
                Ok(transport) => {
                    let id = self.add_face(conn.uri.clone(), Box::new(transport));
                    debug!("created on-demand face {} for {}", id, conn.uri);
                }
                Err(e) => warn!("could not set up accepted connection {}: {}", conn.uri, e),
            }
        }

        for (index, datagram) in datagrams {
            let face = match self.find_face_by_uri(&datagram.uri) {
                Some(id) => id,
                None => {
                    let Channel::Udp(udp) = &self.channels[index] else {
                        continue;
                    };
                    let transport = udp.peer_transport(datagram.peer)?;
                    let id = self.add_face(datagram.uri.clone(), Box::new(transport));
                    debug!("created on-demand face {} for {}", id, datagram.uri);
                    id
                }
            };

            let elements = match self.face_mut(face) {
                Some(f) => f.on_receive_data(&datagram.payload),
                None => continue,
            };
            for element in elements {
                self.metrics.record_rx(face.0, element.len());
                self.on_element(face, &element);
            }
        }

        Ok(())
    }

    // ========================================
    // Packet dispatch
    // ========================================

    fn on_element(&mut self, in_face: FaceId, element: &[u8]) {
        let now = Instant::now();
        self.pit.sweep(now);
        self.metrics.set_pit_size(self.pit.len());

        if element.is_empty() {
            return;
        }

        // Peel the optional LP wrapper; the Nack decision needs the
        // header, classification needs the fragment.
        let mut nack_reason = None;
        let inner: &[u8] = if element[0] as u64 == TYPE_LP_PACKET {
            match LpPacket::parse(element) {
                Ok(lp) => {
                    nack_reason = lp.nack_reason;
                    match lp.fragment {
                        Some((start, end)) => &element[start..end],
                        None => {
                            debug!("LP packet without fragment on face {}", in_face);
                            return;
                        }
                    }
                }
                Err(e) => {
                    error!("error decoding LP packet on face {}: {}", in_face, e);
                    self.metrics.malformed_dropped.inc();
                    return;
                }
            }
        } else {
            element
        };

        if inner.is_empty() {
            self.metrics.malformed_dropped.inc();
            return;
        }

        match inner[0] as u64 {
            TYPE_INTEREST => {
                let interest = match Interest::parse(inner) {
                    Ok(interest) => interest,
                    Err(e) => {
                        error!("error decoding Interest on face {}: {}", in_face, e);
                        self.metrics.malformed_dropped.inc();
                        return;
                    }
                };
                if let Some(reason) = nack_reason {
                    // All prefixes use the multicast strategy, so a Nack
                    // must not consume the PIT entry.
                    debug!(
                        "dropped Nack on face {}, reason code {}: {}",
                        in_face, reason, interest.name
                    );
                    self.metrics.nacks_dropped.inc();
                    return;
                }
                self.metrics.interests_received.inc();
                self.handle_interest(in_face, interest, element, now);
            }
            TYPE_DATA => {
                if nack_reason.is_some() {
                    // A Nack not carrying an Interest is meaningless.
                    self.metrics.nacks_dropped.inc();
                    return;
                }
                let data = match Data::parse(inner) {
                    Ok(data) => data,
                    Err(e) => {
                        error!("error decoding Data on face {}: {}", in_face, e);
                        self.metrics.malformed_dropped.inc();
                        return;
                    }
                };
                self.metrics.data_received.inc();
                self.handle_data(in_face, &data, element);
            }
            other => {
                debug!(
                    "dropped element with unhandled TLV type {} on face {}",
                    other, in_face
                );
                self.metrics.malformed_dropped.inc();
            }
        }
    }

    fn handle_interest(
        &mut self,
        in_face: FaceId,
        interest: Interest,
        element: &[u8],
        now: Instant,
    ) {
        debug!("received Interest on face {}: {}", in_face, interest.name);

        if self.prefix_localhost.is_prefix_of(&interest.name) {
            self.on_localhost_interest(in_face, &interest);
            return;
        }

        if self.prefix_localhop.is_prefix_of(&interest.name) {
            let honoured = self.face(in_face).map(|f| !f.is_local()).unwrap_or(false);
            if !honoured {
                debug!(
                    "ignored localhop Interest from local face {}: {}",
                    in_face, interest.name
                );
                return;
            }
        }

        if self.pit.has_duplicate_nonce(&interest.nonce) {
            debug!(
                "dropped Interest with duplicate nonce on face {}: {}",
                in_face, interest.name
            );
            self.metrics.duplicate_nonce_drops.inc();
            return;
        }

        let lifetime = interest
            .lifetime
            .unwrap_or(self.config.default_interest_lifetime);
        let timeout_end = now + lifetime;
        let entry_end = now + self.config.min_pit_entry_lifetime;

        if let Some(entry) = self.pit.find_same_name_on_face(&interest.name, in_face) {
            entry.refresh(timeout_end, entry_end);
            debug!(
                "duplicate Interest on same face {}: {}",
                in_face, interest.name
            );
            return;
        }

        // A pending entry from another face means the upstream fetch is
        // already underway; the new entry routes the eventual Data to
        // this downstream, without a redundant forward.
        let pending_elsewhere = self.pit.has_same_name_pending(&interest.name);

        let name = interest.name.clone();
        self.pit.insert(interest, in_face, timeout_end, entry_end);
        self.metrics.set_pit_size(self.pit.len());
        debug!("added PIT entry for Interest: {}", name);

        if pending_elsewhere {
            debug!(
                "duplicate Interest from face {}; forwarding suppressed: {}",
                in_face, name
            );
            return;
        }

        if self.prefix_broadcast.is_prefix_of(&name) {
            let targets: Vec<FaceId> = self
                .faces
                .iter()
                .map(|f| f.id())
                .filter(|id| *id != in_face)
                .collect();
            for target in targets {
                if self.send_on_face(target, element) {
                    debug!("broadcast Interest to face {}: {}", target, name);
                    self.metrics.interests_forwarded.inc();
                }
            }
            return;
        }

        if let Some(out_face) = self.face(in_face).and_then(|f| f.out_face_id()) {
            // The registration helper pins its Interests to one face.
            if self.face(out_face).is_none() {
                info!("unrecognized pinned out face {}", out_face);
                return;
            }
            if self.send_on_face(out_face, element) {
                debug!("forwarded Interest to pinned face {}: {}", out_face, name);
                self.metrics.interests_forwarded.inc();
            }
            return;
        }

        let mut targets = self.fib.lookup(&name);
        targets.retain(|id| *id != in_face);
        if targets.is_empty() {
            debug!("no route for Interest: {}", name);
            return;
        }
        for target in targets {
            if self.send_on_face(target, element) {
                debug!("forwarded Interest to face {}: {}", target, name);
                self.metrics.interests_forwarded.inc();
            }
        }
    }

    fn handle_data(&mut self, in_face: FaceId, data: &Data, element: &[u8]) {
        debug!("received Data on face {}: {}", in_face, data.name);

        // Data strictly follows the PIT reverse path; each matching
        // entry is consumed but retained for nonce suppression.
        let mut downstreams = Vec::new();
        for entry in self.pit.match_data(data) {
            if let Some(face) = entry.in_face() {
                downstreams.push(face);
                entry.clear_in_face();
            }
        }

        if downstreams.is_empty() {
            debug!("unsolicited Data on face {}: {}", in_face, data.name);
            return;
        }

        for target in downstreams {
            if self.send_on_face(target, element) {
                debug!("forwarded Data to face {}: {}", target, data.name);
                self.metrics.data_forwarded.inc();
            }
        }
    }

    // ========================================
    // Localhost control plane
    // ========================================

    fn on_localhost_interest(&mut self, in_face: FaceId, interest: &Interest) {
        if !self.prefix_register.is_prefix_of(&interest.name) {
            info!("unrecognized localhost prefix {}", interest.name);
            return;
        }

        // The ControlParameters blob rides in the name component after
        // the command prefix.
        let Some(component) = interest.name.get(4) else {
            error!("registration Interest carries no ControlParameters: {}", interest.name);
            return;
        };
        let params = match ControlParameters::parse(component.value()) {
            Ok(params) => params,
            Err(e) => {
                error!("error decoding registration ControlParameters: {}", e);
                return;
            }
        };
        let Some(prefix) = params.name.clone() else {
            error!("registration ControlParameters carry no name");
            return;
        };

        info!("received register prefix request for {}", prefix.to_uri());

        let cost = params.cost.unwrap_or(0) as u32;
        if !self.add_route(&prefix, in_face, cost) {
            return;
        }

        let response = ControlResponse::success(params);
        let mut reply = Data::new(interest.name.clone());
        reply.content = response.encode();
        let bytes = reply.encode();
        self.send_on_face(in_face, &bytes);
    }

    /// Best-effort send: failures are logged by the face, counted here,
    /// and never propagate.
    fn send_on_face(&mut self, face: FaceId, bytes: &[u8]) -> bool {
        let metrics = self.metrics.clone();
        match self.face_mut(face) {
            Some(f) => {
                if f.send(bytes) {
                    metrics.record_tx(face.0, bytes.len());
                    true
                } else {
                    metrics.record_tx_error(face.0);
                    metrics.tx_errors.inc();
                    false
                }
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::tlv::{self, TlvWriter, TYPE_LP_FRAGMENT, TYPE_LP_NACK};

    fn make_forwarder() -> Forwarder {
        Forwarder::new(ForwarderConfig::default(), Arc::new(MetricsRegistry::new()))
    }

    fn interest_element(uri: &str, nonce: &[u8]) -> Vec<u8> {
        let mut interest = Interest::new(Name::from_uri(uri).unwrap());
        interest.nonce = nonce.to_vec();
        interest.encode()
    }

    fn data_element(uri: &str) -> Vec<u8> {
        Data::new(Name::from_uri(uri).unwrap()).encode()
    }

    #[test]
    fn test_interest_follows_route_and_data_returns() {
        let mut forwarder = make_forwarder();
        let (consumer, consumer_handle) = forwarder.add_internal_face();
        let (producer, producer_handle) = forwarder.add_internal_face();

        assert!(forwarder.add_route(&Name::from_uri("/a").unwrap(), producer, 0));

        let interest = interest_element("/a/x", &[0xAA, 0, 0, 1]);
        consumer_handle.send(&interest);
        forwarder.process_events().unwrap();

        // Forwarding is byte-identical
        assert_eq!(producer_handle.try_recv().unwrap(), interest);
        assert_eq!(forwarder.pit().len(), 1);
        let _ = consumer;

        let data = data_element("/a/x");
        producer_handle.send(&data);
        forwarder.process_events().unwrap();

        assert_eq!(consumer_handle.try_recv().unwrap(), data);
        // Consumed but retained for nonce suppression
        assert_eq!(forwarder.pit().len(), 1);
        assert!(forwarder.pit().entries()[0].in_face().is_none());
    }

    #[test]
    fn test_duplicate_nonce_dropped() {
        let mut forwarder = make_forwarder();
        let (_, a_handle) = forwarder.add_internal_face();
        let (b, b_handle) = forwarder.add_internal_face();

        forwarder.add_route(&Name::from_uri("/a").unwrap(), b, 0);

        a_handle.send(&interest_element("/a/x", &[0xAA]));
        forwarder.process_events().unwrap();
        assert!(b_handle.try_recv().is_some());

        // Same nonce looped back from B: dropped, PIT unchanged
        b_handle.send(&interest_element("/a/x", &[0xAA]));
        forwarder.process_events().unwrap();
        assert_eq!(forwarder.pit().len(), 1);
        assert_eq!(forwarder.metrics().duplicate_nonce_drops.get(), 1);
    }

    #[test]
    fn test_same_face_retransmission_refreshes_without_forward() {
        let mut forwarder = make_forwarder();
        let (_, a_handle) = forwarder.add_internal_face();
        let (b, b_handle) = forwarder.add_internal_face();

        forwarder.add_route(&Name::from_uri("/a").unwrap(), b, 0);

        a_handle.send(&interest_element("/a/x", &[1]));
        forwarder.process_events().unwrap();
        assert!(b_handle.try_recv().is_some());

        // Fresh nonce, same name, same face: timers refresh, no forward
        a_handle.send(&interest_element("/a/x", &[2]));
        forwarder.process_events().unwrap();
        assert!(b_handle.try_recv().is_none());
        assert_eq!(forwarder.pit().len(), 1);
    }

    #[test]
    fn test_duplicate_from_other_face_inserts_but_does_not_forward() {
        let mut forwarder = make_forwarder();
        let (_, a_handle) = forwarder.add_internal_face();
        let (_, c_handle) = forwarder.add_internal_face();
        let (b, b_handle) = forwarder.add_internal_face();

        forwarder.add_route(&Name::from_uri("/a").unwrap(), b, 0);

        a_handle.send(&interest_element("/a/x", &[1]));
        forwarder.process_events().unwrap();
        assert!(b_handle.try_recv().is_some());

        c_handle.send(&interest_element("/a/x", &[2]));
        forwarder.process_events().unwrap();
        // No second upstream forward, but a second PIT entry
        assert!(b_handle.try_recv().is_none());
        assert_eq!(forwarder.pit().len(), 2);

        // Data satisfies both downstream faces
        let data = data_element("/a/x");
        b_handle.send(&data);
        forwarder.process_events().unwrap();
        assert_eq!(a_handle.try_recv().unwrap(), data);
        assert_eq!(c_handle.try_recv().unwrap(), data);
    }

    #[test]
    fn test_broadcast_floods_all_but_ingress() {
        let mut forwarder = make_forwarder();
        let (_, a_handle) = forwarder.add_internal_face();
        let (_, b_handle) = forwarder.add_internal_face();
        let (_, c_handle) = forwarder.add_internal_face();

        let element = interest_element("/ndn/broadcast/hello", &[7]);
        a_handle.send(&element);
        forwarder.process_events().unwrap();

        assert_eq!(b_handle.try_recv().unwrap(), element);
        assert_eq!(c_handle.try_recv().unwrap(), element);
        assert!(a_handle.try_recv().is_none());
    }

    #[test]
    fn test_nack_dropped_without_pit_state() {
        let mut forwarder = make_forwarder();
        let (_, a_handle) = forwarder.add_internal_face();
        let (b, _) = forwarder.add_internal_face();
        forwarder.add_route(&Name::from_uri("/a").unwrap(), b, 0);

        // Interest wrapped in an LP packet carrying a Nack header
        let inner = interest_element("/a/x", &[9]);
        let mut value = TlvWriter::new();
        let mut nack = TlvWriter::new();
        nack.write_integer_tlv(tlv::TYPE_LP_NACK_REASON, 100);
        value.write_tlv(TYPE_LP_NACK, nack.as_slice());
        value.write_tlv(TYPE_LP_FRAGMENT, &inner);
        let element = tlv::wrap_tlv(TYPE_LP_PACKET, value.into_vec());

        a_handle.send(&element);
        forwarder.process_events().unwrap();

        assert_eq!(forwarder.pit().len(), 0);
        assert_eq!(forwarder.metrics().nacks_dropped.get(), 1);
    }

    #[test]
    fn test_lp_wrapped_interest_forwarded_with_wrapper() {
        let mut forwarder = make_forwarder();
        let (_, a_handle) = forwarder.add_internal_face();
        let (b, b_handle) = forwarder.add_internal_face();
        forwarder.add_route(&Name::from_uri("/a").unwrap(), b, 0);

        let inner = interest_element("/a/x", &[3]);
        let mut value = TlvWriter::new();
        value.write_tlv(TYPE_LP_FRAGMENT, &inner);
        let element = tlv::wrap_tlv(TYPE_LP_PACKET, value.into_vec());

        a_handle.send(&element);
        forwarder.process_events().unwrap();

        // The outer LP element travels unchanged
        assert_eq!(b_handle.try_recv().unwrap(), element);
    }

    #[test]
    fn test_localhost_register_installs_route_and_replies() {
        let mut forwarder = make_forwarder();
        let (a, a_handle) = forwarder.add_internal_face();

        let params = ControlParameters::with_name(Name::from_uri("/p").unwrap());
        let mut name = Name::from_uri("/localhost/nfd/rib/register").unwrap();
        name.push(Component::new(params.encode()));
        let mut interest = Interest::new(name);
        interest.nonce = vec![1, 2, 3, 4];

        a_handle.send(&interest.encode());
        forwarder.process_events().unwrap();

        let routes = forwarder.get_routes();
        assert_eq!(routes, vec![("/p".to_string(), vec![a])]);

        let reply = a_handle.try_recv().expect("control response");
        let data = Data::parse(&reply).unwrap();
        let response = ControlResponse::parse(&data.content).unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.status_text, "Success");
        assert_eq!(response.body.unwrap().name.unwrap().to_uri(), "/p");
    }

    #[test]
    fn test_unknown_localhost_command_ignored() {
        let mut forwarder = make_forwarder();
        let (_, a_handle) = forwarder.add_internal_face();

        a_handle.send(&interest_element("/localhost/nfd/faces/list", &[1]));
        forwarder.process_events().unwrap();

        assert!(a_handle.try_recv().is_none());
        assert!(forwarder.get_routes().is_empty());
        assert_eq!(forwarder.pit().len(), 0);
    }

    #[test]
    fn test_localhop_dropped_from_local_face() {
        let mut forwarder = make_forwarder();
        let (_, a_handle) = forwarder.add_internal_face();
        let (b, b_handle) = forwarder.add_internal_face();
        forwarder.add_route(&Name::from_uri("/localhop").unwrap(), b, 0);

        a_handle.send(&interest_element("/localhop/nfd/rib/register", &[5]));
        forwarder.process_events().unwrap();

        assert!(b_handle.try_recv().is_none());
        assert_eq!(forwarder.pit().len(), 0);
    }

    #[test]
    fn test_remote_register_prefix_pins_interest_to_face() {
        let mut forwarder = make_forwarder();
        let (uplink, uplink_handle) = forwarder.add_internal_face();
        let (other, other_handle) = forwarder.add_internal_face();
        let _ = other;

        let prefix = Name::from_uri("/p").unwrap();
        let registration = forwarder.remote_register_prefix(uplink, &prefix).unwrap();
        forwarder.process_events().unwrap();

        // Only the pinned face sees the registration Interest
        let element = uplink_handle.try_recv().expect("registration interest");
        assert!(other_handle.try_recv().is_none());

        let interest = Interest::parse(&element).unwrap();
        assert!(Name::from_uri("/localhop/nfd/rib/register")
            .unwrap()
            .is_prefix_of(&interest.name));
        let params =
            ControlParameters::parse(interest.name.get(4).unwrap().value()).unwrap();
        assert_eq!(params.name.unwrap(), prefix);

        // The remote's ControlResponse flows back through the PIT to
        // the hidden face
        let response = ControlResponse::success(ControlParameters::with_name(prefix));
        let mut reply = Data::new(interest.name.clone());
        reply.content = response.encode();
        uplink_handle.send(&reply.encode());
        forwarder.process_events().unwrap();

        let received = registration.try_response().expect("response");
        assert_eq!(received.status_code, 200);
    }

    #[test]
    fn test_remote_register_prefix_unknown_face() {
        let mut forwarder = make_forwarder();
        let prefix = Name::from_uri("/p").unwrap();
        assert!(forwarder
            .remote_register_prefix(FaceId(42), &prefix)
            .is_err());
    }

    #[test]
    fn test_remove_face_purges_tables() {
        let mut forwarder = make_forwarder();
        let (a, a_handle) = forwarder.add_internal_face();
        let (b, _b_handle) = forwarder.add_internal_face();

        forwarder.add_route(&Name::from_uri("/a").unwrap(), b, 0);
        a_handle.send(&interest_element("/a/x", &[1]));
        forwarder.process_events().unwrap();
        assert_eq!(forwarder.pit().len(), 1);

        assert!(forwarder.remove_face(b));

        // FIB entry is gone; A's PIT entry is unaffected
        assert!(forwarder.get_routes().is_empty());
        assert_eq!(forwarder.pit().len(), 1);
        assert_eq!(forwarder.pit().entries()[0].in_face(), Some(a));

        assert!(!forwarder.remove_face(b));
    }

    #[test]
    fn test_add_route_unknown_face() {
        let mut forwarder = make_forwarder();
        assert!(!forwarder.add_route(&Name::from_uri("/a").unwrap(), FaceId(9), 0));
        assert!(forwarder.get_routes().is_empty());
    }

    #[test]
    fn test_malformed_element_counted_and_dropped() {
        let mut forwarder = make_forwarder();
        let (_, a_handle) = forwarder.add_internal_face();

        // Valid framing, Interest type, garbage body
        a_handle.send(&tlv::wrap_tlv(TYPE_INTEREST, vec![0xFF, 0xFF]));
        forwarder.process_events().unwrap();

        assert_eq!(forwarder.metrics().malformed_dropped.get(), 1);
        assert_eq!(forwarder.pit().len(), 0);
    }
}
