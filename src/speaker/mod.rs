//! Minimal BGP speaker control plane: OPEN exchange, capability negotiation, and
//! KEEPALIVE pacing over an abstract message pipe. Framing, sockets, and scheduling
//! live outside this crate; this module only decides what to send and when.

use crate::models::*;
use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;

const DEFAULT_HOLD_TIME: u16 = 90;

fn clamp_hold_time(hold_time: u16) -> u16 {
    match hold_time {
        0 => 0,
        1 | 2 => 3,
        t => t,
    }
}

/// States of the speaker's OPEN/KEEPALIVE handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakerState {
    Idle,
    Init,
    OpenSent,
    OpenConfirm,
    Established,
}

/// Fatal, session-ending errors raised while validating a peer's OPEN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeakerError {
    AsnMismatch { expected: Asn, actual: Asn },
    IdMismatch { expected: Ipv4Addr, actual: Ipv4Addr },
    HoldTimeTooLow { expected: u16, actual: u16 },
    MissingCapability(BgpCapabilityType),
    VersionMismatch(u8),
    Negotiation { state: SpeakerState },
}

impl Display for SpeakerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SpeakerError::AsnMismatch { expected, actual } => {
                write!(f, "peer ASN {actual} does not match configured remote ASN {expected}")
            }
            SpeakerError::IdMismatch { expected, actual } => write!(
                f,
                "peer identifier {actual} does not match configured remote identifier {expected}"
            ),
            SpeakerError::HoldTimeTooLow { expected, actual } => write!(
                f,
                "peer hold time {actual} is below the configured minimum {expected}"
            ),
            SpeakerError::MissingCapability(ty) => {
                write!(f, "peer OPEN is missing required capability {ty:?}")
            }
            SpeakerError::VersionMismatch(v) => write!(f, "unsupported BGP version {v}"),
            SpeakerError::Negotiation { state } => {
                write!(f, "unexpected message in state {state:?}")
            }
        }
    }
}

impl std::error::Error for SpeakerError {}

/// Outcome of feeding a message or a clock tick to the speaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeakerEvent {
    /// A message the caller must write to the outbound pipe.
    Send(BgpMessage),
    /// The session reached ESTABLISHED.
    Established,
    /// The peer has not been heard from in `delay` seconds, exceeding the negotiated hold time.
    PeerTimeout { delay: u64 },
}

/// Configuration surface for a speaker instance -- see [`SpeakerConfig::default`] for the
/// defaults applied to every unset field.
#[derive(Debug, Clone)]
pub struct SpeakerConfig {
    /// Wait for the peer's OPEN before sending ours.
    pub passive: bool,
    /// Local ASN; `None` mirrors the peer's ASN (passive mode only).
    pub local_asn: Option<Asn>,
    /// Local hold time in seconds; `None` defaults to 90.
    pub local_hold_time: Option<u16>,
    /// Local BGP identifier; `None` uses `peer.id - 1` (passive mode only).
    pub local_id: Option<Ipv4Addr>,
    /// Capabilities merged over the built-in defaults (extended message, route refresh,
    /// MP unicast/flowspec for both address families).
    pub local_caps: Vec<Capability>,
    /// Reject the peer's OPEN unless its ASN matches.
    pub remote_asn: Option<Asn>,
    /// Reject the peer's OPEN unless its hold time is at least this value.
    pub remote_hold_time: Option<u16>,
    /// Reject the peer's OPEN unless its identifier matches.
    pub remote_id: Option<Ipv4Addr>,
    /// Reject the peer's OPEN unless every one of these capability types is present.
    pub remote_caps: Vec<BgpCapabilityType>,
}

impl Default for SpeakerConfig {
    fn default() -> Self {
        SpeakerConfig {
            passive: false,
            local_asn: None,
            local_hold_time: None,
            local_id: None,
            local_caps: Vec::new(),
            remote_asn: None,
            remote_hold_time: None,
            remote_id: None,
            remote_caps: Vec::new(),
        }
    }
}

fn default_capabilities() -> Vec<Capability> {
    vec![
        Capability {
            ty: BgpCapabilityType::BGP_EXTENDED_MESSAGE,
            value: CapabilityValue::ExtendedMessage(BgpExtendedMessageCapability::new()),
        },
        Capability {
            ty: BgpCapabilityType::ROUTE_REFRESH_CAPABILITY_FOR_BGP_4,
            value: CapabilityValue::RouteRefresh(RouteRefreshCapability::new()),
        },
        Capability {
            ty: BgpCapabilityType::MULTIPROTOCOL_EXTENSIONS_FOR_BGP_4,
            value: CapabilityValue::MultiprotocolExtensions(
                MultiprotocolExtensionsCapability::new(Afi::Ipv4, Safi::Unicast),
            ),
        },
        Capability {
            ty: BgpCapabilityType::MULTIPROTOCOL_EXTENSIONS_FOR_BGP_4,
            value: CapabilityValue::MultiprotocolExtensions(
                MultiprotocolExtensionsCapability::new(Afi::Ipv6, Safi::Unicast),
            ),
        },
        Capability {
            ty: BgpCapabilityType::MULTIPROTOCOL_EXTENSIONS_FOR_BGP_4,
            value: CapabilityValue::MultiprotocolExtensions(
                MultiprotocolExtensionsCapability::new(Afi::Ipv4, Safi::Flowspec),
            ),
        },
        Capability {
            ty: BgpCapabilityType::MULTIPROTOCOL_EXTENSIONS_FOR_BGP_4,
            value: CapabilityValue::MultiprotocolExtensions(
                MultiprotocolExtensionsCapability::new(Afi::Ipv6, Safi::Flowspec),
            ),
        },
    ]
}

fn opt_params_from_caps(caps: &[Capability]) -> Vec<OptParam> {
    caps.iter()
        .map(|cap| {
            let encoded = cap.encode();
            OptParam {
                param_type: 2,
                param_len: (encoded.len() + 2) as u16,
                param_value: ParamValue::Capability(cap.clone()),
            }
        })
        .collect()
}

fn caps_from_open(open: &BgpOpenMessage) -> Vec<Capability> {
    open.opt_params
        .iter()
        .filter_map(|p| match &p.param_value {
            ParamValue::Capability(cap) => Some(cap.clone()),
            ParamValue::Raw(_) => None,
        })
        .collect()
}

/// A single BGP session's control plane, driving the OPEN/KEEPALIVE handshake and
/// detecting remote hold-time expiry. Framing and I/O are the caller's responsibility;
/// feed received messages to [`Speaker::receive`] and flush the returned
/// [`SpeakerEvent::Send`] messages, and call [`Speaker::tick`] once per second.
#[derive(Debug)]
pub struct Speaker {
    config: SpeakerConfig,
    state: SpeakerState,
    open_sent: bool,
    local_open: Option<BgpOpenMessage>,
    peer_open: Option<BgpOpenMessage>,
    negotiated_hold_time: u16,
    negotiated_caps: CapabilitySet,
    last_local_activity: u64,
    last_peer_activity: u64,
}

impl Speaker {
    pub fn new(config: SpeakerConfig) -> Self {
        Speaker {
            config,
            state: SpeakerState::Idle,
            open_sent: false,
            local_open: None,
            peer_open: None,
            negotiated_hold_time: 0,
            negotiated_caps: CapabilitySet::new(),
            last_local_activity: 0,
            last_peer_activity: 0,
        }
    }

    pub fn state(&self) -> SpeakerState {
        self.state
    }

    /// The capability set negotiated once both sides' OPEN messages have been seen,
    /// computed per-code via [`CapabilitySet::intersect`]. Empty before `OpenConfirm`.
    pub fn negotiated_caps(&self) -> &CapabilitySet {
        &self.negotiated_caps
    }

    /// Attach the speaker to its pipe. Must be called before [`Speaker::start`] or
    /// [`Speaker::receive`].
    pub fn attach(&mut self) {
        if self.state == SpeakerState::Idle {
            self.state = SpeakerState::Init;
        }
    }

    /// Begin the active side of the handshake. A no-op in passive mode, which instead
    /// waits for the peer's OPEN.
    pub fn start(&mut self, now: u64) -> Vec<SpeakerEvent> {
        if self.state != SpeakerState::Init || self.config.passive {
            return Vec::new();
        }
        let events = self.send_local_open(None, now);
        self.state = SpeakerState::OpenSent;
        events
    }

    fn build_local_open(&self, peer: Option<&BgpOpenMessage>) -> BgpOpenMessage {
        let asn = self
            .config
            .local_asn
            .or_else(|| peer.map(|p| p.asn))
            .unwrap_or_else(|| Asn::new_16bit(0));
        let hold_time = clamp_hold_time(self.config.local_hold_time.unwrap_or(DEFAULT_HOLD_TIME));
        let sender_ip = self
            .config
            .local_id
            .or_else(|| peer.map(|p| Ipv4Addr::from(u32::from(p.sender_ip).wrapping_sub(1))))
            .unwrap_or(Ipv4Addr::UNSPECIFIED);

        let mut caps = default_capabilities();
        if asn.to_u32() > u16::MAX as u32 {
            caps.push(Capability {
                ty: BgpCapabilityType::SUPPORT_FOR_4_OCTET_AS_NUMBER_CAPABILITY,
                value: CapabilityValue::FourOctetAs(FourOctetAsCapability::new(asn.to_u32())),
            });
        }
        caps.extend(self.config.local_caps.iter().cloned());

        BgpOpenMessage {
            version: 4,
            asn,
            hold_time,
            sender_ip,
            extended_length: false,
            opt_params: opt_params_from_caps(&caps),
        }
    }

    fn send_local_open(
        &mut self,
        peer: Option<&BgpOpenMessage>,
        now: u64,
    ) -> Vec<SpeakerEvent> {
        if self.open_sent {
            return Vec::new();
        }
        let open = self.build_local_open(peer);
        self.open_sent = true;
        self.local_open = Some(open.clone());
        self.last_local_activity = now;
        vec![SpeakerEvent::Send(BgpMessage::Open(open))]
    }

    fn validate_peer_open(&self, peer: &BgpOpenMessage) -> Result<(), SpeakerError> {
        if peer.version != 4 {
            return Err(SpeakerError::VersionMismatch(peer.version));
        }
        if let Some(expected) = self.config.remote_asn {
            if peer.asn != expected {
                return Err(SpeakerError::AsnMismatch {
                    expected,
                    actual: peer.asn,
                });
            }
        }
        if let Some(expected) = self.config.remote_id {
            if peer.sender_ip != expected {
                return Err(SpeakerError::IdMismatch {
                    expected,
                    actual: peer.sender_ip,
                });
            }
        }
        if let Some(expected) = self.config.remote_hold_time {
            if peer.hold_time != 0 && peer.hold_time < expected {
                return Err(SpeakerError::HoldTimeTooLow {
                    expected,
                    actual: peer.hold_time,
                });
            }
        }
        for required in &self.config.remote_caps {
            let has = peer.opt_params.iter().any(|p| match &p.param_value {
                ParamValue::Capability(cap) => cap.ty == *required,
                ParamValue::Raw(_) => false,
            });
            if !has {
                return Err(SpeakerError::MissingCapability(*required));
            }
        }
        Ok(())
    }

    /// Feed a received message to the state machine, returning any events the caller
    /// must act on (messages to send, hold-timer expiry, establishment).
    pub fn receive(
        &mut self,
        message: BgpMessage,
        now: u64,
    ) -> Result<Vec<SpeakerEvent>, SpeakerError> {
        self.last_peer_activity = now;

        match (&self.state, &message) {
            (SpeakerState::Init, BgpMessage::Open(peer)) => {
                self.validate_peer_open(peer)?;
                self.negotiate_hold_time(peer);
                self.peer_open = Some(peer.clone());
                let mut events = self.send_local_open(Some(peer), now);
                self.negotiate_capabilities();
                events.push(SpeakerEvent::Send(BgpMessage::KeepAlive));
                self.last_local_activity = now;
                self.state = SpeakerState::OpenConfirm;
                Ok(events)
            }
            (SpeakerState::OpenSent, BgpMessage::Open(peer)) => {
                self.validate_peer_open(peer)?;
                self.negotiate_hold_time(peer);
                self.peer_open = Some(peer.clone());
                self.negotiate_capabilities();
                self.last_local_activity = now;
                self.state = SpeakerState::OpenConfirm;
                Ok(vec![SpeakerEvent::Send(BgpMessage::KeepAlive)])
            }
            (SpeakerState::OpenConfirm, BgpMessage::KeepAlive) => {
                self.state = SpeakerState::Established;
                Ok(vec![SpeakerEvent::Established])
            }
            (SpeakerState::Established, _) => Ok(Vec::new()),
            (state, BgpMessage::Notification(_)) => {
                let state = *state;
                self.state = SpeakerState::Idle;
                Err(SpeakerError::Negotiation { state })
            }
            (state, _) => Err(SpeakerError::Negotiation { state: *state }),
        }
    }

    fn negotiate_hold_time(&mut self, peer: &BgpOpenMessage) {
        let local = clamp_hold_time(self.config.local_hold_time.unwrap_or(DEFAULT_HOLD_TIME));
        let peer_hold = clamp_hold_time(peer.hold_time);
        self.negotiated_hold_time = match (local, peer_hold) {
            (0, _) | (_, 0) => 0,
            (a, b) => a.min(b),
        };
    }

    /// Builds the negotiated capability set once both OPEN messages are known, applying
    /// each capability code's own intersection rule. No-op (leaves the prior value) if
    /// either side's OPEN hasn't been recorded yet.
    fn negotiate_capabilities(&mut self) {
        let (Some(local), Some(peer)) = (&self.local_open, &self.peer_open) else {
            return;
        };
        let local_caps = caps_from_open(local);
        let peer_caps = caps_from_open(peer);
        let local_set = CapabilitySet::from_capabilities(&local_caps);
        let peer_set = CapabilitySet::from_capabilities(&peer_caps);
        self.negotiated_caps = local_set.intersect(&peer_set);
    }

    /// Advance the session clock by one tick (the caller arranges for this to be
    /// called roughly once per second). Emits a KEEPALIVE when a third of the hold
    /// time has passed since the last message we sent, and a [`SpeakerEvent::PeerTimeout`]
    /// if the peer has been silent longer than the negotiated hold time.
    pub fn tick(&mut self, now: u64) -> Vec<SpeakerEvent> {
        if self.state != SpeakerState::Established || self.negotiated_hold_time == 0 {
            return Vec::new();
        }
        let hold = self.negotiated_hold_time as u64;
        let mut events = Vec::new();

        if now.saturating_sub(self.last_local_activity) >= hold / 3 {
            self.last_local_activity = now;
            events.push(SpeakerEvent::Send(BgpMessage::KeepAlive));
        }

        let silence = now.saturating_sub(self.last_peer_activity);
        if silence > hold {
            events.push(SpeakerEvent::PeerTimeout { delay: silence });
        }

        events
    }
}
