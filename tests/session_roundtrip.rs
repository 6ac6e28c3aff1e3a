//! End-to-end coverage that doesn't fit neatly inside a single module: a full
//! OPEN/KEEPALIVE handshake driven through [`Speaker`], and an UPDATE message
//! carrying a handful of attributes round-tripped through the wire codec.

use bgp_speaker::models::*;
use bgp_speaker::parser::{encode_bgp_message, parse_bgp_message};
use bgp_speaker::{Speaker, SpeakerConfig, SpeakerEvent, SpeakerState};

fn peer_open(asn: u32, hold_time: u16, id: &str) -> BgpOpenMessage {
    BgpOpenMessage {
        version: 4,
        asn: Asn::from(asn),
        hold_time,
        sender_ip: id.parse().unwrap(),
        extended_length: false,
        opt_params: Vec::new(),
    }
}

/// Active speaker reaches ESTABLISHED and its outgoing OPEN round-trips through the
/// wire codec exactly as the peer would receive it.
#[test]
fn active_speaker_handshake_open_round_trips_on_the_wire() {
    let mut speaker = Speaker::new(SpeakerConfig {
        local_asn: Some(Asn::from(65000)),
        local_id: Some("192.0.2.1".parse().unwrap()),
        local_hold_time: Some(180),
        ..Default::default()
    });

    speaker.attach();
    let events = speaker.start(0);
    let sent_open = match &events[0] {
        SpeakerEvent::Send(BgpMessage::Open(open)) => open.clone(),
        other => panic!("expected an OPEN to send, got {other:?}"),
    };

    let wire = encode_bgp_message(&BgpMessage::Open(sent_open.clone()), AsnLength::Bits16, false);
    let decoded = parse_bgp_message(wire, false, &AsnLength::Bits16, false).unwrap();
    assert_eq!(decoded, BgpMessage::Open(sent_open));

    let events = speaker
        .receive(BgpMessage::Open(peer_open(65001, 90, "192.0.2.2")), 1)
        .unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, SpeakerEvent::Send(BgpMessage::KeepAlive))));
    assert_eq!(speaker.state(), SpeakerState::OpenConfirm);

    let events = speaker.receive(BgpMessage::KeepAlive, 1).unwrap();
    assert_eq!(events, vec![SpeakerEvent::Established]);
    assert_eq!(speaker.state(), SpeakerState::Established);
}

/// A realistic IPv4 unicast UPDATE -- ORIGIN, AS_PATH, NEXT_HOP, one announced prefix,
/// one withdrawal -- survives an encode/decode round trip with 2-octet ASNs.
#[test]
fn update_message_with_attributes_round_trips() {
    let as_path = AsPath::from_sequence([65000u32, 65001u32]);

    let attributes: Attributes = vec![
        AttributeValue::Origin(Origin::IGP),
        AttributeValue::AsPath {
            path: as_path,
            is_as4: false,
        },
        AttributeValue::NextHop("192.0.2.1".parse().unwrap()),
        AttributeValue::LocalPreference(100),
    ]
    .into_iter()
    .collect();

    let msg = BgpMessage::Update(BgpUpdateMessage {
        withdrawn_prefixes: vec!["198.51.100.0/24".parse().unwrap()],
        attributes,
        announced_prefixes: vec!["203.0.113.0/24".parse().unwrap()],
    });

    let wire = encode_bgp_message(&msg, AsnLength::Bits16, false);
    let decoded = parse_bgp_message(wire, false, &AsnLength::Bits16, false).unwrap();
    assert_eq!(decoded, msg);

    let BgpMessage::Update(update) = decoded else {
        panic!("expected an UPDATE message");
    };
    assert_eq!(update.attributes.as_path().unwrap().route_len(), 2);
    assert_eq!(
        update.attributes.as_path().unwrap().get_singular_origin(),
        Some(Asn::new_16bit(65001))
    );
    assert!(!update.attributes.has_validation_warnings());
}

/// A passive speaker never initiates, but reaches ESTABLISHED on the same peer OPEN +
/// KEEPALIVE sequence, sending its own OPEN and KEEPALIVE together.
#[test]
fn passive_speaker_establishes_from_peer_open() {
    let mut speaker = Speaker::new(SpeakerConfig {
        passive: true,
        remote_asn: Some(Asn::from(65010)),
        ..Default::default()
    });
    speaker.attach();
    assert!(speaker.start(0).is_empty());

    let events = speaker
        .receive(BgpMessage::Open(peer_open(65010, 60, "192.0.2.9")), 0)
        .unwrap();
    assert_eq!(events.len(), 2);

    let events = speaker.receive(BgpMessage::KeepAlive, 0).unwrap();
    assert_eq!(events, vec![SpeakerEvent::Established]);
    assert_eq!(speaker.state(), SpeakerState::Established);
}
