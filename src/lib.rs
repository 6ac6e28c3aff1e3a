/*!
A BGP-4 (RFC 4271) message-handling library: a wire-format codec and in-memory object
model for the Border Gateway Protocol, covering capability negotiation, path attributes,
multi-protocol extensions, ADD_PATH, Flowspec, extended communities, and a minimal
protocol state machine for a BGP speaker's OPEN exchange and KEEPALIVE pacing.

# Examples

Parsing a single BGP UPDATE message out of a byte buffer:

```no_run
use bytes::Bytes;
use bgp_speaker::models::AsnLength;
use bgp_speaker::parser::parse_bgp_message;

let data: Bytes = unimplemented!();
let message = parse_bgp_message(data, false, &AsnLength::Bits32, false).unwrap();
println!("{:?}", message);
```

# RFC coverage

## Core

- [X] [RFC 4271](https://datatracker.ietf.org/doc/html/rfc4271): A Border Gateway Protocol 4 (BGP-4)
- [X] [RFC 4760](https://datatracker.ietf.org/doc/html/rfc4760): Multiprotocol Extensions for BGP-4
- [X] [RFC 6793](https://datatracker.ietf.org/doc/html/rfc6793): BGP Support for Four-Octet AS Number Space
- [X] [RFC 7606](https://datatracker.ietf.org/doc/html/rfc7606): Revised Error Handling for BGP UPDATE Messages
- [X] [RFC 7911](https://datatracker.ietf.org/doc/html/rfc7911): Advertisement of Multiple Paths in BGP (ADD_PATH)
- [X] [RFC 9072](https://datatracker.ietf.org/doc/html/rfc9072): Extended Optional Parameters Length for BGP OPEN Message
- [X] [RFC 2918](https://datatracker.ietf.org/doc/html/rfc2918): Route Refresh Capability for BGP-4
- [X] [RFC 8950](https://datatracker.ietf.org/doc/html/rfc8950): Advertising IPv4 NLRI with an IPv6 Next Hop
- [X] [RFC 9234](https://datatracker.ietf.org/doc/html/rfc9234): Route Leak Prevention and Detection Using Roles
- [X] [RFC 5492](https://datatracker.ietf.org/doc/html/rfc5492): Capabilities Advertisement with BGP-4
- [ ] [RFC 4724](https://datatracker.ietf.org/doc/html/rfc4724): Graceful Restart Mechanism for BGP (capability signalling only)

## Communities

- [X] [RFC 1997](https://datatracker.ietf.org/doc/html/rfc1997): BGP Communities Attribute
- [X] [RFC 4360](https://datatracker.ietf.org/doc/html/rfc4360): BGP Extended Communities Attribute
- [X] [RFC 5668](https://datatracker.ietf.org/doc/html/rfc5668): 4-Octet AS Specific BGP Extended Community
- [X] [RFC 5701](https://datatracker.ietf.org/doc/html/rfc5701): IPv6 Address Specific BGP Extended Community Attribute
- [X] [RFC 8092](https://datatracker.ietf.org/doc/html/rfc8092): BGP Large Communities

## FlowSpec

- [X] [RFC 8955](https://datatracker.ietf.org/doc/html/rfc8955): Dissemination of Flow Specification Rules
- [X] [RFC 8956](https://datatracker.ietf.org/doc/html/rfc8956): Dissemination of Flow Specification Rules for IPv6

## Link-State

- [X] [RFC 7752](https://datatracker.ietf.org/doc/html/rfc7752): North-Bound Distribution of Link-State and Traffic Engineering (TE) Information Using BGP

Out of scope: MRT/BMP archive formats, RIB storage, route selection, and the byte
pipeline (framing, sockets) a caller wires the codec into -- see [`speaker`] for the
abstraction boundary used there.
*/

pub mod error;
pub mod models;
#[cfg(feature = "parser")]
pub mod parser;
#[cfg(feature = "parser")]
pub mod speaker;

pub use error::ParserError;
#[cfg(feature = "parser")]
pub use speaker::{Speaker, SpeakerConfig, SpeakerEvent, SpeakerState};
