//! BGP error code module that maintains explicit error codes assigned by IANA.
//!
//! The full list of IANA error code assignments for BGP can be viewed at here:
//! <https://www.iana.org/assignments/bgp-parameters/bgp-parameters.xhtml#bgp-parameters-3>.
use log::warn;
use num_enum::{FromPrimitive, IntoPrimitive};

#[derive(Copy, Clone, Debug, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum BgpErrorCode {
    Reserved = 0,
    MessageHeaderError = 1,
    OpenError = 2,
    UpdateError = 3,
    HoldTimerExpired = 4,
    FiniteStateMachineError = 5,
    CeaseNotification = 6,
    RouteFreshError = 7,
    #[num_enum(catch_all)]
    Unknown(u8),
}

/// BGP Error Subcode enum.
///
/// <https://www.iana.org/assignments/bgp-parameters/bgp-parameters.xhtml#bgp-parameters-4>
#[allow(non_camel_case_types)]
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BgpError {
    /// Includes subcode. Currently, no subcodes have been assigned.
    Reserved(u8),
    MessageHeaderError(MessageHeaderError),
    OpenError(OpenError),
    UpdateError(UpdateError),
    /// Includes subcode. Currently, no subcodes have been assigned.
    HoldTimerExpired(u8),
    FiniteStateMachineError(FiniteStateMachineError),
    CeaseNotification(CeaseNotification),
    RouteFreshError(RouteRefreshError),
    Unknown(u8, u8),
}

impl BgpError {
    pub fn new(code: u8, subcode: u8) -> Self {
        match BgpErrorCode::from(code) {
            BgpErrorCode::Reserved => BgpError::Reserved(subcode),
            BgpErrorCode::MessageHeaderError => {
                BgpError::MessageHeaderError(MessageHeaderError::from(subcode))
            }
            BgpErrorCode::OpenError => BgpError::OpenError(OpenError::from(subcode)),
            BgpErrorCode::UpdateError => BgpError::UpdateError(UpdateError::from(subcode)),
            BgpErrorCode::HoldTimerExpired => BgpError::HoldTimerExpired(subcode),
            BgpErrorCode::FiniteStateMachineError => {
                BgpError::FiniteStateMachineError(FiniteStateMachineError::from(subcode))
            }
            BgpErrorCode::CeaseNotification => {
                BgpError::CeaseNotification(CeaseNotification::from(subcode))
            }
            BgpErrorCode::RouteFreshError => {
                BgpError::RouteFreshError(RouteRefreshError::from(subcode))
            }
            BgpErrorCode::Unknown(_) => {
                warn!(
                    "error parsing BGP notification error code: {}, subcode: {}",
                    code, subcode
                );
                BgpError::Unknown(code, subcode)
            }
        }
    }

    pub fn to_codes(&self) -> (u8, u8) {
        match self {
            BgpError::Reserved(sub) => (BgpErrorCode::Reserved.into(), *sub),
            BgpError::MessageHeaderError(sub) => {
                (BgpErrorCode::MessageHeaderError.into(), (*sub).into())
            }
            BgpError::OpenError(sub) => (BgpErrorCode::OpenError.into(), (*sub).into()),
            BgpError::UpdateError(sub) => (BgpErrorCode::UpdateError.into(), (*sub).into()),
            BgpError::HoldTimerExpired(sub) => (BgpErrorCode::HoldTimerExpired.into(), *sub),
            BgpError::FiniteStateMachineError(sub) => {
                (BgpErrorCode::FiniteStateMachineError.into(), (*sub).into())
            }
            BgpError::CeaseNotification(sub) => {
                (BgpErrorCode::CeaseNotification.into(), (*sub).into())
            }
            BgpError::RouteFreshError(sub) => (BgpErrorCode::RouteFreshError.into(), (*sub).into()),
            BgpError::Unknown(code, sub) => (*code, *sub),
        }
    }
}

/// Message Header Error subcodes
///
/// <https://www.iana.org/assignments/bgp-parameters/bgp-parameters.xhtml#bgp-parameters-5>
///
/// *See source code for number assignment*
#[allow(non_camel_case_types)]
#[derive(Debug, FromPrimitive, IntoPrimitive, PartialEq, Eq, Hash, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum MessageHeaderError {
    UNSPECIFIC = 0,
    CONNECTION_NOT_SYNCHRONIZED = 1,
    BAD_MESSAGE_LENGTH = 2,
    BAD_MESSAGE_TYPE = 3,
    // 4 - 255: unassigned
    #[num_enum(catch_all)]
    Unknown(u8),
}

/// OPEN Message Error subcodes
///
/// <https://www.iana.org/assignments/bgp-parameters/bgp-parameters.xhtml#bgp-parameters-6>
///
/// *See source code for number assignment*
#[allow(non_camel_case_types)]
#[derive(Debug, FromPrimitive, IntoPrimitive, PartialEq, Eq, Hash, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum OpenError {
    UNSPECIFIC = 0,
    UNSUPPORTED_VERSION_NUMBER = 1,
    BAD_PEER_AS = 2,
    BAD_BGP_IDENTIFIER = 3,
    UNSUPPORTED_OPTIONAL_PARAMETER = 4,
    // 5 -- deprecated
    UNACCEPTABLE_HOLD_TIME = 6,
    UNSUPPORTED_CAPACITY = 7,
    // 8 -- deprecated
    // 9 -- deprecated
    // 10 -- deprecated
    ROLE_MISMATCH = 11,
    // 12 - 255: unassinged
    #[num_enum(catch_all)]
    Unknown(u8),
}

impl OpenError {
    pub const fn is_deprecated(&self) -> bool {
        matches!(self, OpenError::Unknown(5 | 8 | 9 | 10))
    }
}

/// UPDATE Message Error subcodes
///
/// <https://www.iana.org/assignments/bgp-parameters/bgp-parameters.xhtml#bgp-finite-state-machine-error-subcodes>
///
/// *See source code for number assignment*
#[allow(non_camel_case_types)]
#[derive(Debug, FromPrimitive, IntoPrimitive, PartialEq, Eq, Hash, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum UpdateError {
    UNSPECIFIC = 0,
    MALFORMED_ATTRIBUTE_LIST = 1,
    UNRECOGNIZED_WELL_KNOWN_ATTRIBUTE = 2,
    MISSING_WELL_KNOWN_ATTRIBUTE = 3,
    ATTRIBUTE_FLAGS_ERROR = 4,
    ATTRIBUTE_LENGTH_ERROR = 5,
    INVALID_ORIGIN_ERROR = 6,
    // 7 - deprecated
    INVALID_NEXT_HOP_ATTRIBUTE = 8,
    OPTIONAL_ATTRIBUTE_ERROR = 9,
    INVALID_NETWORK_FIELD = 10,
    MALFORMED_AS_PATH = 11,
    // 12 - 255: unassigned
    #[num_enum(catch_all)]
    Unknown(u8),
}

impl UpdateError {
    pub const fn is_deprecated(&self) -> bool {
        matches!(self, UpdateError::Unknown(7))
    }
}

/// BGP Finite State Machine Error Subcodes
///
/// <https://www.iana.org/assignments/bgp-parameters/bgp-parameters.xhtml#bgp-finite-state-machine-error-subcodes>
///
/// *See source code for number assignment*
#[allow(non_camel_case_types)]
#[derive(Debug, FromPrimitive, IntoPrimitive, PartialEq, Eq, Hash, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum FiniteStateMachineError {
    UNSPECIFIED = 0,
    RECEIVE_UNEXPECTED_MESSAGE_IN_OPENSENT_State = 1,
    RECEIVE_UNEXPECTED_MESSAGE_IN_OPENCONFIRM_STATE = 2,
    RECEIVE_UNEXPECTED_MESSAGE_IN_ESTABLISHED_STATE = 3,
    // 4 - 255: unassigned
    #[num_enum(catch_all)]
    Unknown(u8),
}

/// BGP Cease NOTIFICATION message subcodes
///
/// <https://www.iana.org/assignments/bgp-parameters/bgp-parameters.xhtml#bgp-parameters-8>
///
/// *See source code for number assignment*
#[allow(non_camel_case_types)]
#[derive(Debug, FromPrimitive, IntoPrimitive, PartialEq, Eq, Hash, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum CeaseNotification {
    RESERVED = 0,
    MAXIMUM_NUMBER_OF_PREFIXES_REACHED = 1,
    ADMINISTRATIVE_SHUTDOWN = 2,
    PEER_DE_CONFIGURED = 3,
    ADMINISTRATIVE_RESET = 4,
    CONNECTION_REJECTED = 5,
    OTHER_CONFIGURATION_CHANGE = 6,
    CONNECTION_COLLISION_RESOLUTION = 7,
    OUT_OF_RESOURCES = 8,
    HARD_RESET = 9,
    BFD_DOWN = 10, // TEMPORARY - registered 2022-02-23, expires 2023-02-23
    // 11 - 255: unassigned
    #[num_enum(catch_all)]
    Unknown(u8),
}

/// BGP ROUTE-REFRESH Message Error subcodes
///
/// <https://www.iana.org/assignments/bgp-parameters/bgp-parameters.xhtml#route-refresh-error-subcodes>
///
/// *See source code for number assignment*
#[allow(non_camel_case_types)]
#[derive(Debug, FromPrimitive, IntoPrimitive, PartialEq, Eq, Hash, Copy, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum RouteRefreshError {
    RESERVED = 0,
    INVALID_MESSAGE_LENGTH = 1,
    // 2 - 255: unassigned
    #[num_enum(catch_all)]
    Unknown(u8),
}
