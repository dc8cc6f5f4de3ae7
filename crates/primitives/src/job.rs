use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::validation::ValidationError;

/// Joins the card id and the wallet address in a serial number.
pub const SEPARATOR: char = '-';

/// Merchant card identifier (the card slug issued by the wallet-pass service).
///
/// Must not contain [`SEPARATOR`], otherwise the serial number could not be
/// split back into its parts.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CardId(String);

impl CardId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CardId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Missing("cardId"));
        }
        if s.contains(SEPARATOR) {
            return Err(ValidationError::CardIdSeparator(s.to_owned()));
        }
        Ok(Self(s.to_owned()))
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// `0x`-prefixed, 20 byte hex wallet address. Case is preserved so the
/// serial number matches what the wallet displays.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EthAddress(String);

impl EthAddress {
    const HEX_LEN: usize = 40;

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for EthAddress {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Missing("ethAddress"));
        }
        let valid = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .is_some_and(|hex| {
                hex.len() == Self::HEX_LEN && hex.chars().all(|c| c.is_ascii_hexdigit())
            });
        if !valid {
            return Err(ValidationError::InvalidEthAddress(s.to_owned()));
        }
        Ok(Self(s.to_owned()))
    }
}

impl fmt::Display for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Identifies one claim: `cardId-ethAddress`.
///
/// Doubles as the pass serial number and as the notification channel key.
/// Re-claiming the same card with the same wallet yields the same id.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ExternalId {
    card_id: CardId,
    eth_address: EthAddress,
}

impl ExternalId {
    #[must_use]
    pub const fn new(card_id: CardId, eth_address: EthAddress) -> Self {
        Self {
            card_id,
            eth_address,
        }
    }

    pub fn from_parts(card_id: &str, eth_address: &str) -> Result<Self, ValidationError> {
        Ok(Self::new(card_id.parse()?, eth_address.parse()?))
    }

    #[must_use]
    pub const fn card_id(&self) -> &CardId {
        &self.card_id
    }

    #[must_use]
    pub const fn eth_address(&self) -> &EthAddress {
        &self.eth_address
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.card_id, self.eth_address)
    }
}

impl FromStr for ExternalId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((card_id, eth_address)) = s.split_once(SEPARATOR) else {
            return Err(ValidationError::InvalidSerialNumber(s.to_owned()));
        };
        Self::from_parts(card_id, eth_address)
            .map_err(|_| ValidationError::InvalidSerialNumber(s.to_owned()))
    }
}

impl Serialize for ExternalId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ExternalId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// What a serial number tells about the pass holder, in a campaign context.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PassDetails {
    pub card_id: CardId,
    pub eth_address: EthAddress,
    pub campaign: String,
}

/// Splits a serial number on the first separator.
pub fn parse_serial_number(serial_number: &str, campaign: &str) -> Result<PassDetails, ValidationError> {
    let id: ExternalId = serial_number.parse()?;
    let ExternalId {
        card_id,
        eth_address,
    } = id;

    Ok(PassDetails {
        card_id,
        eth_address,
        campaign: campaign.to_owned(),
    })
}
