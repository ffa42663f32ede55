use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of characters in a receive address.
pub const ADDRESS_LENGTH: usize = 81;

/// Characters an address may contain.
pub const TRYTE_ALPHABET: &[u8; 27] = b"9ABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address must be 81 characters, got {0}")]
    InvalidLength(usize),
    #[error("invalid character {character:?} at position {position}")]
    InvalidCharacter { position: usize, character: char },
}

/// A receive address as handed out by a seed store. Immutable once parsed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        let len = raw.chars().count();
        if len != ADDRESS_LENGTH {
            return Err(AddressError::InvalidLength(len));
        }
        if let Some((position, character)) = raw
            .chars()
            .enumerate()
            .find(|(_, c)| !c.is_ascii() || !TRYTE_ALPHABET.contains(&(*c as u8)))
        {
            return Err(AddressError::InvalidCharacter {
                position,
                character,
            });
        }
        Ok(Self(raw.to_string()))
    }

    /// Build an address from raw bytes, folding each byte into the tryte alphabet.
    pub fn from_bytes(bytes: &[u8; ADDRESS_LENGTH]) -> Self {
        let s = bytes
            .iter()
            .map(|b| TRYTE_ALPHABET[(*b as usize) % TRYTE_ALPHABET.len()] as char)
            .collect();
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Address characters in display order. Always `ADDRESS_LENGTH` long.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

/// One derived address of an account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub index: u32,
    pub address: Address,
    /// Set once funds have left this address. A spent address fails validation.
    #[serde(default)]
    pub spent: bool,
}

impl AddressRecord {
    pub fn new(index: u32, address: Address) -> Self {
        Self {
            index,
            address,
            spent: false,
        }
    }
}
