//! Room codes and participant identity tokens.
//!
//! Both types cross the wire as strings: room codes as their six symbols,
//! participant identities as sixteen hex digits. The numeric representations
//! stay server-side.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// Error parsing a room code from a string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodeParseError {
    /// The input was not exactly [`RoomCode::LEN`] symbols.
    #[error("room code must be {expected} symbols, got {0}", expected = RoomCode::LEN)]
    Length(usize),

    /// The input contained a symbol outside the code alphabet.
    #[error("room code contains invalid symbol {0:?}")]
    Symbol(char),
}

/// Error parsing a participant identity from a string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("participant identity must be 16 hex digits")]
pub struct IdentityParseError;

/// A short human-shareable session code.
///
/// Six symbols drawn from [`RoomCode::ALPHABET`], which excludes the
/// visually confusable `0`/`O` and `1`/`I`. Parsing normalizes lowercase
/// input, so codes survive being read aloud or retyped.
///
/// # Invariants
///
/// Every byte of the internal array is a member of the alphabet. All
/// constructors enforce this; the type is immutable once built.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomCode([u8; Self::LEN]);

impl RoomCode {
    /// Number of symbols in a code.
    pub const LEN: usize = 6;

    /// The code alphabet: digits and uppercase letters minus `0`, `O`,
    /// `1`, and `I`.
    ///
    /// The alphabet size is a power of two, so reducing a uniform random
    /// byte modulo the length introduces no bias.
    pub const ALPHABET: &'static [u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

    /// Build a code from raw entropy, one byte per symbol.
    ///
    /// Each byte is reduced onto the alphabet; the mapping is uniform
    /// because the alphabet length divides 256 exactly.
    pub fn from_entropy(entropy: [u8; Self::LEN]) -> Self {
        let mut symbols = [0u8; Self::LEN];
        for (symbol, byte) in symbols.iter_mut().zip(entropy) {
            *symbol = Self::ALPHABET[usize::from(byte) % Self::ALPHABET.len()];
        }
        Self(symbols)
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        // Invariant: all bytes come from the ASCII alphabet.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoomCode({})", self.as_str())
    }
}

impl FromStr for RoomCode {
    type Err = CodeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.chars().count() != Self::LEN {
            return Err(CodeParseError::Length(s.chars().count()));
        }

        let mut symbols = [0u8; Self::LEN];
        for (symbol, c) in symbols.iter_mut().zip(s.chars()) {
            let upper = c.to_ascii_uppercase();
            if !upper.is_ascii() || !Self::ALPHABET.contains(&(upper as u8)) {
                return Err(CodeParseError::Symbol(c));
            }
            *symbol = upper as u8;
        }
        Ok(Self(symbols))
    }
}

impl Serialize for RoomCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RoomCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// A connection-scoped participant identity token.
///
/// Minted by the relay when a connection registers (host-create or join)
/// and never reused while live. Crosses the wire as 16 hex digits so
/// JSON consumers are not exposed to 64-bit integer precision issues.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId(u64);

impl ParticipantId {
    /// Build an identity from raw entropy.
    pub fn from_entropy(entropy: [u8; 8]) -> Self {
        Self(u64::from_be_bytes(entropy))
    }

    /// The raw token value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for ParticipantId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl fmt::Debug for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParticipantId({:016x})", self.0)
    }
}

impl FromStr for ParticipantId {
    type Err = IdentityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 16 {
            return Err(IdentityParseError);
        }
        u64::from_str_radix(s, 16).map(Self).map_err(|_| IdentityParseError)
    }
}

impl Serialize for ParticipantId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ParticipantId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
