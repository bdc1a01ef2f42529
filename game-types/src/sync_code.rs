use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::SyncCodeError;

/// Characters used when minting codes. `0`, `O`, `1` and `I` are left out
/// so a code read aloud or copied by hand cannot be mistyped between them.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Characters on each side of the dash.
pub const CODE_HALF_LENGTH: usize = 4;

/// A shareable `XXXX-XXXX` code addressing one remote sync record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(try_from = "String", into = "String")]
#[ts(export)]
pub struct SyncCode(String);

impl SyncCode {
    /// Validates the `XXXX-YYYY` shape and normalises to upper case.
    ///
    /// Only the shape is checked here; whether the code exists is the
    /// remote store's call.
    pub fn parse(raw: &str) -> Result<Self, SyncCodeError> {
        let code = raw.trim().to_ascii_uppercase();
        let bytes = code.as_bytes();

        let well_formed = bytes.len() == CODE_HALF_LENGTH * 2 + 1
            && bytes[CODE_HALF_LENGTH] == b'-'
            && bytes
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != CODE_HALF_LENGTH)
                .all(|(_, b)| b.is_ascii_alphanumeric());

        if well_formed {
            Ok(Self(code))
        } else {
            Err(SyncCodeError::InvalidFormat {
                code: raw.to_string(),
            })
        }
    }

    /// Builds a code from alphabet indices, wrapping out-of-range values.
    pub fn from_indices(indices: [usize; CODE_HALF_LENGTH * 2]) -> Self {
        let mut code = String::with_capacity(CODE_HALF_LENGTH * 2 + 1);
        for (i, index) in indices.iter().enumerate() {
            if i == CODE_HALF_LENGTH {
                code.push('-');
            }
            code.push(CODE_ALPHABET[index % CODE_ALPHABET.len()] as char);
        }
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SyncCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SyncCode {
    type Err = SyncCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SyncCode {
    type Error = SyncCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SyncCode> for String {
    fn from(code: SyncCode) -> Self {
        code.0
    }
}
