use rand::rngs::OsRng;
use rand::RngCore;

use crate::api::BeaconError;

/// A per-visitor token: 16 random bytes, hex-encoded. Stored in the `cid`
/// cookie and forwarded to the collector to attribute sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientId(String);

impl ClientId {
    /// Generate a fresh identifier from the OS entropy source.
    ///
    /// The two byte masks predate this implementation and do not match the
    /// RFC 4122 version/variant layout. They are kept so freshly issued
    /// values stay byte-for-byte compatible with cookies already in the
    /// wild, nothing more.
    pub fn generate() -> Result<ClientId, BeaconError> {
        let mut bytes = [0u8; 16];
        OsRng.try_fill_bytes(&mut bytes)?;

        bytes[8] = (bytes[8] | 0x80) & 0xBF;
        bytes[6] = (bytes[6] | 0x40) & 0x4F;

        Ok(ClientId(hex::encode(bytes)))
    }

    /// Wrap a value read back from a request cookie. Opaque, never validated.
    pub fn from_cookie(value: String) -> ClientId {
        ClientId(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
