//! Save-state serialization (§4.8 of the top level spec): a small
//! per-component trait plus the header/compression envelope used to
//! assemble every component's state into one portable snapshot.

use std::io::Cursor;

use dmg_codec::zippy::{decode_zippy, encode_zippy};
use dmg_common::data::{read_bytes, read_u32, write_bytes, write_u32};

use crate::error::Error;

/// Selects an encoding variant for a component's `state`/`set_state` call.
/// Only one encoding exists today, so every call site passes `None` and
/// gets it; the parameter exists so a future format can be threaded through
/// without changing every implementor's signature.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum StateFormat {
    #[default]
    Default,
}

/// A component that can serialize its live state as an opaque byte blob and
/// later restore it. The top-level save/load path concatenates each
/// component's blob, in a fixed order, into the full snapshot payload
/// handed to [`encode_state`]/[`decode_state`].
pub trait StateComponent {
    fn state(&self, format: Option<StateFormat>) -> Result<Vec<u8>, Error>;
    fn set_state(&mut self, data: &[u8], format: Option<StateFormat>) -> Result<(), Error>;
}

/// Magic header value ("GBSS" read little-endian as 4 ASCII bytes).
const MAGIC: u32 = 0x5353_4247;
const VERSION: u32 = 1;

/// Wraps an already-assembled, ordered component payload in the on-disk
/// GBSS envelope: a fixed-size header followed by a zippy-compressed body.
pub fn encode_state(payload: &[u8]) -> Result<Vec<u8>, Error> {
    let compressed = encode_zippy(payload)?;
    let mut cursor = Cursor::new(Vec::new());
    write_u32(&mut cursor, MAGIC)?;
    write_u32(&mut cursor, VERSION)?;
    write_u32(&mut cursor, payload.len() as u32)?;
    write_u32(&mut cursor, compressed.len() as u32)?;
    write_bytes(&mut cursor, &compressed)?;
    Ok(cursor.into_inner())
}

/// Validates the GBSS header and decompresses the body back into the
/// ordered component payload, without touching any live component — a
/// malformed blob is rejected before anything is mutated.
pub fn decode_state(data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut cursor = Cursor::new(data);
    let magic = read_u32(&mut cursor)?;
    if magic != MAGIC {
        return Err(Error::SaveStateFormat(format!(
            "bad save-state magic 0x{:08x}",
            magic
        )));
    }
    let version = read_u32(&mut cursor)?;
    if version != VERSION {
        return Err(Error::SaveStateFormat(format!(
            "unsupported save-state version {}",
            version
        )));
    }
    let uncompressed_size = read_u32(&mut cursor)? as usize;
    let compressed_size = read_u32(&mut cursor)? as usize;
    let compressed = read_bytes(&mut cursor, compressed_size)?;
    let payload = decode_zippy(&compressed)?;
    if payload.len() != uncompressed_size {
        return Err(Error::SaveStateFormat(
            "save-state uncompressed size mismatch".into(),
        ));
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_roundtrip() {
        let payload: Vec<u8> = (0..=255u8).cycle().take(2048).collect();
        let encoded = encode_state(&payload).unwrap();
        let decoded = decode_state(&encoded).unwrap();
        assert_eq!(payload, decoded);
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut data = encode_state(&[1, 2, 3]).unwrap();
        data[0] ^= 0xff;
        assert!(decode_state(&data).is_err());
    }

    #[test]
    fn test_rejects_truncated_header() {
        assert!(decode_state(&[0, 1, 2]).is_err());
    }
}
