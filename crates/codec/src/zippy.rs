//! Composed lossless codec (RLE then Huffman) used to compress the
//! save-state payload of [§4.8] — any reachable core state must survive a
//! round trip through this codec unchanged.

use dmg_common::error::Error;

use crate::{
    huffman::{decode_huffman, encode_huffman},
    rle::{decode_rle, encode_rle},
};

pub fn encode_zippy(data: &[u8]) -> Result<Vec<u8>, Error> {
    encode_huffman(&encode_rle(data)?)
}

pub fn decode_zippy(data: &[u8]) -> Result<Vec<u8>, Error> {
    decode_rle(&decode_huffman(data)?)
}

#[cfg(test)]
mod tests {
    use super::{decode_zippy, encode_zippy};

    #[test]
    fn test_zippy_roundtrip() {
        let data: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let encoded = encode_zippy(&data).unwrap();
        let decoded = decode_zippy(&encoded).unwrap();
        assert_eq!(data, decoded);
    }

    #[test]
    fn test_zippy_roundtrip_zeroes() {
        let data = vec![0u8; 8192];
        let encoded = encode_zippy(&data).unwrap();
        assert!(encoded.len() < data.len());
        let decoded = decode_zippy(&encoded).unwrap();
        assert_eq!(data, decoded);
    }
}
