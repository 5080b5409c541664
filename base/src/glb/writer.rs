use std::convert::TryFrom;

use crate::defs::{IntoResult, Result};
use crate::glb::{
    padded_len, Document, BIN_CHUNK, CHUNK_HEADER_LEN, HEADER_LEN,
    JSON_CHUNK, MAGIC, VERSION,
};

/// Serializes a document and its binary payload into one GLB buffer.
///
/// The JSON chunk is padded with spaces and the binary chunk with zeros, both
/// to a 4-byte boundary. The total length in the header is patched in once
/// both chunks have been laid out. An empty payload omits the BIN chunk.
pub fn encode(document: &Document, bin: &[u8]) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(document)
        .res(|| "failed to serialize glTF document".to_string())?;

    let mut capacity = HEADER_LEN + CHUNK_HEADER_LEN + padded_len(json.len());
    if !bin.is_empty() {
        capacity += CHUNK_HEADER_LEN + padded_len(bin.len());
    }

    let mut buffer = Vec::with_capacity(capacity);
    buffer.extend_from_slice(&MAGIC.to_le_bytes());
    buffer.extend_from_slice(&VERSION.to_le_bytes());
    buffer.extend_from_slice(&0u32.to_le_bytes());

    write_chunk(&mut buffer, JSON_CHUNK, &json, b' ')?;
    if !bin.is_empty() {
        write_chunk(&mut buffer, BIN_CHUNK, bin, 0)?;
    }

    let total = u32::try_from(buffer.len())
        .res(|| "GLB exceeds 4 GiB limit".to_string())?;
    buffer[8..HEADER_LEN].copy_from_slice(&total.to_le_bytes());

    Ok(buffer)
}

fn write_chunk(
    buffer: &mut Vec<u8>,
    kind: u32,
    data: &[u8],
    pad: u8,
) -> Result<()> {
    let len = padded_len(data.len());
    let len32 = u32::try_from(len)
        .res(|| format!("GLB chunk {:#X} is too large", kind))?;
    buffer.extend_from_slice(&len32.to_le_bytes());
    buffer.extend_from_slice(&kind.to_le_bytes());
    buffer.extend_from_slice(data);
    buffer.resize(buffer.len() + len - data.len(), pad);
    Ok(())
}
