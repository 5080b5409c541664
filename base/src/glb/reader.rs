use std::io::Read;

use crate::defs::{Error, ErrorKind::*, IntoResult, Result};
use crate::glb::{Document, BIN_CHUNK, JSON_CHUNK, MAGIC, VERSION};

pub struct Glb {
    pub document: Document,
    pub bin: Vec<u8>,
    pub byte_length: usize,
}

fn read_u32(reader: &mut &[u8], what: &str) -> Result<u32> {
    let mut buf = [0; 4];
    reader
        .read_exact(&mut buf)
        .res(|| format!("failed to read GLB {}", what))?;
    Ok(u32::from_le_bytes(buf))
}

fn read_chunk(reader: &mut &[u8]) -> Result<(u32, Vec<u8>)> {
    let len = read_u32(reader, "chunk length")? as usize;
    let kind = read_u32(reader, "chunk type")?;
    if len % 4 != 0 {
        return Err(Error::new(
            MalformedData,
            format!("unaligned GLB chunk length '{}'", len),
        ));
    }
    if len > reader.len() {
        return Err(Error::new(
            MalformedData,
            format!(
                "GLB chunk {:#X} of {} bytes exceeds remaining {} bytes",
                kind,
                len,
                reader.len()
            ),
        ));
    }
    let (data, rest) = reader.split_at(len);
    *reader = rest;
    Ok((kind, data.to_vec()))
}

pub fn decode(data: &[u8]) -> Result<Glb> {
    let mut reader = data;

    let val = read_u32(&mut reader, "magic")?;
    if val != MAGIC {
        return Err(Error::new(
            MalformedData,
            format!("bad GLB magic '{:#X}'", val),
        ));
    }

    let val = read_u32(&mut reader, "version")?;
    if val != VERSION {
        return Err(Error::new(
            UnsupportedFeature,
            format!("unsupported GLB version '{}'", val),
        ));
    }

    let byte_length = read_u32(&mut reader, "length")? as usize;
    if byte_length != data.len() {
        return Err(Error::new(
            MalformedData,
            format!(
                "GLB length mismatch (header {}, actual {})",
                byte_length,
                data.len()
            ),
        ));
    }

    let (kind, json) = read_chunk(&mut reader)?;
    if kind != JSON_CHUNK {
        return Err(Error::new(
            MalformedData,
            format!("expected JSON chunk, found {:#X}", kind),
        ));
    }
    let document: Document = serde_json::from_slice(&json)
        .res(|| "failed to parse glTF document".to_string())?;

    let mut bin = Vec::new();
    if !reader.is_empty() {
        let (kind, data) = read_chunk(&mut reader)?;
        if kind != BIN_CHUNK {
            return Err(Error::new(
                MalformedData,
                format!("expected BIN chunk, found {:#X}", kind),
            ));
        }
        bin = data;
    }

    if !reader.is_empty() {
        return Err(Error::new(
            UnsupportedFeature,
            "trailing GLB chunks are not supported".to_string(),
        ));
    }

    Ok(Glb {
        document,
        bin,
        byte_length,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glb::{encode, Asset, Buffer};
    use crate::util::test::le_u32_at;

    fn document() -> Document {
        Document {
            asset: Asset {
                version: "2.0".to_string(),
                generator: Some("test".to_string()),
            },
            buffers: vec![Buffer { byte_length: 6 }],
            ..Default::default()
        }
    }

    #[test]
    fn test_decode_encoded() {
        let data = encode(&document(), &[9, 8, 7, 6, 5, 4]).unwrap();
        let glb = decode(&data).unwrap();
        assert_eq!(glb.document, document());
        assert_eq!(glb.bin, vec![9, 8, 7, 6, 5, 4, 0, 0]);
        assert_eq!(glb.byte_length, data.len());
    }

    #[test]
    fn test_decode_rejects_bad_magic() {
        let mut data = encode(&document(), &[]).unwrap();
        data[0] = b'x';
        assert_eq!(decode(&data).err().unwrap().kind, MalformedData);
    }

    #[test]
    fn test_decode_rejects_other_version() {
        let mut data = encode(&document(), &[]).unwrap();
        data[4] = 1;
        assert_eq!(decode(&data).err().unwrap().kind, UnsupportedFeature);
    }

    #[test]
    fn test_decode_rejects_oversized_chunk() {
        let mut data = encode(&document(), &[1, 2, 3, 4]).unwrap();
        let bin_header = 20 + le_u32_at(&data, 12) as usize;
        data[bin_header..bin_header + 4]
            .copy_from_slice(&0xFFFF_FFF0u32.to_le_bytes());
        let err = decode(&data).err().unwrap();
        assert_eq!(err.kind, MalformedData);
        assert!(err.description.contains("exceeds"));
    }

    #[test]
    fn test_decode_rejects_truncated() {
        let data = encode(&document(), &[1, 2, 3, 4]).unwrap();
        let err = decode(&data[..data.len() - 4]).err().unwrap();
        assert_eq!(err.kind, MalformedData);
    }
}
