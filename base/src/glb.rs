mod document;
mod reader;
mod writer;

pub use document::*;
pub use reader::*;
pub use writer::*;

pub const MAGIC: u32 = 0x46546C67; // "glTF"
pub const VERSION: u32 = 2;

pub const JSON_CHUNK: u32 = 0x4E4F534A; // "JSON"
pub const BIN_CHUNK: u32 = 0x004E4942; // "BIN\0"

pub const HEADER_LEN: usize = 12;
pub const CHUNK_HEADER_LEN: usize = 8;

pub const MIME_TYPE: &str = "model/gltf-binary";

pub fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}
