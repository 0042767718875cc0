//! ROOT compression blocks.
//!
//! A compressed object is a sequence of blocks, each with a 9-byte header:
//! ```text
//! bytes 0-1:  algorithm tag ("ZL", "XZ", "L4", "ZS")
//! byte  2:    method
//! bytes 3-5:  compressed size   (little-endian u24)
//! bytes 6-8:  uncompressed size (little-endian u24)
//! ```

use std::io::Read;

use crate::error::{Result, RootError};

const BLOCK_HEADER_LEN: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Codec {
    Zlib,
    Lz4,
    Zstd,
    Xz,
}

impl Codec {
    fn from_tag(tag: &[u8]) -> Result<Self> {
        match tag {
            b"ZL" => Ok(Codec::Zlib),
            b"L4" => Ok(Codec::Lz4),
            b"ZS" => Ok(Codec::Zstd),
            b"XZ" => Ok(Codec::Xz),
            other => Err(RootError::Decompression(format!(
                "unsupported compression algorithm {:?}",
                String::from_utf8_lossy(other)
            ))),
        }
    }

    fn inflate(self, block: &[u8], expected: usize) -> Result<Vec<u8>> {
        let fail = |e: &dyn std::fmt::Display| RootError::Decompression(format!("{self:?}: {e}"));
        let mut out = Vec::with_capacity(expected);
        match self {
            Codec::Zlib => {
                flate2::read::ZlibDecoder::new(block).read_to_end(&mut out).map_err(|e| fail(&e))?;
            }
            Codec::Lz4 => {
                // 8-byte xxhash checksum precedes the LZ4 stream.
                let body = block.get(8..).ok_or_else(|| fail(&"block shorter than checksum"))?;
                out = lz4_flex::decompress(body, expected).map_err(|e| fail(&e))?;
            }
            Codec::Zstd => {
                out.resize(expected, 0);
                let mut decoder = ruzstd::decoding::FrameDecoder::new();
                let written = decoder.decode_all(block, &mut out).map_err(|e| fail(&e))?;
                out.truncate(written);
            }
            Codec::Xz => {
                lzma_rs::xz_decompress(&mut std::io::BufReader::new(block), &mut out)
                    .map_err(|e| fail(&e))?;
            }
        }
        Ok(out)
    }
}

/// Inflate ROOT-compressed `src` into exactly `expected_len` bytes.
pub fn decompress(src: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(expected_len);
    let mut offset = 0;

    while out.len() < expected_len && offset + BLOCK_HEADER_LEN <= src.len() {
        let header = &src[offset..offset + BLOCK_HEADER_LEN];
        let codec = Codec::from_tag(&header[0..2])?;
        let c_size = le24(&header[3..6]);
        let u_size = le24(&header[6..9]);
        offset += BLOCK_HEADER_LEN;

        let block = src.get(offset..offset + c_size).ok_or_else(|| {
            RootError::Decompression(format!(
                "block claims {c_size} compressed bytes, {} remain",
                src.len() - offset
            ))
        })?;
        let inflated = codec.inflate(block, u_size)?;
        if inflated.len() != u_size {
            return Err(RootError::Decompression(format!(
                "{codec:?} block inflated to {} bytes, header says {u_size}",
                inflated.len()
            )));
        }
        out.extend_from_slice(&inflated);
        offset += c_size;
    }

    if out.len() != expected_len {
        return Err(RootError::Decompression(format!(
            "inflated {} bytes, expected {expected_len}",
            out.len()
        )));
    }
    Ok(out)
}

fn le24(b: &[u8]) -> usize {
    b[0] as usize | (b[1] as usize) << 8 | (b[2] as usize) << 16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(tag: &[u8; 2], compressed: &[u8], u_len: usize) -> Vec<u8> {
        let mut out = tag.to_vec();
        out.push(0);
        out.extend_from_slice(&(compressed.len() as u32).to_le_bytes()[..3]);
        out.extend_from_slice(&(u_len as u32).to_le_bytes()[..3]);
        out.extend_from_slice(compressed);
        out
    }

    #[test]
    fn le24_reads_three_bytes() {
        assert_eq!(le24(&[0x00, 0x01, 0x00]), 256);
        assert_eq!(le24(&[0xff, 0xff, 0xff]), 0xFF_FFFF);
    }

    #[test]
    fn zlib_multi_block() {
        use flate2::Compression;
        use flate2::write::ZlibEncoder;
        use std::io::Write;

        let parts: [&[u8]; 2] = [b"energy energy energy", b"cluster cluster"];
        let mut src = Vec::new();
        for p in parts {
            let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
            enc.write_all(p).unwrap();
            src.extend(block(b"ZL", &enc.finish().unwrap(), p.len()));
        }
        let out = decompress(&src, parts[0].len() + parts[1].len()).unwrap();
        assert_eq!(out, parts.concat());
    }

    #[test]
    fn zstd_block() {
        let original = b"shapeParameters shapeParameters shapeParameters";
        let compressed = ruzstd::encoding::compress_to_vec(
            &original[..],
            ruzstd::encoding::CompressionLevel::Fastest,
        );
        let out = decompress(&block(b"ZS", &compressed, original.len()), original.len()).unwrap();
        assert_eq!(out, original);
    }

    #[test]
    fn lz4_block_skips_checksum() {
        let original = b"AAAAAAAAAAAAAAAABBBBBBBBBBBBBBBB";
        let mut compressed = vec![0u8; 8];
        compressed.extend(lz4_flex::compress(original));
        let out = decompress(&block(b"L4", &compressed, original.len()), original.len()).unwrap();
        assert_eq!(out, original);
    }

    #[test]
    fn unknown_tag_rejected() {
        let src = block(b"QQ", b"xx", 2);
        assert!(matches!(decompress(&src, 2), Err(RootError::Decompression(_))));
    }

    #[test]
    fn short_output_rejected() {
        let src = block(b"ZL", &[0x78, 0x9c, 0x03, 0x00, 0x00, 0x00, 0x00, 0x01], 0);
        assert!(decompress(&src, 10).is_err());
    }
}
