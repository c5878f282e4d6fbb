use binary_rw::{BinaryError, BinaryReader, BinaryWriter, Endian, ReadStream, WriteStream};

use crate::error::HuffError;

// Two-byte tag plus a version byte so a foreign file fails fast instead of
// being decoded as garbage.
const MAGIC: [u8; 2] = [0xC0, 0xDE];
const VERSION: u8 = 1;

const PAYLOAD_CHUNK: usize = 64 * 1024;

/// On-disk layout, all integer fields big-endian:
///
/// ```text
/// magic (2) | version (1) | symbol_count (u16)
/// symbol_count x [ byte (1) | code_len (1) | code bits, MSB-first, padded ]
/// bit_count (u64) | payload, ceil(bit_count / 8) bytes
/// ```
pub struct Container {
    pub records: Vec<(u8, Vec<u8>)>,
    pub bit_count: u64,
    pub payload: Vec<u8>,
}

impl Container {
    pub fn write_to<W: WriteStream>(&self, stream: &mut W) -> Result<(), HuffError> {
        let mut writer = BinaryWriter::new(stream, Endian::Big);

        writer.write_bytes(&MAGIC[..])?;
        writer.write_u8(VERSION)?;
        writer.write_u16(self.records.len() as u16)?;

        for (byte, code) in &self.records {
            writer.write_u8(*byte)?;
            writer.write_u8(code.len() as u8)?;
            writer.write_bytes(&pack_code_bits(code))?;
        }

        writer.write_u64(self.bit_count)?;
        writer.write_bytes(&self.payload)?;

        Ok(())
    }

    pub fn read_from<R: ReadStream>(stream: &mut R) -> Result<Self, HuffError> {
        let mut reader = BinaryReader::new(stream, Endian::Big);

        let magic = read(reader.read_bytes(2), "magic")?;
        if magic != MAGIC {
            return Err(HuffError::Corrupt("not a huffpack container".into()));
        }

        let version = read(reader.read_u8(), "version")?;
        if version != VERSION {
            return Err(HuffError::Corrupt(format!(
                "unsupported container version {version}"
            )));
        }

        let symbol_count = read(reader.read_u16(), "symbol count")? as usize;
        if symbol_count == 0 || symbol_count > 256 {
            return Err(HuffError::Corrupt(format!(
                "symbol count {symbol_count} out of range"
            )));
        }

        let mut records = Vec::with_capacity(symbol_count);
        for _ in 0..symbol_count {
            let byte = read(reader.read_u8(), "symbol record")?;
            let code_len = read(reader.read_u8(), "symbol record")? as usize;
            if code_len == 0 {
                return Err(HuffError::Corrupt(format!(
                    "zero-length code for byte 0x{byte:02X}"
                )));
            }

            let packed = read(reader.read_bytes((code_len + 7) / 8), "symbol record")?;
            records.push((byte, unpack_code_bits(&packed, code_len)));
        }

        let bit_count = read(reader.read_u64(), "bit count")?;

        // The bit count is header data and may lie; reading in bounded
        // chunks makes a bad value fail at end-of-file instead of sizing one
        // giant allocation.
        let mut payload = Vec::new();
        let mut remaining = ((bit_count + 7) / 8) as usize;
        while remaining > 0 {
            let want = remaining.min(PAYLOAD_CHUNK);
            let chunk = read(reader.read_bytes(want), "payload")?;
            if chunk.len() < want {
                return Err(HuffError::Corrupt(
                    "container truncated reading payload".into(),
                ));
            }
            remaining -= chunk.len();
            payload.extend_from_slice(&chunk);
        }

        Ok(Self {
            records,
            bit_count,
            payload,
        })
    }
}

// A short read on the decode path means a truncated or foreign container,
// not an I/O failure of ours.
fn read<T>(result: Result<T, BinaryError>, what: &str) -> Result<T, HuffError> {
    result.map_err(|_| HuffError::Corrupt(format!("container truncated reading {what}")))
}

/////////////////////////////////////////

fn pack_code_bits(code: &[u8]) -> Vec<u8> {
    let mut bytes = vec![0u8; (code.len() + 7) / 8];
    for (i, &bit) in code.iter().enumerate() {
        if bit == 1 {
            bytes[i / 8] |= 0x80 >> (i % 8);
        }
    }
    bytes
}

fn unpack_code_bits(bytes: &[u8], len: usize) -> Vec<u8> {
    (0..len).map(|i| (bytes[i / 8] >> (7 - i % 8)) & 1).collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use binary_rw::{FileStream, OpenType};

    use super::*;

    fn to_bytes(container: &Container) -> Vec<u8> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.huff");

        let mut stream = FileStream::new(&path, OpenType::OpenAndCreate).unwrap();
        container.write_to(&mut stream).unwrap();
        drop(stream);

        fs::read(&path).unwrap()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Container, HuffError> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.huff");
        fs::write(&path, bytes).unwrap();

        let mut stream = FileStream::new(&path, OpenType::Open).unwrap();
        Container::read_from(&mut stream)
    }

    fn sample() -> Container {
        Container {
            records: vec![
                (b'a', vec![0]),
                (b'b', vec![1, 0]),
                (b'c', vec![1, 1, 0, 1, 0, 1, 1, 0, 1]),
            ],
            bit_count: 14,
            payload: vec![0b0101_1011, 0b1100_0000],
        }
    }

    #[test]
    fn test_round_trip() {
        let container = sample();
        let decoded = from_bytes(&to_bytes(&container)).unwrap();

        assert_eq!(decoded.records, container.records);
        assert_eq!(decoded.bit_count, container.bit_count);
        assert_eq!(decoded.payload, container.payload);
    }

    #[test]
    fn test_code_bits_pack_msb_first() {
        assert_eq!(pack_code_bits(&[1, 0, 1]), vec![0b1010_0000]);
        assert_eq!(
            pack_code_bits(&[1, 1, 1, 1, 1, 1, 1, 1, 1]),
            vec![0xFF, 0x80]
        );
        assert_eq!(unpack_code_bits(&[0b1010_0000], 3), vec![1, 0, 1]);
        assert_eq!(
            unpack_code_bits(&[0xFF, 0x80], 9),
            vec![1, 1, 1, 1, 1, 1, 1, 1, 1]
        );
    }

    #[test]
    fn test_rejects_foreign_magic() {
        let mut bytes = to_bytes(&sample());
        bytes[0] = 0x00;
        assert!(matches!(from_bytes(&bytes), Err(HuffError::Corrupt(_))));
    }

    #[test]
    fn test_rejects_unknown_version() {
        let mut bytes = to_bytes(&sample());
        bytes[2] = 0xFE;
        assert!(matches!(from_bytes(&bytes), Err(HuffError::Corrupt(_))));
    }

    #[test]
    fn test_rejects_zero_symbol_count() {
        let mut bytes = to_bytes(&sample());
        bytes[3] = 0;
        bytes[4] = 0;
        assert!(matches!(from_bytes(&bytes), Err(HuffError::Corrupt(_))));
    }

    #[test]
    fn test_any_truncation_is_rejected() {
        let bytes = to_bytes(&sample());
        for len in 0..bytes.len() {
            assert!(
                from_bytes(&bytes[..len]).is_err(),
                "truncation to {len} bytes was accepted"
            );
        }
    }
}
