use std::io::Cursor;

use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};

use crate::error::HuffError;
use crate::huffman::CodeTable;

/// Concatenates the code of every input byte, in input order, into a
/// byte-aligned stream (MSB-first). Returns the packed bytes together with
/// the number of meaningful bits; the final byte is zero-padded.
pub fn pack(data: &[u8], table: &CodeTable) -> Result<(Vec<u8>, u64), HuffError> {
    let mut packed = Vec::with_capacity(data.len() / 2);
    let mut writer = BitWriter::endian(Cursor::new(&mut packed), BigEndian);
    let mut bit_count = 0u64;

    for &byte in data {
        let code = table.code_for(byte).ok_or_else(|| {
            HuffError::Corrupt(format!("no code for byte 0x{byte:02X}"))
        })?;

        for &bit in code {
            writer.write_bit(bit == 1)?;
        }
        bit_count += code.len() as u64;
    }

    writer.byte_align()?;
    drop(writer);

    Ok((packed, bit_count))
}

/// Greedy bit-by-bit decode. Consumes exactly `bit_count` bits, so trailing
/// padding never turns into a spurious symbol.
pub fn unpack(payload: &[u8], bit_count: u64, table: &CodeTable) -> Result<Vec<u8>, HuffError> {
    let mut reader = BitReader::endian(Cursor::new(payload), BigEndian);
    let mut output = Vec::new();
    let mut candidate: Vec<u8> = Vec::with_capacity(table.max_code_len());

    for _ in 0..bit_count {
        let bit = reader
            .read_bit()
            .map_err(|_| HuffError::Corrupt("payload shorter than declared bit count".into()))?;
        candidate.push(u8::from(bit));

        if let Some(byte) = table.byte_for(&candidate) {
            output.push(byte);
            candidate.clear();
        } else if candidate.len() >= table.max_code_len() {
            // No code is longer than max_code_len, so this buffer can never
            // match anything.
            return Err(HuffError::UnknownCode);
        }
    }

    if !candidate.is_empty() {
        return Err(HuffError::Corrupt("bitstream ends in the middle of a code".into()));
    }

    Ok(output)
}
