//! Word-level helpers for the solidity ABI encoding of `(int256[][])`.
//!
//! Every value occupies one 32-byte big-endian word. Dynamic arrays are a length
//! word followed by their elements; an array of dynamic arrays additionally
//! carries a table of byte offsets (relative to the first offset word) before the
//! element encodings.
//!
//! Readers consume offsets without honoring them: the encoder always lays the
//! tail out sequentially, so reading in order consumes exactly what was written.

use crate::int256::{Int256, WORD_SIZE};
use bytes::{Buf, BufMut};
use commonware_codec::Error;
use primitive_types::U256;

/// Offset of the tuple body from the start of a single-element tuple.
pub const TUPLE_HEAD_OFFSET: usize = WORD_SIZE;

pub fn write_word(word: &[u8; WORD_SIZE], writer: &mut impl BufMut) {
    writer.put_slice(word);
}

pub fn read_word(reader: &mut impl Buf) -> Result<[u8; WORD_SIZE], Error> {
    if reader.remaining() < WORD_SIZE {
        return Err(Error::EndOfBuffer);
    }
    let mut word = [0u8; WORD_SIZE];
    reader.copy_to_slice(&mut word);
    Ok(word)
}

pub fn write_uint256(value: U256, writer: &mut impl BufMut) {
    let mut word = [0u8; WORD_SIZE];
    value.to_big_endian(&mut word);
    write_word(&word, writer);
}

pub fn read_uint256(reader: &mut impl Buf) -> Result<U256, Error> {
    Ok(U256::from_big_endian(&read_word(reader)?))
}

pub fn write_int256(value: &Int256, writer: &mut impl BufMut) {
    write_word(&value.to_be_bytes(), writer);
}

pub fn read_int256(reader: &mut impl Buf) -> Result<Int256, Error> {
    Ok(Int256::from_be_bytes(read_word(reader)?))
}

/// Length (or offset) word as a native size.
pub fn write_len(len: usize, writer: &mut impl BufMut) {
    write_uint256(U256::from(len), writer);
}

/// Read a length word declaring `len` items of at least `min_item_size` bytes each.
///
/// Fails before any allocation if the declared length does not fit `usize` or the
/// items could not possibly fit in what is left of the input.
pub fn read_len(reader: &mut impl Buf, min_item_size: usize) -> Result<usize, Error> {
    let raw = read_uint256(reader)?;
    if raw.bits() > usize::BITS as usize {
        return Err(Error::Invalid("abi", "length does not fit usize"));
    }
    let len = raw.low_u64() as usize;
    match len.checked_mul(min_item_size) {
        Some(needed) if needed <= reader.remaining() => Ok(len),
        _ => Err(Error::InvalidLength(len)),
    }
}

/// Encoded size of an `int256[]` holding `len` elements.
pub fn int256_array_size(len: usize) -> usize {
    WORD_SIZE + len * WORD_SIZE
}

pub fn write_int256_array(values: &[Int256], writer: &mut impl BufMut) {
    write_len(values.len(), writer);
    for value in values {
        write_int256(value, writer);
    }
}

pub fn read_int256_array(reader: &mut impl Buf) -> Result<Vec<Int256>, Error> {
    let len = read_len(reader, WORD_SIZE)?;
    let mut values = Vec::with_capacity(len);
    for _ in 0..len {
        values.push(read_int256(reader)?);
    }
    Ok(values)
}

/// Encoded size of an `int256[][]` (without the tuple head).
pub fn int256_array_array_size(values: &[Vec<Int256>]) -> usize {
    WORD_SIZE
        + values.len() * WORD_SIZE
        + values
            .iter()
            .map(|inner| int256_array_size(inner.len()))
            .sum::<usize>()
}

pub fn write_int256_array_array(values: &[Vec<Int256>], writer: &mut impl BufMut) {
    write_len(values.len(), writer);

    // Offsets are relative to the first offset word, so the first element
    // starts right after the offset table.
    let mut offset = values.len() * WORD_SIZE;
    for inner in values {
        write_len(offset, writer);
        offset += int256_array_size(inner.len());
    }

    for inner in values {
        write_int256_array(inner, writer);
    }
}

pub fn read_int256_array_array(reader: &mut impl Buf) -> Result<Vec<Vec<Int256>>, Error> {
    // Each element needs its offset word plus at least its own length word.
    let len = read_len(reader, 2 * WORD_SIZE)?;

    for _ in 0..len {
        read_uint256(reader)?;
    }

    let mut values = Vec::with_capacity(len);
    for _ in 0..len {
        values.push(read_int256_array(reader)?);
    }
    Ok(values)
}

/// Encode `(int256[][])`: the tuple head offset followed by the array body.
pub fn write_tuple_int256_array_array(values: &[Vec<Int256>], writer: &mut impl BufMut) {
    write_len(TUPLE_HEAD_OFFSET, writer);
    write_int256_array_array(values, writer);
}

pub fn read_tuple_int256_array_array(reader: &mut impl Buf) -> Result<Vec<Vec<Int256>>, Error> {
    read_uint256(reader)?;
    read_int256_array_array(reader)
}

pub fn tuple_int256_array_array_size(values: &[Vec<Int256>]) -> usize {
    TUPLE_HEAD_OFFSET + int256_array_array_size(values)
}
