use std::io::Read;

use flate2::read::ZlibDecoder;

use super::record::{Document, Record, Value};
use crate::error::ImportError;

pub const MAGIC: &[u8] = b"Kaydara FBX Binary  \0";
const HEADER_LEN: usize = 27;
/// Files from this version on store record offsets as 64-bit values.
const WIDE_OFFSETS_VERSION: u32 = 7500;
const ARRAY_ENCODING_ZLIB: u32 = 1;
const MAX_PREALLOCATION: usize = 64 << 20;

pub fn is_binary(data: &[u8]) -> bool {
    data.starts_with(MAGIC)
}

pub fn parse(data: &[u8]) -> Result<Document, ImportError> {
    puffin::profile_function!();

    if !is_binary(data) || data.len() < HEADER_LEN {
        return Err(ImportError::InvalidRecord {
            offset: 0,
            reason: "missing binary header".to_owned(),
        });
    }

    let mut reader = Reader {
        data,
        pos: HEADER_LEN - 4,
        wide: false,
    };
    let version = reader.u32()?;
    reader.wide = version >= WIDE_OFFSETS_VERSION;

    let mut records = Vec::new();
    while reader.remaining() >= reader.null_record_len() {
        match reader.record()? {
            Some(record) => records.push(record),
            None => break,
        }
    }

    log::debug!("Parsed binary document version {} with {} top level records", version, records.len());
    Ok(Document { version, records })
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    wide: bool,
}

impl<'a> Reader<'a> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn null_record_len(&self) -> usize {
        if self.wide {
            25
        } else {
            13
        }
    }

    fn bytes(&mut self, len: usize) -> Result<&'a [u8], ImportError> {
        let data = self.data;
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= data.len())
            .ok_or(ImportError::UnexpectedEof { offset: self.pos })?;
        let bytes = &data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], ImportError> {
        let mut out = [0; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, ImportError> {
        Ok(self.array::<1>()?[0])
    }

    fn u32(&mut self) -> Result<u32, ImportError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn offset(&mut self) -> Result<u64, ImportError> {
        if self.wide {
            Ok(u64::from_le_bytes(self.array()?))
        } else {
            Ok(u64::from(self.u32()?))
        }
    }

    /// Reads one record with its children, `None` for the null record closing a list.
    fn record(&mut self) -> Result<Option<Record>, ImportError> {
        let start = self.pos;
        let end_offset = self.offset()?;
        let property_count = self.offset()?;
        let _property_list_len = self.offset()?;
        let name_len = self.u8()?;

        if end_offset == 0 {
            return Ok(None);
        }

        let end = usize::try_from(end_offset)
            .ok()
            .filter(|&end| end > start && end <= self.data.len())
            .ok_or_else(|| ImportError::InvalidRecord {
                offset: start,
                reason: format!("end offset {} outside of file", end_offset),
            })?;

        let name = String::from_utf8_lossy(self.bytes(usize::from(name_len))?).into_owned();
        let mut record = Record::new(&name, Vec::new());
        for _ in 0..property_count {
            record.values.push(self.value()?);
        }

        while self.pos < end {
            if end - self.pos < self.null_record_len() {
                return Err(ImportError::InvalidRecord {
                    offset: self.pos,
                    reason: format!("{} children overrun the record end", name),
                });
            }
            match self.record()? {
                Some(child) => record.children.push(child),
                None => break,
            }
        }

        if self.pos > end {
            return Err(ImportError::InvalidRecord {
                offset: start,
                reason: format!("{} extends past its end offset", name),
            });
        }
        self.pos = end;
        Ok(Some(record))
    }

    fn value(&mut self) -> Result<Value, ImportError> {
        let offset = self.pos;
        let code = self.u8()?;
        let value = match code {
            b'Y' => Value::I16(i16::from_le_bytes(self.array()?)),
            b'C' => Value::Bool(self.u8()? != 0),
            b'I' => Value::I32(i32::from_le_bytes(self.array()?)),
            b'F' => Value::F32(f32::from_le_bytes(self.array()?)),
            b'D' => Value::F64(f64::from_le_bytes(self.array()?)),
            b'L' => Value::I64(i64::from_le_bytes(self.array()?)),
            b'f' => Value::F32Array(self.array_value(4, |b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))?),
            b'd' => Value::F64Array(self.array_value(8, |b| {
                f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
            })?),
            b'l' => Value::I64Array(self.array_value(8, |b| {
                i64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
            })?),
            b'i' => Value::I32Array(self.array_value(4, |b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))?),
            b'b' => Value::BoolArray(self.array_value(1, |b| b[0] != 0)?),
            b'S' => {
                let len = self.u32()? as usize;
                Value::String(object_name(self.bytes(len)?))
            }
            b'R' => {
                let len = self.u32()? as usize;
                Value::Raw(self.bytes(len)?.to_vec())
            }
            other => {
                return Err(ImportError::UnknownPropertyType {
                    code: char::from(other),
                    offset,
                })
            }
        };
        Ok(value)
    }

    fn array_value<T>(&mut self, element_size: usize, decode: impl Fn(&[u8]) -> T) -> Result<Vec<T>, ImportError> {
        let offset = self.pos;
        let len = self.u32()? as usize;
        let encoding = self.u32()?;
        let stored_len = self.u32()? as usize;
        let stored = self.bytes(stored_len)?;

        let expected = len.checked_mul(element_size).ok_or_else(|| ImportError::InvalidRecord {
            offset,
            reason: format!("array of {} elements is too large", len),
        })?;

        let inflated;
        let bytes = if encoding == ARRAY_ENCODING_ZLIB {
            // The declared length is untrusted until the data is inflated.
            let mut out = Vec::with_capacity(expected.min(MAX_PREALLOCATION));
            ZlibDecoder::new(stored)
                .read_to_end(&mut out)
                .map_err(|source| ImportError::Inflate { offset, source })?;
            inflated = out;
            inflated.as_slice()
        } else {
            stored
        };

        if bytes.len() != expected {
            return Err(ImportError::InvalidRecord {
                offset,
                reason: format!("array holds {} bytes, expected {}", bytes.len(), expected),
            });
        }

        Ok(bytes.chunks_exact(element_size).map(decode).collect())
    }
}

/// Binary files store object names as `Name\0\x01Class`, rewritten to the `Class::Name` form.
fn object_name(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    match text.split_once("\0\u{1}") {
        Some((name, class)) => format!("{}::{}", class, name),
        None => text.into_owned(),
    }
}
