// NPY — NumPy array file format
//
// Layout (https://numpy.org/neps/nep-0001-npy-format.html):
//
//   magic:       [u8; 6]  = b"\x93NUMPY"
//   major:       u8       = 1, 2 or 3
//   minor:       u8       = 0
//   header_len:  u16 LE (v1) | u32 LE (v2, v3)
//   header:      Python dict literal, e.g.
//                  {'descr': '<f8', 'fortran_order': False, 'shape': (3, 4), }
//                padded with spaces and terminated by '\n' so the data starts
//                on a 64-byte boundary
//   data:        raw elements, C or Fortran order
//
// Only 0-, 1- and 2-D arrays map onto a SampleTable:
//   ()      -> 1 x 1
//   (n,)    -> n x 1
//   (r, c)  -> r x c
//
// Usage:
//   npy::save("data.npy", &table, DType::F64)?;
//   let table = npy::load("data.npy")?;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::table::SampleTable;

// Constants

const MAGIC: &[u8; 6] = b"\x93NUMPY";
const ALIGN: usize = 64;

/// Parsed `.npy` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpyHeader {
    /// `(major, minor)` format version.
    pub version: (u8, u8),
    /// Raw descriptor string, e.g. `"<f8"`.
    pub descr: String,
    pub dtype: DType,
    pub little_endian: bool,
    pub fortran_order: bool,
    pub shape: Vec<usize>,
    /// Byte offset where element data begins.
    pub data_offset: usize,
}

impl NpyHeader {
    /// Number of elements described by `shape` (1 for a 0-D array).
    pub fn num_elements(&self) -> Result<usize> {
        self.shape
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| Error::npy(format!("shape {:?} is too large", self.shape)))
    }

    /// The `(rows, cols)` this array occupies as a table.
    pub fn table_shape(&self) -> Result<(usize, usize)> {
        match self.shape.as_slice() {
            [] => Ok((1, 1)),
            [n] => Ok((*n, 1)),
            [r, c] => Ok((*r, *c)),
            _ => Err(Error::UnsupportedShape(self.shape.clone())),
        }
    }
}

// Writing

/// Encode `table` as an `.npy` byte buffer with elements of type `dtype`.
///
/// Values are converted with `as` casts, so integer dtypes truncate toward
/// zero and saturate at the type bounds.
pub fn to_bytes(table: &SampleTable, dtype: DType) -> Result<Vec<u8>> {
    let order = if dtype == DType::U8 { '|' } else { '<' };
    let dict = format!(
        "{{'descr': '{}{}', 'fortran_order': False, 'shape': ({}, {}), }}",
        order,
        dtype.npy_code(),
        table.nrows(),
        table.ncols()
    );

    let (major, preamble) = if padded_len(10, dict.len()) <= u16::MAX as usize {
        (1u8, 10usize)
    } else {
        (2u8, 12usize)
    };
    let header_len = padded_len(preamble, dict.len());

    let data_len = table.as_slice().len() * dtype.size_in_bytes();
    let mut out = Vec::with_capacity(preamble + header_len + data_len);
    out.extend_from_slice(MAGIC);
    out.push(major);
    out.push(0);
    if major == 1 {
        out.extend_from_slice(&(header_len as u16).to_le_bytes());
    } else {
        let len = u32::try_from(header_len)
            .map_err(|_| Error::npy(format!("header of {header_len} bytes is too large")))?;
        out.extend_from_slice(&len.to_le_bytes());
    }
    out.extend_from_slice(dict.as_bytes());
    out.resize(preamble + header_len - 1, b' ');
    out.push(b'\n');

    let data = table.as_slice();
    match dtype {
        DType::F64 => data.iter().for_each(|&v| out.extend_from_slice(&v.to_le_bytes())),
        DType::F32 => data
            .iter()
            .for_each(|&v| out.extend_from_slice(&(v as f32).to_le_bytes())),
        DType::I32 => data
            .iter()
            .for_each(|&v| out.extend_from_slice(&(v as i32).to_le_bytes())),
        DType::I64 => data
            .iter()
            .for_each(|&v| out.extend_from_slice(&(v as i64).to_le_bytes())),
        DType::U8 => out.extend(data.iter().map(|&v| v as u8)),
    }

    Ok(out)
}

/// Header length (dict + padding + '\n') so that data is 64-byte aligned.
fn padded_len(preamble: usize, dict_len: usize) -> usize {
    let unpadded = preamble + dict_len + 1;
    let total = unpadded.div_ceil(ALIGN) * ALIGN;
    total - preamble
}

/// Write `table` to `path` as an `.npy` file.
pub fn save(path: impl AsRef<Path>, table: &SampleTable, dtype: DType) -> Result<()> {
    let path = path.as_ref();
    let bytes = to_bytes(table, dtype)?;
    let mut w = BufWriter::new(File::create(path)?);
    w.write_all(&bytes)?;
    w.flush()?;
    log::debug!(
        "saved {}x{} table as {} to {}",
        table.nrows(),
        table.ncols(),
        dtype,
        path.display()
    );
    Ok(())
}

// Reading

/// Parse the preamble and header dict of an `.npy` buffer.
pub fn header_info(bytes: &[u8]) -> Result<NpyHeader> {
    if bytes.len() < 10 || &bytes[..6] != MAGIC {
        return Err(Error::InvalidMagic);
    }
    let (major, minor) = (bytes[6], bytes[7]);
    let (header_len, preamble) = match major {
        1 => (u16::from_le_bytes([bytes[8], bytes[9]]) as usize, 10),
        2 | 3 => {
            if bytes.len() < 12 {
                return Err(Error::npy("truncated preamble"));
            }
            let len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
            (len as usize, 12)
        }
        v => return Err(Error::npy(format!("unsupported format version {v}.{minor}"))),
    };

    let data_offset = preamble + header_len;
    if bytes.len() < data_offset {
        return Err(Error::npy(format!(
            "truncated header: expected {header_len} bytes"
        )));
    }
    let text = std::str::from_utf8(&bytes[preamble..data_offset])
        .map_err(|e| Error::npy(format!("header is not valid text: {e}")))?;

    let descr = parse_str_value(text, "descr")?;
    let (little_endian, code) = split_byte_order(&descr)?;
    let dtype = DType::from_npy_code(code)?;
    let fortran_order = parse_bool_value(text, "fortran_order")?;
    let shape = parse_shape_value(text)?;

    Ok(NpyHeader {
        version: (major, minor),
        descr,
        dtype,
        little_endian,
        fortran_order,
        shape,
        data_offset,
    })
}

/// Decode an `.npy` buffer into a row-major table.
pub fn from_bytes(bytes: &[u8]) -> Result<SampleTable> {
    let header = header_info(bytes)?;
    let (rows, cols) = header.table_shape()?;

    let count = header.num_elements()?;
    let size = header.dtype.size_in_bytes();
    let byte_len = count
        .checked_mul(size)
        .ok_or_else(|| Error::npy(format!("shape {:?} is too large", header.shape)))?;
    let payload = &bytes[header.data_offset..];
    if payload.len() < byte_len {
        return Err(Error::npy(format!(
            "truncated data: expected {byte_len} bytes, got {}",
            payload.len()
        )));
    }

    let values = decode_elements(&payload[..byte_len], header.dtype, header.little_endian);

    let data = if header.fortran_order && rows > 1 && cols > 1 {
        log::warn!("npy: fortran-ordered {rows}x{cols} array, transposing to row-major");
        let mut out = vec![0.0; count];
        for c in 0..cols {
            for r in 0..rows {
                out[r * cols + c] = values[c * rows + r];
            }
        }
        out
    } else {
        values
    };

    SampleTable::new(data, rows, cols)
}

/// Read an `.npy` file into a table.
pub fn load(path: impl AsRef<Path>) -> Result<SampleTable> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let table = from_bytes(&bytes)?;
    log::debug!(
        "loaded {}x{} table from {}",
        table.nrows(),
        table.ncols(),
        path.display()
    );
    Ok(table)
}

fn decode_elements(bytes: &[u8], dtype: DType, little: bool) -> Vec<f64> {
    macro_rules! decode {
        ($ty:ty, $n:expr) => {
            bytes
                .chunks_exact($n)
                .map(|c| {
                    let mut buf = [0u8; $n];
                    buf.copy_from_slice(c);
                    let v = if little {
                        <$ty>::from_le_bytes(buf)
                    } else {
                        <$ty>::from_be_bytes(buf)
                    };
                    v as f64
                })
                .collect()
        };
    }

    match dtype {
        DType::F64 => decode!(f64, 8),
        DType::F32 => decode!(f32, 4),
        DType::I64 => decode!(i64, 8),
        DType::I32 => decode!(i32, 4),
        DType::U8 => bytes.iter().map(|&b| b as f64).collect(),
    }
}

// Header dict parsing (minimal Python literal reader)

/// Split `'<f8'` into (little_endian, "f8").
fn split_byte_order(descr: &str) -> Result<(bool, &str)> {
    let native_little = cfg!(target_endian = "little");
    match descr.chars().next() {
        Some('<') => Ok((true, &descr[1..])),
        Some('>') => Ok((false, &descr[1..])),
        Some('|') => Ok((native_little, &descr[1..])),
        Some('=') => Ok((native_little, &descr[1..])),
        Some(c) if c.is_ascii_alphabetic() => Ok((native_little, descr)),
        _ => Err(Error::UnsupportedDType(descr.to_string())),
    }
}

/// Text following `'key':`, with leading whitespace removed.
fn value_after_key<'a>(text: &'a str, key: &str) -> Result<&'a str> {
    let pos = text
        .find(&format!("'{key}'"))
        .or_else(|| text.find(&format!("\"{key}\"")))
        .ok_or_else(|| Error::npy(format!("header is missing '{key}'")))?;
    let rest = &text[pos + key.len() + 2..];
    let rest = rest
        .trim_start()
        .strip_prefix(':')
        .ok_or_else(|| Error::npy(format!("expected ':' after '{key}'")))?;
    Ok(rest.trim_start())
}

fn parse_str_value(text: &str, key: &str) -> Result<String> {
    let rest = value_after_key(text, key)?;
    let quote = rest
        .chars()
        .next()
        .filter(|c| *c == '\'' || *c == '"')
        .ok_or_else(|| Error::npy(format!("'{key}' is not a string")))?;
    let body = &rest[1..];
    let end = body
        .find(quote)
        .ok_or_else(|| Error::npy(format!("unterminated string for '{key}'")))?;
    Ok(body[..end].to_string())
}

fn parse_bool_value(text: &str, key: &str) -> Result<bool> {
    let rest = value_after_key(text, key)?;
    if rest.starts_with("True") {
        Ok(true)
    } else if rest.starts_with("False") {
        Ok(false)
    } else {
        Err(Error::npy(format!("'{key}' is not a boolean")))
    }
}

fn parse_shape_value(text: &str) -> Result<Vec<usize>> {
    let rest = value_after_key(text, "shape")?;
    let body = rest
        .strip_prefix('(')
        .ok_or_else(|| Error::npy("'shape' is not a tuple"))?;
    let end = body
        .find(')')
        .ok_or_else(|| Error::npy("unterminated 'shape' tuple"))?;
    body[..end]
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.trim_end_matches('L')
                .parse::<usize>()
                .map_err(|e| Error::npy(format!("bad shape dimension '{s}': {e}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a version 1.0 .npy buffer with an arbitrary header dict and payload.
    fn raw_npy(dict: &str, payload: &[u8]) -> Vec<u8> {
        raw_npy_version(1, dict, payload)
    }

    /// Same as [`raw_npy`] with the preamble of format version `major`.0.
    fn raw_npy_version(major: u8, dict: &str, payload: &[u8]) -> Vec<u8> {
        let preamble = if major == 1 { 10 } else { 12 };
        let header_len = padded_len(preamble, dict.len());
        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&[major, 0]);
        if major == 1 {
            out.extend_from_slice(&(header_len as u16).to_le_bytes());
        } else {
            out.extend_from_slice(&(header_len as u32).to_le_bytes());
        }
        out.extend_from_slice(dict.as_bytes());
        out.resize(preamble + header_len - 1, b' ');
        out.push(b'\n');
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn header_is_aligned() {
        let t = SampleTable::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap();
        let bytes = to_bytes(&t, DType::F64).unwrap();
        let header = header_info(&bytes).unwrap();
        assert_eq!(header.data_offset % ALIGN, 0);
        assert_eq!(header.version, (1, 0));
        assert_eq!(header.descr, "<f8");
        assert_eq!(header.shape, vec![2, 3]);
        assert!(!header.fortran_order);
        assert_eq!(bytes[header.data_offset - 1], b'\n');
        assert_eq!(bytes.len(), header.data_offset + 6 * 8);
    }

    #[test]
    fn decodes_what_it_encodes() {
        let t = SampleTable::new(vec![0.5, -1.25, 3.0, 1e10], 2, 2).unwrap();
        let back = from_bytes(&to_bytes(&t, DType::F64).unwrap()).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn integer_dtypes_truncate() {
        let t = SampleTable::new(vec![1.9, -2.7, 300.0], 3, 1).unwrap();
        let back = from_bytes(&to_bytes(&t, DType::I32).unwrap()).unwrap();
        assert_eq!(back.as_slice(), &[1.0, -2.0, 300.0]);
        let bytes = to_bytes(&t, DType::U8).unwrap();
        assert_eq!(header_info(&bytes).unwrap().descr, "|u1");
        assert_eq!(from_bytes(&bytes).unwrap().as_slice(), &[1.0, 0.0, 255.0]);
    }

    #[test]
    fn one_dimensional_becomes_column() {
        let payload: Vec<u8> = [1.0f32, 2.0, 3.0]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let bytes = raw_npy("{'descr': '<f4', 'fortran_order': False, 'shape': (3,), }", &payload);
        let t = from_bytes(&bytes).unwrap();
        assert_eq!(t.shape(), (3, 1));
        assert_eq!(t.as_slice(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn scalar_becomes_one_by_one() {
        let bytes = raw_npy(
            "{'descr': '<i8', 'fortran_order': False, 'shape': (), }",
            &7i64.to_le_bytes(),
        );
        let t = from_bytes(&bytes).unwrap();
        assert_eq!(t.shape(), (1, 1));
        assert_eq!(t.as_slice(), &[7.0]);
    }

    #[test]
    fn big_endian_and_fortran_order() {
        // Column-major 2x3: columns [1,4], [2,5], [3,6]
        let payload: Vec<u8> = [1.0f64, 4.0, 2.0, 5.0, 3.0, 6.0]
            .iter()
            .flat_map(|v| v.to_be_bytes())
            .collect();
        let bytes = raw_npy("{'descr': '>f8', 'fortran_order': True, 'shape': (2, 3), }", &payload);
        let t = from_bytes(&bytes).unwrap();
        assert_eq!(t.shape(), (2, 3));
        assert_eq!(t.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn rejects_three_dimensional() {
        let bytes = raw_npy(
            "{'descr': '<f8', 'fortran_order': False, 'shape': (1, 1, 1), }",
            &1.0f64.to_le_bytes(),
        );
        assert!(matches!(from_bytes(&bytes), Err(Error::UnsupportedShape(s)) if s == vec![1, 1, 1]));
    }

    #[test]
    fn rejects_bad_magic_and_truncation() {
        assert!(matches!(from_bytes(b"PK\x03\x04 not npy"), Err(Error::InvalidMagic)));

        let t = SampleTable::zeros(4, 4);
        let bytes = to_bytes(&t, DType::F64).unwrap();
        let err = from_bytes(&bytes[..bytes.len() - 8]).unwrap_err();
        assert!(matches!(err, Error::Npy(ref m) if m.contains("truncated data")));
    }

    #[test]
    fn rejects_unknown_dtype() {
        let bytes = raw_npy("{'descr': '<c16', 'fortran_order': False, 'shape': (1,), }", &[0; 16]);
        assert!(matches!(from_bytes(&bytes), Err(Error::UnsupportedDType(_))));
    }

    #[test]
    fn rejects_overflowing_shape() {
        // 2^61 elements fit in usize, their byte length does not
        let bytes = raw_npy(
            "{'descr': '<f8', 'fortran_order': False, 'shape': (2305843009213693952, 1), }",
            &[],
        );
        let err = from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, Error::Npy(ref m) if m.contains("too large")));

        let bytes = raw_npy(
            "{'descr': '<f8', 'fortran_order': False, 'shape': (4294967296, 4294967296), }",
            &[],
        );
        let header = header_info(&bytes).unwrap();
        assert!(matches!(header.num_elements(), Err(Error::Npy(_))));
        assert!(matches!(from_bytes(&bytes), Err(Error::Npy(_))));
    }

    #[test]
    fn reads_native_byte_order() {
        let payload: Vec<u8> = [0.25f64, -8.0].iter().flat_map(|v| v.to_ne_bytes()).collect();
        let bytes = raw_npy("{'descr': '=f8', 'fortran_order': False, 'shape': (1, 2), }", &payload);
        let header = header_info(&bytes).unwrap();
        assert_eq!(header.little_endian, cfg!(target_endian = "little"));
        assert_eq!(from_bytes(&bytes).unwrap().as_slice(), &[0.25, -8.0]);
    }

    #[test]
    fn reads_version_two_preamble() {
        let mut payload = 1.5f64.to_le_bytes().to_vec();
        payload.extend_from_slice(&2.5f64.to_le_bytes());
        let bytes = raw_npy_version(
            2,
            "{'descr': '<f8', 'fortran_order': False, 'shape': (1, 2), }",
            &payload,
        );

        let header = header_info(&bytes).unwrap();
        assert_eq!(header.version, (2, 0));
        assert_eq!(header.data_offset % ALIGN, 0);
        assert_eq!(from_bytes(&bytes).unwrap().as_slice(), &[1.5, 2.5]);
    }

    #[test]
    fn reads_version_three_utf8_header() {
        let payload: Vec<u8> = [3i32, 4, 5].iter().flat_map(|v| v.to_le_bytes()).collect();
        let bytes = raw_npy_version(
            3,
            "{'descr': '<i4', 'fortran_order': False, 'shape': (3,), 'note': 'größe', }",
            &payload,
        );

        let header = header_info(&bytes).unwrap();
        assert_eq!(header.version, (3, 0));
        assert_eq!(header.dtype, DType::I32);
        assert_eq!(header.data_offset % ALIGN, 0);
        let t = from_bytes(&bytes).unwrap();
        assert_eq!(t.shape(), (3, 1));
        assert_eq!(t.as_slice(), &[3.0, 4.0, 5.0]);
    }
}
