// DType — element types a sample table can be persisted as
//
// Tables are always f64 in memory. The dtype only decides how values are
// encoded on disk, and which encodings can be read back.

use crate::error::{Error, Result};

/// On-disk element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    F32,
    F64,
    I32,
    I64,
    U8,
}

impl DType {
    /// Size of one element in bytes.
    pub fn size_in_bytes(&self) -> usize {
        match self {
            DType::U8 => 1,
            DType::F32 | DType::I32 => 4,
            DType::F64 | DType::I64 => 8,
        }
    }

    /// The kind+size code NumPy uses in a `descr` string (without byte order).
    pub fn npy_code(&self) -> &'static str {
        match self {
            DType::F32 => "f4",
            DType::F64 => "f8",
            DType::I32 => "i4",
            DType::I64 => "i8",
            DType::U8 => "u1",
        }
    }

    /// Parse a kind+size code such as `"f8"`.
    pub fn from_npy_code(code: &str) -> Result<Self> {
        match code {
            "f4" => Ok(DType::F32),
            "f8" => Ok(DType::F64),
            "i4" => Ok(DType::I32),
            "i8" => Ok(DType::I64),
            "u1" | "b1" => Ok(DType::U8),
            other => Err(Error::UnsupportedDType(other.to_string())),
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, DType::F32 | DType::F64)
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DType::F32 => "f32",
            DType::F64 => "f64",
            DType::I32 => "i32",
            DType::I64 => "i64",
            DType::U8 => "u8",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_numpy() {
        for dt in [DType::F32, DType::F64, DType::I32, DType::I64, DType::U8] {
            assert_eq!(DType::from_npy_code(dt.npy_code()).unwrap(), dt);
        }
        assert_eq!(DType::F64.size_in_bytes(), 8);
        assert_eq!(DType::U8.size_in_bytes(), 1);
    }

    #[test]
    fn unknown_code_is_rejected() {
        let err = DType::from_npy_code("c16").unwrap_err();
        assert!(matches!(err, Error::UnsupportedDType(ref s) if s == "c16"));
    }
}
