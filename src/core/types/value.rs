//! Value types and decoded memory values for working-set entries

use super::error::{WorksetError, WorksetResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Numeric interpretation of an address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Byte,
    Word,
    Dword,
    Qword,
    Float,
    Double,
}

impl ValueType {
    /// Every known value type, in code order
    pub const ALL: [ValueType; 6] = [
        ValueType::Byte,
        ValueType::Word,
        ValueType::Dword,
        ValueType::Qword,
        ValueType::Float,
        ValueType::Double,
    ];

    /// Returns the size in bytes for this value type
    pub const fn size(&self) -> usize {
        match self {
            ValueType::Byte => 1,
            ValueType::Word => 2,
            ValueType::Dword | ValueType::Float => 4,
            ValueType::Qword | ValueType::Double => 8,
        }
    }

    /// Single-letter code used by the persisted history format
    pub const fn code(&self) -> char {
        match self {
            ValueType::Byte => 'B',
            ValueType::Word => 'W',
            ValueType::Dword => 'D',
            ValueType::Qword => 'Q',
            ValueType::Float => 'F',
            ValueType::Double => 'E',
        }
    }

    /// Looks up a value type by its persisted code
    pub fn from_code(code: &str) -> Option<Self> {
        let mut chars = code.chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        ValueType::ALL.into_iter().find(|t| t.code() == c)
    }

    /// Decodes little-endian bytes and renders them for display
    pub fn render(&self, bytes: &[u8]) -> WorksetResult<String> {
        MemoryValue::from_bytes(bytes, *self)
            .map(|v| v.to_string())
            .ok_or_else(|| WorksetError::buffer_too_small(self.size(), bytes.len()))
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Byte => "byte",
            ValueType::Word => "word",
            ValueType::Dword => "dword",
            ValueType::Qword => "qword",
            ValueType::Float => "float",
            ValueType::Double => "double",
        };
        f.write_str(name)
    }
}

impl FromStr for ValueType {
    type Err = WorksetError;

    /// Accepts either the persisted code (`D`) or the lowercase name (`dword`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(t) = ValueType::from_code(&s.to_ascii_uppercase()) {
            return Ok(t);
        }
        ValueType::ALL
            .into_iter()
            .find(|t| t.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| WorksetError::InvalidValueType(s.to_string()))
    }
}

/// A value decoded from target memory
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum MemoryValue {
    Byte(i8),
    Word(i16),
    Dword(i32),
    Qword(i64),
    Float(f32),
    Double(f64),
}

impl MemoryValue {
    /// Creates a value from little-endian bytes; `None` when too short
    pub fn from_bytes(bytes: &[u8], value_type: ValueType) -> Option<Self> {
        let raw = bytes.get(..value_type.size())?;
        let value = match value_type {
            ValueType::Byte => MemoryValue::Byte(raw[0] as i8),
            ValueType::Word => MemoryValue::Word(i16::from_le_bytes(raw.try_into().ok()?)),
            ValueType::Dword => MemoryValue::Dword(i32::from_le_bytes(raw.try_into().ok()?)),
            ValueType::Qword => MemoryValue::Qword(i64::from_le_bytes(raw.try_into().ok()?)),
            ValueType::Float => MemoryValue::Float(f32::from_le_bytes(raw.try_into().ok()?)),
            ValueType::Double => MemoryValue::Double(f64::from_le_bytes(raw.try_into().ok()?)),
        };
        Some(value)
    }

    /// Gets the value type for this value
    pub fn value_type(&self) -> ValueType {
        match self {
            MemoryValue::Byte(_) => ValueType::Byte,
            MemoryValue::Word(_) => ValueType::Word,
            MemoryValue::Dword(_) => ValueType::Dword,
            MemoryValue::Qword(_) => ValueType::Qword,
            MemoryValue::Float(_) => ValueType::Float,
            MemoryValue::Double(_) => ValueType::Double,
        }
    }
}

impl fmt::Display for MemoryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryValue::Byte(v) => write!(f, "{}", v),
            MemoryValue::Word(v) => write!(f, "{}", v),
            MemoryValue::Dword(v) => write!(f, "{}", v),
            MemoryValue::Qword(v) => write!(f, "{}", v),
            MemoryValue::Float(v) => write!(f, "{}", v),
            MemoryValue::Double(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_size() {
        assert_eq!(ValueType::Byte.size(), 1);
        assert_eq!(ValueType::Word.size(), 2);
        assert_eq!(ValueType::Dword.size(), 4);
        assert_eq!(ValueType::Float.size(), 4);
        assert_eq!(ValueType::Qword.size(), 8);
        assert_eq!(ValueType::Double.size(), 8);
    }

    #[test]
    fn test_codes_are_unique_and_reversible() {
        for t in ValueType::ALL {
            assert_eq!(ValueType::from_code(&t.code().to_string()), Some(t));
        }
        assert_eq!(ValueType::from_code("X"), None);
        assert_eq!(ValueType::from_code("DD"), None);
        assert_eq!(ValueType::from_code(""), None);
    }

    #[test]
    fn test_from_str_accepts_code_and_name() {
        assert_eq!("d".parse::<ValueType>().unwrap(), ValueType::Dword);
        assert_eq!("Double".parse::<ValueType>().unwrap(), ValueType::Double);
        assert!("int".parse::<ValueType>().is_err());
    }

    #[test]
    fn test_value_from_bytes() {
        let bytes = [0x78, 0x56, 0x34, 0x12];
        let value = MemoryValue::from_bytes(&bytes, ValueType::Dword).unwrap();
        assert_eq!(value, MemoryValue::Dword(0x12345678));
        assert_eq!(value.value_type(), ValueType::Dword);

        assert_eq!(
            MemoryValue::from_bytes(&[0xFF], ValueType::Byte),
            Some(MemoryValue::Byte(-1))
        );
        assert_eq!(MemoryValue::from_bytes(&[0x01, 0x02], ValueType::Qword), None);
    }

    #[test]
    fn test_render() {
        assert_eq!(ValueType::Word.render(&[0x10, 0x00]).unwrap(), "16");
        assert_eq!(
            ValueType::Float.render(&1.5f32.to_le_bytes()).unwrap(),
            "1.5"
        );
        let err = ValueType::Double.render(&[0; 4]).unwrap_err();
        assert!(matches!(
            err,
            WorksetError::BufferTooSmall { expected: 8, actual: 4 }
        ));
    }
}
