use alloy_primitives::{Address, I256, U256};

/// A runtime value paired with an [`AbiType`](crate::AbiType) at encode time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Bool(bool),
    Int(I256),
    Uint(U256),
    Address(Address),
    /// Contents of a `bytesN`; the length must equal `N`.
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    Array(Vec<AbiValue>),
    FixedArray(Vec<AbiValue>),
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AbiValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            AbiValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<I256> {
        match self {
            AbiValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            AbiValue::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AbiValue::Bytes(b) | AbiValue::FixedBytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AbiValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of an array, fixed array or tuple.
    pub fn as_slice(&self) -> Option<&[AbiValue]> {
        match self {
            AbiValue::Array(v) | AbiValue::FixedArray(v) | AbiValue::Tuple(v) => Some(v),
            _ => None,
        }
    }
}

/// Sign-extends an `i64` into a 256-bit two's-complement integer.
pub fn i256_from_i64(value: i64) -> I256 {
    if value >= 0 {
        I256::from_raw(U256::from(value as u64))
    } else {
        // -(v + 1) never overflows, and !x == -x - 1 in two's complement.
        let magnitude_minus_one = U256::from((-(value + 1)) as u64);
        I256::from_raw(!magnitude_minus_one)
    }
}

impl From<bool> for AbiValue {
    fn from(value: bool) -> Self {
        AbiValue::Bool(value)
    }
}

impl From<u64> for AbiValue {
    fn from(value: u64) -> Self {
        AbiValue::Uint(U256::from(value))
    }
}

impl From<u128> for AbiValue {
    fn from(value: u128) -> Self {
        AbiValue::Uint(U256::from(value))
    }
}

impl From<i64> for AbiValue {
    fn from(value: i64) -> Self {
        AbiValue::Int(i256_from_i64(value))
    }
}

impl From<U256> for AbiValue {
    fn from(value: U256) -> Self {
        AbiValue::Uint(value)
    }
}

impl From<I256> for AbiValue {
    fn from(value: I256) -> Self {
        AbiValue::Int(value)
    }
}

impl From<Address> for AbiValue {
    fn from(value: Address) -> Self {
        AbiValue::Address(value)
    }
}

impl From<&str> for AbiValue {
    fn from(value: &str) -> Self {
        AbiValue::String(value.to_owned())
    }
}

impl From<String> for AbiValue {
    fn from(value: String) -> Self {
        AbiValue::String(value)
    }
}

impl From<Vec<u8>> for AbiValue {
    fn from(value: Vec<u8>) -> Self {
        AbiValue::Bytes(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i256_sign_extension() {
        assert_eq!(i256_from_i64(0).into_raw(), U256::ZERO);
        assert_eq!(i256_from_i64(5).into_raw(), U256::from(5u64));
        assert_eq!(i256_from_i64(-1).into_raw(), U256::MAX);
        assert_eq!(i256_from_i64(-2).into_raw(), U256::MAX - U256::from(1u64));
        assert!(i256_from_i64(i64::MIN).is_negative());
        assert!(!i256_from_i64(i64::MAX).is_negative());
    }

    #[test]
    fn conversions_pick_the_expected_variant() {
        assert_eq!(AbiValue::from(true), AbiValue::Bool(true));
        assert_eq!(AbiValue::from(7u64).as_uint(), Some(U256::from(7u64)));
        assert!(AbiValue::from(-7i64).as_int().unwrap().is_negative());
        assert_eq!(AbiValue::from("hi").as_str(), Some("hi"));
        assert_eq!(AbiValue::from(vec![1u8, 2]).as_bytes(), Some(&[1u8, 2][..]));
    }

    #[test]
    fn accessors_reject_other_variants() {
        let v = AbiValue::Bool(false);
        assert!(v.as_uint().is_none());
        assert!(v.as_address().is_none());
        assert!(v.as_slice().is_none());
    }
}
