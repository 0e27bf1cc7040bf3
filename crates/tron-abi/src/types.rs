use std::fmt;
use std::str::FromStr;

use crate::error::EncodingError;

/// Size in bytes of one ABI word.
pub const WORD: usize = 32;

/// A Solidity ABI parameter type.
///
/// The universe of ABI types is closed, so this is a plain enum with a
/// recursive case for arrays and tuples rather than a trait hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbiType {
    Bool,
    /// Signed integer of the given bit width (multiple of 8 in `8..=256`).
    Int(usize),
    /// Unsigned integer of the given bit width (multiple of 8 in `8..=256`).
    Uint(usize),
    /// 20-byte account hash. The network prefix byte is not part of the ABI.
    Address,
    /// `bytesN` with `N` in `1..=32`.
    FixedBytes(usize),
    Bytes,
    String,
    /// Variable-length `T[]`.
    Array(Box<AbiType>),
    /// Fixed-length `T[N]`.
    FixedArray(Box<AbiType>, usize),
    Tuple(Vec<AbiType>),
}

impl AbiType {
    /// Parses a textual type fragment such as `uint256`, `bytes32[]` or
    /// `(address,uint256)[2]`.
    pub fn parse(fragment: &str) -> Result<Self, EncodingError> {
        parse_type(fragment.trim()).map_err(|_| EncodingError::UnsupportedType(fragment.into()))
    }

    /// Whether values of this type are encoded through an offset in the head.
    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiType::Bytes | AbiType::String | AbiType::Array(_) => true,
            AbiType::FixedArray(inner, _) => inner.is_dynamic(),
            AbiType::Tuple(components) => components.iter().any(AbiType::is_dynamic),
            _ => false,
        }
    }

    /// Number of 32-byte words a static type occupies, or `None` for dynamic
    /// types. Saturates at `usize::MAX` for hand-built types too large to
    /// address; [`AbiType::parse`] never produces those.
    pub fn static_word_count(&self) -> Option<usize> {
        if self.is_dynamic() {
            return None;
        }
        Some(self.inline_size().map_or(usize::MAX, |bytes| bytes / WORD))
    }

    /// Bytes this type takes up in the head section of an enclosing sequence.
    /// Saturates like [`AbiType::static_word_count`].
    pub fn head_size(&self) -> usize {
        self.checked_head_size().unwrap_or(usize::MAX)
    }

    /// [`AbiType::head_size`], failing with [`EncodingError::UnsupportedType`]
    /// when the size does not fit in a `usize`.
    pub fn checked_head_size(&self) -> Result<usize, EncodingError> {
        if self.is_dynamic() {
            Ok(WORD)
        } else {
            self.inline_size()
        }
    }

    /// Size of the head section of this type's own encoding: the whole
    /// encoding for static types, the part before the tails otherwise.
    pub(crate) fn inline_size(&self) -> Result<usize, EncodingError> {
        let size = match self {
            AbiType::FixedArray(inner, len) => inner
                .checked_head_size()
                .ok()
                .and_then(|head| head.checked_mul(*len)),
            AbiType::Tuple(components) => components.iter().try_fold(0usize, |total, c| {
                total.checked_add(c.checked_head_size().ok()?)
            }),
            _ => Some(WORD),
        };
        size.ok_or_else(|| EncodingError::UnsupportedType(format!("{self}: encoded size overflows")))
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Bool => f.write_str("bool"),
            AbiType::Int(bits) => write!(f, "int{bits}"),
            AbiType::Uint(bits) => write!(f, "uint{bits}"),
            AbiType::Address => f.write_str("address"),
            AbiType::FixedBytes(len) => write!(f, "bytes{len}"),
            AbiType::Bytes => f.write_str("bytes"),
            AbiType::String => f.write_str("string"),
            AbiType::Array(inner) => write!(f, "{inner}[]"),
            AbiType::FixedArray(inner, len) => write!(f, "{inner}[{len}]"),
            AbiType::Tuple(components) => {
                f.write_str("(")?;
                for (i, component) in components.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{component}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl FromStr for AbiType {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AbiType::parse(s)
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Unit error: the public entry point reports the whole fragment.
struct Malformed;

fn parse_type(s: &str) -> Result<AbiType, Malformed> {
    let s = s.trim();
    if s.is_empty() {
        return Err(Malformed);
    }

    // Array suffixes only ever contain digits, so the last '[' opens the
    // outermost suffix.
    if let Some(body) = s.strip_suffix(']') {
        let open = body.rfind('[').ok_or(Malformed)?;
        let element = parse_type(&body[..open])?;
        let size = &body[open + 1..];
        if size.is_empty() {
            return Ok(AbiType::Array(Box::new(element)));
        }
        let len = parse_size(size).filter(|&n| n > 0).ok_or(Malformed)?;
        let array = AbiType::FixedArray(Box::new(element), len);
        array.inline_size().map_err(|_| Malformed)?;
        return Ok(array);
    }

    let tuple_body = s.strip_prefix("tuple").unwrap_or(s);
    if let Some(inner) = tuple_body.strip_prefix('(') {
        let body = inner.strip_suffix(')').ok_or(Malformed)?;
        let components = split_components(body)?
            .into_iter()
            .map(parse_type)
            .collect::<Result<Vec<_>, _>>()?;
        let tuple = AbiType::Tuple(components);
        tuple.inline_size().map_err(|_| Malformed)?;
        return Ok(tuple);
    }

    parse_elementary(s)
}

/// Splits a tuple body on top-level commas.
fn split_components(body: &str) -> Result<Vec<&str>, Malformed> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1).ok_or(Malformed)?,
            ',' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(Malformed);
    }
    parts.push(&body[start..]);

    if parts.iter().any(|p| p.trim().is_empty()) {
        return Err(Malformed);
    }
    Ok(parts)
}

fn parse_elementary(s: &str) -> Result<AbiType, Malformed> {
    match s {
        "bool" => return Ok(AbiType::Bool),
        "address" => return Ok(AbiType::Address),
        "string" => return Ok(AbiType::String),
        "bytes" => return Ok(AbiType::Bytes),
        "byte" => return Ok(AbiType::FixedBytes(1)),
        "int" => return Ok(AbiType::Int(256)),
        "uint" | "trcToken" => return Ok(AbiType::Uint(256)),
        _ => {}
    }

    if let Some(width) = s.strip_prefix("uint") {
        return int_width(width).map(AbiType::Uint);
    }
    if let Some(width) = s.strip_prefix("int") {
        return int_width(width).map(AbiType::Int);
    }
    if let Some(len) = s.strip_prefix("bytes") {
        return parse_size(len)
            .filter(|n| (1..=32).contains(n))
            .map(AbiType::FixedBytes)
            .ok_or(Malformed);
    }

    Err(Malformed)
}

fn int_width(digits: &str) -> Result<usize, Malformed> {
    parse_size(digits)
        .filter(|bits| bits % 8 == 0 && (8..=256).contains(bits))
        .ok_or(Malformed)
}

/// Plain decimal without sign or leading zeros.
fn parse_size(digits: &str) -> Option<usize> {
    if digits.is_empty()
        || !digits.bytes().all(|b| b.is_ascii_digit())
        || (digits.len() > 1 && digits.starts_with('0'))
    {
        return None;
    }
    digits.parse().ok()
}
