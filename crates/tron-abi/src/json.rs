//! Contract ABI loading from JSON.
//!
//! Accepts the plain Solidity compiler array form as well as the object
//! form returned by TRON nodes (`{"entrys": [...]}`, possibly nested under
//! an `"abi"` key). Node output capitalizes entry kinds (`"Function"`,
//! `"Event"`), so kinds are matched case-insensitively.

use serde::Deserialize;
use serde_json::Value;

use crate::error::EncodingError;
use crate::function::{event_topic, FunctionSignature};
use crate::types::AbiType;

/// A named, typed parameter of a function or event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    /// Canonical type name.
    pub ty: String,
    pub kind: AbiType,
    pub indexed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiFunction {
    pub name: String,
    pub inputs: Vec<Param>,
    pub outputs: Vec<Param>,
    pub state_mutability: Option<String>,
}

impl AbiFunction {
    pub fn signature(&self) -> FunctionSignature {
        FunctionSignature::new(self.name.clone(), kinds(&self.inputs))
            .with_outputs(kinds(&self.outputs))
    }

    /// Whether the function can be evaluated with a constant (read-only) call.
    pub fn is_constant(&self) -> bool {
        matches!(
            self.state_mutability.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("view" | "pure")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiEvent {
    pub name: String,
    pub inputs: Vec<Param>,
    pub anonymous: bool,
}

impl AbiEvent {
    pub fn signature(&self) -> FunctionSignature {
        FunctionSignature::new(self.name.clone(), kinds(&self.inputs))
    }

    /// Topic 0, or `None` for anonymous events.
    pub fn topic(&self) -> Option<[u8; 32]> {
        if self.anonymous {
            return None;
        }
        event_topic(&self.signature().signature()).ok()
    }
}

/// The callable surface of a deployed contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractAbi {
    pub constructor: Option<Vec<Param>>,
    pub functions: Vec<AbiFunction>,
    pub events: Vec<AbiEvent>,
}

impl ContractAbi {
    pub fn from_json(json: &str) -> Result<Self, EncodingError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| EncodingError::InvalidAbi(e.to_string()))?;
        let mut abi = ContractAbi::default();

        for entry in entries(value)? {
            let kind = entry
                .kind
                .as_deref()
                .unwrap_or("function")
                .to_ascii_lowercase();
            match kind.as_str() {
                "function" => abi.functions.push(AbiFunction {
                    name: entry.name.ok_or_else(|| missing("function name"))?,
                    inputs: params(entry.inputs)?,
                    outputs: params(entry.outputs)?,
                    state_mutability: entry.state_mutability,
                }),
                "event" => abi.events.push(AbiEvent {
                    name: entry.name.ok_or_else(|| missing("event name"))?,
                    inputs: params(entry.inputs)?,
                    anonymous: entry.anonymous,
                }),
                "constructor" => abi.constructor = Some(params(entry.inputs)?),
                // fallback, receive and error entries carry nothing callable.
                _ => {}
            }
        }

        Ok(abi)
    }

    /// First function with the given name. Overloads are reachable through
    /// [`functions_named`](Self::functions_named).
    pub fn function(&self, name: &str) -> Option<&AbiFunction> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn functions_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a AbiFunction> {
        self.functions.iter().filter(move |f| f.name == name)
    }

    pub fn event(&self, name: &str) -> Option<&AbiEvent> {
        self.events.iter().find(|e| e.name == name)
    }

    /// Constructor input types; empty when the ABI declares no constructor.
    pub fn constructor_types(&self) -> Vec<AbiType> {
        self.constructor.as_deref().map(kinds).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Raw JSON shapes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RawEntry {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    inputs: Vec<RawParam>,
    #[serde(default)]
    outputs: Vec<RawParam>,
    #[serde(rename = "stateMutability", default)]
    state_mutability: Option<String>,
    #[serde(default)]
    anonymous: bool,
}

#[derive(Deserialize)]
struct RawParam {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    components: Vec<RawParam>,
    #[serde(default)]
    indexed: bool,
}

fn entries(value: Value) -> Result<Vec<RawEntry>, EncodingError> {
    match value {
        Value::Array(_) => {
            serde_json::from_value(value).map_err(|e| EncodingError::InvalidAbi(e.to_string()))
        }
        Value::Object(mut map) => match map.remove("entrys").or_else(|| map.remove("abi")) {
            Some(inner) => entries(inner),
            // A node returns `{}` for a contract deployed without an ABI.
            None if map.is_empty() => Ok(Vec::new()),
            None => Err(missing("entry list")),
        },
        _ => Err(EncodingError::InvalidAbi("expected an array or object".into())),
    }
}

fn params(raw: Vec<RawParam>) -> Result<Vec<Param>, EncodingError> {
    raw.into_iter()
        .map(|p| {
            let kind = resolve(&p)?;
            Ok(Param {
                name: p.name,
                ty: kind.to_string(),
                kind,
                indexed: p.indexed,
            })
        })
        .collect()
}

/// Resolves a parameter type, expanding `tuple`, `tuple[]`, `tuple[2][]`...
/// from the parameter's `components`.
fn resolve(param: &RawParam) -> Result<AbiType, EncodingError> {
    match param.ty.strip_prefix("tuple") {
        Some(suffix) if suffix.is_empty() || suffix.starts_with('[') => {
            let components = param
                .components
                .iter()
                .map(resolve)
                .collect::<Result<Vec<_>, _>>()?;
            let tuple = AbiType::Tuple(components);
            AbiType::parse(&format!("{tuple}{suffix}"))
        }
        _ => AbiType::parse(&param.ty),
    }
}

fn kinds(params: &[Param]) -> Vec<AbiType> {
    params.iter().map(|p| p.kind.clone()).collect()
}

fn missing(what: &str) -> EncodingError {
    EncodingError::InvalidAbi(format!("missing {what}"))
}
