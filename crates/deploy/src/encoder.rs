//! ABI encoding of constructor arguments.
//!
//! The encoded payload is persisted next to the address artifact so the
//! contract can be verified manually on an explorer later. Encoding is
//! best-effort: a contract without constructor metadata, or deployed without
//! arguments, simply has nothing to declare.

use alloy_dyn_abi::{DynSolValue, JsonAbiExt};
use alloy_json_abi::JsonAbi;

/// Why constructor-argument encoding produced no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No constructor arguments were passed at deploy time.
    NoArgs,
    /// The contract ABI declares no constructor to encode against.
    NoConstructor,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoArgs => write!(f, "no constructor arguments"),
            SkipReason::NoConstructor => write!(f, "no constructor in ABI"),
        }
    }
}

/// Result of a constructor-argument encoding attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedArgs {
    /// A non-empty ABI-encoded payload ready to persist.
    Encoded(Vec<u8>),
    /// Nothing to persist, with the reason the encoding was skipped.
    Skipped(SkipReason),
}

/// Encode `args` against the constructor declared in `abi`.
///
/// Returns [`EncodedArgs::Skipped`] instead of failing when there is nothing
/// to encode; a type or arity mismatch against the declared constructor
/// parameters is a real error.
pub fn encode_constructor_args(
    abi: &JsonAbi,
    args: &[DynSolValue],
) -> Result<EncodedArgs, alloy_dyn_abi::Error> {
    if args.is_empty() {
        return Ok(EncodedArgs::Skipped(SkipReason::NoArgs));
    }

    let Some(constructor) = abi.constructor() else {
        return Ok(EncodedArgs::Skipped(SkipReason::NoConstructor));
    };

    let encoded = constructor.abi_encode_input(args)?;
    if encoded.is_empty() {
        return Ok(EncodedArgs::Skipped(SkipReason::NoArgs));
    }

    Ok(EncodedArgs::Encoded(encoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, U256};

    fn abi_with_constructor(json: &str) -> JsonAbi {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_empty_args_are_skipped() {
        let abi = abi_with_constructor(
            r#"[{"type": "constructor", "stateMutability": "nonpayable", "inputs": []}]"#,
        );

        let result = encode_constructor_args(&abi, &[]).unwrap();
        assert_eq!(result, EncodedArgs::Skipped(SkipReason::NoArgs));
    }

    #[test]
    fn test_missing_constructor_is_skipped() {
        let abi = abi_with_constructor("[]");
        let args = [DynSolValue::Uint(U256::from(10_000u64), 256)];

        let result = encode_constructor_args(&abi, &args).unwrap();
        assert_eq!(result, EncodedArgs::Skipped(SkipReason::NoConstructor));
    }

    #[test]
    fn test_encodes_supply_argument() {
        let abi = abi_with_constructor(
            r#"[{
                "type": "constructor",
                "stateMutability": "nonpayable",
                "inputs": [{"name": "_totalSupply", "type": "uint256", "internalType": "uint256"}]
            }]"#,
        );
        let args = [DynSolValue::Uint(U256::from(10_000u64), 256)];

        match encode_constructor_args(&abi, &args).unwrap() {
            EncodedArgs::Encoded(bytes) => {
                assert_eq!(bytes.len(), 32, "One uint256 encodes to a single word");
                assert_eq!(U256::from_be_slice(&bytes), U256::from(10_000u64));
            }
            other => panic!("Expected Encoded, got {:?}", other),
        }
    }

    #[test]
    fn test_encodes_vendor_constructor() {
        let abi = abi_with_constructor(
            r#"[{
                "type": "constructor",
                "stateMutability": "nonpayable",
                "inputs": [
                    {"name": "_buyPrice", "type": "uint256", "internalType": "uint256"},
                    {"name": "_sellPrice", "type": "uint256", "internalType": "uint256"},
                    {"name": "_token", "type": "address", "internalType": "address"}
                ]
            }]"#,
        );
        let token = Address::repeat_byte(0x42);
        let args = [
            DynSolValue::Uint(U256::from(100u64), 256),
            DynSolValue::Uint(U256::from(100u64), 256),
            DynSolValue::Address(token),
        ];

        match encode_constructor_args(&abi, &args).unwrap() {
            EncodedArgs::Encoded(bytes) => {
                assert_eq!(bytes.len(), 96, "Three words for three static params");
                // The address occupies the low 20 bytes of the last word.
                assert_eq!(&bytes[76..96], token.as_slice());
            }
            other => panic!("Expected Encoded, got {:?}", other),
        }
    }

    #[test]
    fn test_arity_mismatch_is_an_error() {
        let abi = abi_with_constructor(
            r#"[{
                "type": "constructor",
                "stateMutability": "nonpayable",
                "inputs": [
                    {"name": "_buyPrice", "type": "uint256", "internalType": "uint256"},
                    {"name": "_sellPrice", "type": "uint256", "internalType": "uint256"}
                ]
            }]"#,
        );
        let args = [DynSolValue::Uint(U256::from(100u64), 256)];

        assert!(encode_constructor_args(&abi, &args).is_err());
    }
}
