use std::fmt;

use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, VerifyingKey};
use prost::Message;
use tracing::{debug, warn};

use crate::address::TronAddress;
use crate::error::{SigningError, TransactionError, TronError};
use crate::key::KeyPair;
use crate::network::{RecoveryEncoding, MAINNET_PREFIX};
use crate::proto;
use crate::transaction::{compute_id, RawTransaction};

/// Length of a serialized signature: `r || s || v`.
pub const SIGNATURE_LEN: usize = 65;

/// A recoverable secp256k1 signature over a 32-byte prehash.
///
/// `recovery_id` is always the canonical 0 or 1; the on-wire `v` byte is
/// produced by [`to_bytes`](Self::to_bytes) according to a
/// [`RecoveryEncoding`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    r: [u8; 32],
    s: [u8; 32],
    recovery_id: u8,
}

impl Signature {
    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    pub fn recovery_id(&self) -> u8 {
        self.recovery_id
    }

    pub fn to_bytes(&self, encoding: RecoveryEncoding) -> [u8; SIGNATURE_LEN] {
        let mut out = [0u8; SIGNATURE_LEN];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = encoding.encode(self.recovery_id);
        out
    }

    /// Parses a 65-byte `r || s || v` signature.
    ///
    /// # Errors
    ///
    /// [`SigningError::InvalidSignature`] on a wrong length, a `v` byte that
    /// does not fit `encoding`, or an `r`/`s` outside the scalar field.
    pub fn from_bytes(bytes: &[u8], encoding: RecoveryEncoding) -> Result<Self, SigningError> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(SigningError::InvalidSignature(format!(
                "expected {SIGNATURE_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        EcdsaSignature::from_slice(&bytes[..64])
            .map_err(|e| SigningError::InvalidSignature(e.to_string()))?;

        let recovery_id = encoding.decode(bytes[64])?;
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Self { r, s, recovery_id })
    }

    /// Recovers the address that produced this signature over `prehash`.
    pub fn recover(&self, prehash: &[u8; 32], prefix: u8) -> Result<TronAddress, SigningError> {
        let mut rs = [0u8; 64];
        rs[..32].copy_from_slice(&self.r);
        rs[32..].copy_from_slice(&self.s);
        let signature = EcdsaSignature::from_slice(&rs)
            .map_err(|e| SigningError::InvalidSignature(e.to_string()))?;
        let recovery_id = RecoveryId::from_byte(self.recovery_id).ok_or_else(|| {
            SigningError::InvalidSignature(format!("recovery id {}", self.recovery_id))
        })?;
        let verifying_key = VerifyingKey::recover_from_prehash(prehash, &signature, recovery_id)
            .map_err(|e| SigningError::InvalidSignature(e.to_string()))?;
        Ok(TronAddress::from_verifying_key(&verifying_key, prefix))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Signature({}{}, v={})",
            hex::encode(self.r),
            hex::encode(self.s),
            self.recovery_id
        )
    }
}

/// Signs an arbitrary 32-byte digest. The signature is always low-s.
pub(crate) fn sign_prehash(prehash: &[u8; 32], key: &KeyPair) -> Result<Signature, SigningError> {
    let (signature, recovery_id): (EcdsaSignature, RecoveryId) = key
        .signing_key()
        .sign_prehash(prehash)
        .map_err(|e| SigningError::SigningFailed(e.to_string()))?;

    // Recovery ids 2 and 3 mean r overflowed the group order; they have no
    // single-byte encoding on TRON.
    let recovery_id = recovery_id.to_byte();
    if recovery_id > 1 {
        return Err(SigningError::SigningFailed(format!(
            "unencodable recovery id {recovery_id}"
        )));
    }

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&signature.r().to_bytes());
    s.copy_from_slice(&signature.s().to_bytes());
    Ok(Signature { r, s, recovery_id })
}

/// Signs the transaction id. The raw transaction is not modified.
pub fn sign(tx: &RawTransaction, key: &KeyPair) -> Result<Signature, SigningError> {
    let signature = sign_prehash(&tx.id(), key)?;
    debug!(
        txid = %tx.id_hex(),
        signer = %key.address_with_prefix(signer_prefix(tx)),
        "signed transaction"
    );
    Ok(signature)
}

/// Address prefix used when recovering signers of `tx`: the owner's, or
/// mainnet's when the owner cannot be read.
fn signer_prefix(tx: &RawTransaction) -> u8 {
    tx.owner_address()
        .map_or(MAINNET_PREFIX, |owner| owner.prefix())
}

// ---------------------------------------------------------------------------
// Signed transactions
// ---------------------------------------------------------------------------

/// A raw transaction plus zero or more signatures, each from a distinct
/// signer. Signatures can only be appended.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTransaction {
    raw: RawTransaction,
    signatures: Vec<Signature>,
    signers: Vec<TronAddress>,
}

impl SignedTransaction {
    /// Wraps `raw` with no signatures yet.
    pub fn new(raw: RawTransaction) -> Self {
        Self {
            raw,
            signatures: Vec::new(),
            signers: Vec::new(),
        }
    }

    /// Appends a signature.
    ///
    /// # Errors
    ///
    /// [`SigningError::DuplicateSigner`] if the recovered signer already
    /// signed, or [`SigningError::InvalidSignature`] if no signer can be
    /// recovered. The transaction is unchanged on error.
    pub fn add_signature(&mut self, signature: Signature) -> Result<(), SigningError> {
        let signer = signature.recover(&self.raw.id(), signer_prefix(&self.raw))?;
        if self.signers.contains(&signer) {
            warn!(txid = %self.raw.id_hex(), %signer, "rejected duplicate signature");
            return Err(SigningError::DuplicateSigner(signer.to_base58()));
        }
        self.signatures.push(signature);
        self.signers.push(signer);
        Ok(())
    }

    /// Signs with `key` and appends the result.
    pub fn sign_with(&mut self, key: &KeyPair) -> Result<(), SigningError> {
        let signature = sign(&self.raw, key)?;
        self.add_signature(signature)
    }

    pub fn raw(&self) -> &RawTransaction {
        &self.raw
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    /// Recovered signer of each signature, in signature order.
    pub fn signers(&self) -> &[TronAddress] {
        &self.signers
    }

    pub fn id(&self) -> [u8; 32] {
        self.raw.id()
    }

    pub fn id_hex(&self) -> String {
        self.raw.id_hex()
    }

    pub fn is_signed(&self) -> bool {
        !self.signatures.is_empty()
    }

    /// Serializes as a `protocol.Transaction`, ready for `broadcasttransaction`.
    pub fn encode(&self, encoding: RecoveryEncoding) -> Vec<u8> {
        proto::Transaction {
            raw_data: self.raw.raw_bytes().to_vec(),
            signature: self
                .signatures
                .iter()
                .map(|sig| sig.to_bytes(encoding).to_vec())
                .collect(),
        }
        .encode_to_vec()
    }

    /// Parses a serialized `protocol.Transaction`.
    ///
    /// `raw_data` is kept byte for byte, so the id matches whatever the
    /// sender hashed. Every signature is re-checked against that id.
    pub fn decode(bytes: &[u8], encoding: RecoveryEncoding) -> Result<Self, TronError> {
        let tx = proto::Transaction::decode(bytes)
            .map_err(|e| TransactionError::Malformed(e.to_string()))?;
        let raw = RawTransaction::from_raw_bytes(&tx.raw_data)?;

        let mut signed = Self::new(raw);
        for sig in &tx.signature {
            signed.add_signature(Signature::from_bytes(sig, encoding)?)?;
        }
        Ok(signed)
    }
}

/// Attaches `signatures` to `raw`, rejecting a second signature from the
/// same signer.
pub fn attach(
    raw: RawTransaction,
    signatures: impl IntoIterator<Item = Signature>,
) -> Result<SignedTransaction, SigningError> {
    let mut signed = SignedTransaction::new(raw);
    for signature in signatures {
        signed.add_signature(signature)?;
    }
    debug!(
        txid = %signed.id_hex(),
        signatures = signed.signatures.len(),
        "attached signatures"
    );
    Ok(signed)
}

/// Signs with every key in turn and attaches the results.
pub fn sign_all(raw: RawTransaction, keys: &[&KeyPair]) -> Result<SignedTransaction, SigningError> {
    let signatures = keys
        .iter()
        .map(|key| sign(&raw, key))
        .collect::<Result<Vec<_>, _>>()?;
    attach(raw, signatures)
}

/// True if some signature on `signed` recovers to `expected` over a freshly
/// computed transaction id.
pub fn verify(signed: &SignedTransaction, expected: &TronAddress) -> bool {
    let id = compute_id(signed.raw.raw_bytes());
    signed
        .signatures
        .iter()
        .filter_map(|sig| sig.recover(&id, expected.prefix()).ok())
        .any(|signer| signer == *expected)
}

// ---------------------------------------------------------------------------
// Permissions
// ---------------------------------------------------------------------------

/// An account permission: weighted keys and the weight needed to act.
///
/// Mirrors the `owner_permission`/`active_permission` entries of
/// `getaccount`, so callers can tell locally whether a multi-signature
/// transaction has collected enough weight before broadcasting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub id: i32,
    pub threshold: i64,
    pub keys: Vec<(TronAddress, i64)>,
}

impl Permission {
    /// Single-key owner permission (id 0, threshold 1).
    pub fn owner(address: TronAddress) -> Self {
        Self {
            id: 0,
            threshold: 1,
            keys: vec![(address, 1)],
        }
    }

    /// Total weight of the keys that signed `signed`. Zero when the
    /// transaction names a different permission id.
    pub fn approved_weight(&self, signed: &SignedTransaction) -> i64 {
        if signed.raw.permission_id() != self.id {
            return 0;
        }
        self.keys
            .iter()
            .filter(|(address, _)| signed.signers.contains(address))
            .fold(0i64, |total, (_, weight)| total.saturating_add(*weight))
    }

    pub fn is_satisfied(&self, signed: &SignedTransaction) -> bool {
        self.approved_weight(signed) >= self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::TronNetwork;
    use crate::transaction::{build_transfer, build_with, BuildOptions, Instruction, ReferenceBlock};

    fn key(n: u8) -> KeyPair {
        let mut scalar = [0u8; 32];
        scalar[31] = n;
        KeyPair::from_private_key(&scalar).unwrap()
    }

    fn reference() -> ReferenceBlock {
        ReferenceBlock::new([0x11; 32], 0x0102_0304, 1_700_000_000_000)
    }

    fn transfer_from(owner: &KeyPair) -> RawTransaction {
        let network = TronNetwork::mainnet();
        let owner = owner.address(&network).to_base58();
        build_transfer(
            &network,
            &owner,
            "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t",
            1_000_000,
            &reference(),
        )
        .unwrap()
    }

    #[test]
    fn sign_then_verify() {
        let owner = key(1);
        let raw = transfer_from(&owner);
        let signature = sign(&raw, &owner).unwrap();
        let signed = attach(raw, [signature]).unwrap();

        assert!(verify(&signed, &owner.address_with_prefix(MAINNET_PREFIX)));
        assert!(!verify(&signed, &key(2).address_with_prefix(MAINNET_PREFIX)));
        assert_eq!(signed.signers(), &[owner.address_with_prefix(MAINNET_PREFIX)]);
    }

    #[test]
    fn signatures_are_deterministic_and_low_s() {
        let owner = key(1);
        let raw = transfer_from(&owner);
        let a = sign(&raw, &owner).unwrap();
        let b = sign(&raw, &owner).unwrap();
        assert_eq!(a, b);
        // Low-s: the top bit of s is clear for every s <= n/2.
        assert!(a.s()[0] < 0x80);
    }

    #[test]
    fn signing_leaves_raw_untouched() {
        let owner = key(1);
        let raw = transfer_from(&owner);
        let before = raw.clone();
        sign(&raw, &owner).unwrap();
        assert_eq!(raw, before);
    }

    #[test]
    fn duplicate_signer_is_rejected() {
        let owner = key(1);
        let raw = transfer_from(&owner);
        let signature = sign(&raw, &owner).unwrap();
        let err = attach(raw, [signature, signature]).unwrap_err();
        assert_eq!(
            err,
            SigningError::DuplicateSigner("TMVQGm1qAQYVdetCeGRRkTWYYrLXuHK2HC".into())
        );
    }

    #[test]
    fn add_signature_is_unchanged_on_error() {
        let owner = key(1);
        let mut signed = SignedTransaction::new(transfer_from(&owner));
        signed.sign_with(&owner).unwrap();
        assert!(signed.sign_with(&owner).is_err());
        assert_eq!(signed.signatures().len(), 1);
    }

    #[test]
    fn two_distinct_signers() {
        let owner = key(1);
        let cosigner = key(2);
        let signed = sign_all(transfer_from(&owner), &[&owner, &cosigner]).unwrap();
        assert_eq!(signed.signatures().len(), 2);
        assert!(verify(&signed, &owner.address_with_prefix(MAINNET_PREFIX)));
        assert!(verify(&signed, &cosigner.address_with_prefix(MAINNET_PREFIX)));
    }

    #[test]
    fn recovery_byte_encodings() {
        let owner = key(1);
        let raw = transfer_from(&owner);
        let signature = sign(&raw, &owner).unwrap();

        let raw_form = signature.to_bytes(RecoveryEncoding::Raw);
        let offset_form = signature.to_bytes(RecoveryEncoding::Offset27);
        assert!(raw_form[64] <= 1);
        assert_eq!(offset_form[64], raw_form[64] + 27);
        assert_eq!(&raw_form[..64], &offset_form[..64]);

        assert_eq!(
            Signature::from_bytes(&offset_form, RecoveryEncoding::Offset27).unwrap(),
            signature
        );
        assert!(Signature::from_bytes(&offset_form, RecoveryEncoding::Raw).is_err());
        assert!(Signature::from_bytes(&raw_form[..64], RecoveryEncoding::Raw).is_err());
    }

    #[test]
    fn zero_signature_is_invalid() {
        let err = Signature::from_bytes(&[0u8; 65], RecoveryEncoding::Raw).unwrap_err();
        assert!(matches!(err, SigningError::InvalidSignature(_)));
    }

    #[test]
    fn wire_form_keeps_raw_bytes_and_signatures() {
        let owner = key(1);
        let signed = sign_all(transfer_from(&owner), &[&owner]).unwrap();
        let bytes = signed.encode(RecoveryEncoding::Raw);

        let decoded = SignedTransaction::decode(&bytes, RecoveryEncoding::Raw).unwrap();
        assert_eq!(decoded, signed);
        assert_eq!(decoded.id(), signed.id());
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(SignedTransaction::decode(&[0xff, 0xff], RecoveryEncoding::Raw).is_err());
    }

    #[test]
    fn permission_weights() {
        let a = key(1);
        let b = key(2);
        let c = key(3);
        let permission = Permission {
            id: 2,
            threshold: 3,
            keys: vec![
                (a.address_with_prefix(MAINNET_PREFIX), 2),
                (b.address_with_prefix(MAINNET_PREFIX), 1),
                (c.address_with_prefix(MAINNET_PREFIX), 1),
            ],
        };

        let to: TronAddress = "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t".parse().unwrap();
        let options = BuildOptions {
            permission_id: 2,
            ..Default::default()
        };
        let reference = reference();
        let raw = build_with(
            &Instruction::Transfer {
                owner: a.address_with_prefix(MAINNET_PREFIX),
                to,
                amount: 1,
            },
            reference.timestamp + 60_000,
            0,
            &reference,
            &options,
        )
        .unwrap();

        let mut signed = SignedTransaction::new(raw);
        signed.sign_with(&a).unwrap();
        assert_eq!(permission.approved_weight(&signed), 2);
        assert!(!permission.is_satisfied(&signed));

        signed.sign_with(&c).unwrap();
        assert!(permission.is_satisfied(&signed));

        let owner_only = Permission::owner(a.address_with_prefix(MAINNET_PREFIX));
        assert_eq!(owner_only.approved_weight(&signed), 0);
    }

    #[test]
    fn approved_weight_saturates() {
        let (a, b) = (key(1), key(2));
        let permission = Permission {
            id: 0,
            threshold: i64::MAX,
            keys: vec![
                (a.address_with_prefix(MAINNET_PREFIX), i64::MAX),
                (b.address_with_prefix(MAINNET_PREFIX), i64::MAX),
            ],
        };

        let mut signed = SignedTransaction::new(transfer_from(&a));
        signed.sign_with(&a).unwrap();
        signed.sign_with(&b).unwrap();
        assert_eq!(permission.approved_weight(&signed), i64::MAX);
        assert!(permission.is_satisfied(&signed));
    }
}
