use bitcoin::{Address, Network, PublicKey, Script, ScriptBuf, script::Instruction};
use tracing::warn;

/// Failure to turn an output script into an address.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The script is not valid hex
    #[error("invalid script hex: {0}")]
    Hex(#[from] hex::FromHexError),
    /// The script does not pay to any standard address type
    #[error("script does not encode a standard address")]
    NoAddress,
}

/// Bitcoin network selected by the network id of a `bitcoin|<id>` chain
/// identifier. Unknown or malformed identifiers select testnet.
fn network_for(chain: &str) -> Network {
    match chain.split_once('|').map(|(_, id)| id) {
        Some("0") => Network::Bitcoin,
        _ => Network::Testnet,
    }
}

/// Decode a hex encoded output script into the address it pays to.
///
/// Scripts without an address form of their own (pay-to-pubkey and bare
/// multisig) resolve to the P2PKH address of their first public key.
pub fn script_to_address(script_hex: &str, chain: &str) -> Result<String, DecodeError> {
    let bytes = hex::decode(script_hex.strip_prefix("0x").unwrap_or(script_hex))?;
    let script = ScriptBuf::from_bytes(bytes);
    let network = network_for(chain);
    if let Ok(address) = Address::from_script(script.as_script(), network) {
        return Ok(address.to_string());
    }
    let key = first_pubkey(script.as_script()).ok_or(DecodeError::NoAddress)?;
    Ok(Address::p2pkh(key.pubkey_hash(), network).to_string())
}

/// First push in the script that parses as a compressed or uncompressed key.
fn first_pubkey(script: &Script) -> Option<PublicKey> {
    script.instructions().map_while(Result::ok).find_map(|ins| match ins {
        Instruction::PushBytes(push) if matches!(push.len(), 33 | 65) => {
            PublicKey::from_slice(push.as_bytes()).ok()
        }
        _ => None,
    })
}

/// Humanize an output script, keeping the raw value when it cannot be decoded.
pub fn humanize_or_raw(script_hex: &str, chain: &str) -> String {
    match script_to_address(script_hex, chain) {
        Ok(address) => address,
        Err(e) => {
            warn!(script = script_hex, chain, error = %e, "Failed to decode output script");
            script_hex.to_owned()
        }
    }
}
