//! Output prefixes that tag each envelope with the key that produced it.

use common::protocol::OutputPrefixType;

/// Size of a non-raw prefix: one start byte plus a big-endian `u32` key id.
pub const NON_RAW_PREFIX_SIZE: usize = 5;

/// Start byte for [`OutputPrefixType::Tink`].
pub const TINK_START_BYTE: u8 = 0x01;

/// Start byte for [`OutputPrefixType::Legacy`] and [`OutputPrefixType::Crunchy`].
pub const LEGACY_START_BYTE: u8 = 0x00;

/// Prefix length in bytes for `mode`.
pub fn prefix_len(mode: OutputPrefixType) -> usize {
    match mode {
        OutputPrefixType::Raw => 0,
        OutputPrefixType::Tink | OutputPrefixType::Legacy | OutputPrefixType::Crunchy => {
            NON_RAW_PREFIX_SIZE
        }
    }
}

/// Build the prefix for a key with id `key_id` under `mode`.
pub fn output_prefix(key_id: u32, mode: OutputPrefixType) -> Vec<u8> {
    let start = match mode {
        OutputPrefixType::Raw => return Vec::new(),
        OutputPrefixType::Tink => TINK_START_BYTE,
        OutputPrefixType::Legacy | OutputPrefixType::Crunchy => LEGACY_START_BYTE,
    };
    let mut prefix = Vec::with_capacity(NON_RAW_PREFIX_SIZE);
    prefix.push(start);
    prefix.extend_from_slice(&key_id.to_be_bytes());
    prefix
}
