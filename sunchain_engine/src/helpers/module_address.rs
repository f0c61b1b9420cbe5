use blake2::{Blake2b512, Digest};
use sunchain_common::Address;

/// Derives the address of a module-owned account, such as the escrow account, from the module name.
///
/// The address is the hex encoding of the first 20 bytes of `Blake2b512(module_name)`. It is deterministic, so every
/// node derives the same escrow account, and nobody holds a key for it.
pub fn module_address(module_name: &str) -> Address {
    let hash = Blake2b512::digest(module_name.as_bytes());
    Address::from(hex::encode(&hash[..20]))
}
