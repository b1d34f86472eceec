//! EVM payload construction: ABI call data for the two ERC-20 entry points
//! the faucet uses, plus address validation.
//!
//! The custody service signs and broadcasts, so no transaction encoding or
//! gas estimation happens here; only `to`, `value`, and `data` are built.

use crate::domain::error::ValidationError;

/// `transfer(address,uint256)` selector
const TRANSFER_SELECTOR: &str = "a9059cbb";
/// `balanceOf(address)` selector
const BALANCE_OF_SELECTOR: &str = "70a08231";

/// Validate a 0x-prefixed 20-byte hex address
#[must_use]
pub fn is_valid_address(address: &str) -> bool {
    address
        .strip_prefix("0x")
        .and_then(|stripped| hex::decode(stripped).ok())
        .is_some_and(|bytes| bytes.len() == 20)
}

/// Left-pad an address to a 32-byte ABI word, lowercase, no prefix
fn address_word(address: &str) -> Result<String, ValidationError> {
    if !is_valid_address(address) {
        return Err(ValidationError::InvalidAddress(address.to_string()));
    }
    let stripped = address.trim_start_matches("0x").to_lowercase();
    Ok(format!("{:0>64}", stripped))
}

/// ABI-encode `transfer(recipient, amount)` call data
pub fn erc20_transfer_calldata(recipient: &str, amount: u128) -> Result<String, ValidationError> {
    Ok(format!(
        "0x{}{}{:064x}",
        TRANSFER_SELECTOR,
        address_word(recipient)?,
        amount
    ))
}

/// ABI-encode `balanceOf(owner)` call data
pub fn erc20_balance_of_calldata(owner: &str) -> Result<String, ValidationError> {
    Ok(format!("0x{}{}", BALANCE_OF_SELECTOR, address_word(owner)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "0x1234567890AbcdEF1234567890aBcdef12345678";

    #[test]
    fn test_address_validation() {
        assert!(is_valid_address(ADDRESS));
        assert!(is_valid_address(&ADDRESS.to_lowercase()));

        assert!(!is_valid_address("1234567890abcdef1234567890abcdef12345678"));
        assert!(!is_valid_address("0x1234"));
        assert!(!is_valid_address("0xzz34567890abcdef1234567890abcdef12345678"));
        assert!(!is_valid_address(""));
    }

    #[test]
    fn test_transfer_calldata_layout() {
        let data = erc20_transfer_calldata(ADDRESS, 1_500_000).unwrap();
        // 4-byte selector + two 32-byte words
        assert_eq!(data.len(), 2 + 8 + 64 + 64);
        assert!(data.starts_with("0xa9059cbb"));
        assert!(data.contains("1234567890abcdef1234567890abcdef12345678"));
        assert!(data.ends_with(&format!("{:064x}", 1_500_000u128)));
    }

    #[test]
    fn test_balance_of_calldata_layout() {
        let data = erc20_balance_of_calldata(ADDRESS).unwrap();
        assert_eq!(data.len(), 2 + 8 + 64);
        assert!(data.starts_with("0x70a08231"));
    }

    #[test]
    fn test_calldata_rejects_bad_address() {
        assert!(erc20_transfer_calldata("0x1234", 1).is_err());
        assert!(erc20_balance_of_calldata("not-an-address").is_err());
    }
}
