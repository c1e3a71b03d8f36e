//! Block explorer and marketplace links

use alloy_primitives::Address;

use crate::domain::address::format_address;

pub fn opensea_url(contract: &Address, token_id: &str) -> String {
    format!(
        "https://opensea.io/assets/matic/{}/{}",
        format_address(contract),
        token_id
    )
}

pub fn polygonscan_url(address: &Address) -> String {
    format!("https://polygonscan.com/address/{}", format_address(address))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links() {
        let addr = Address::repeat_byte(0x0f);
        assert_eq!(
            opensea_url(&addr, "12"),
            "https://opensea.io/assets/matic/0x0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f/12"
        );
        assert!(polygonscan_url(&addr).ends_with("/address/0x0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f"));
    }
}
