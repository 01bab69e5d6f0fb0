use memento_registry::TxHash;
use memento_types::AccountAddress;
use memento_wallet::NetworkConfig;

/// Block explorer URL builder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExplorerLinks {
    base_url: String,
}

impl ExplorerLinks {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn for_network(network: &NetworkConfig) -> Self {
        Self::new(network.explorer_url.as_str())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transaction_url(&self, tx: &TxHash) -> String {
        format!("{}/tx/{}", self.base_url, tx.to_hex())
    }

    pub fn address_url(&self, address: &AccountAddress) -> String {
        format!("{}/address/{}", self.base_url, address.to_hex())
    }

    /// Page of the deployed registry contract.
    pub fn contract_url(&self, contract: &AccountAddress) -> String {
        self.address_url(contract)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sepolia_links() {
        let links = ExplorerLinks::for_network(&NetworkConfig::sepolia());
        let tx = TxHash::from_bytes([0x11; 32]);
        assert_eq!(
            links.transaction_url(&tx),
            format!("https://sepolia.etherscan.io/tx/0x{}", "11".repeat(32))
        );
        let addr = AccountAddress::from_bytes([0x22; 20]);
        assert_eq!(
            links.address_url(&addr),
            format!("https://sepolia.etherscan.io/address/0x{}", "22".repeat(20))
        );
    }

    #[test]
    fn contract_page_is_an_address_page() {
        let links = ExplorerLinks::for_network(&NetworkConfig::sepolia());
        let contract = AccountAddress::from_bytes([0x33; 20]);
        assert_eq!(
            links.contract_url(&contract),
            format!("https://sepolia.etherscan.io/address/0x{}", "33".repeat(20))
        );
    }

    #[test]
    fn trailing_slash_trimmed() {
        assert_eq!(ExplorerLinks::new("https://explorer.test/").base_url(), "https://explorer.test");
    }
}
