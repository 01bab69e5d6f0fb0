use serde::{Deserialize, Serialize};

/// A network a wallet can be switched to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub name: String,
    pub rpc_url: String,
    /// Block explorer base URL, without a trailing slash.
    pub explorer_url: String,
    pub currency_symbol: String,
}

impl NetworkConfig {
    /// Ethereum Sepolia testnet, where the registry contract is deployed.
    pub fn sepolia() -> Self {
        Self {
            chain_id: 11_155_111,
            name: "Sepolia Testnet".into(),
            rpc_url: "https://rpc.sepolia.org".into(),
            explorer_url: "https://sepolia.etherscan.io".into(),
            currency_symbol: "SEP".into(),
        }
    }

    /// Local development chain.
    pub fn localhost() -> Self {
        Self {
            chain_id: 31_337,
            name: "Localhost".into(),
            rpc_url: "http://127.0.0.1:8545".into(),
            explorer_url: "http://127.0.0.1:8545".into(),
            currency_symbol: "ETH".into(),
        }
    }

    /// Chain id in the `0x`-prefixed hex form wallets exchange.
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::sepolia()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sepolia_defaults() {
        let net = NetworkConfig::default();
        assert_eq!(net.chain_id, 11_155_111);
        assert_eq!(net.chain_id_hex(), "0xaa36a7");
        assert_eq!(net.explorer_url, "https://sepolia.etherscan.io");
    }

    #[test]
    fn deserializes_from_config() {
        let net: NetworkConfig = serde_json::from_str(
            r#"{"chain_id":1,"name":"Mainnet","rpc_url":"https://eth.example","explorer_url":"https://etherscan.io","currency_symbol":"ETH"}"#,
        )
        .unwrap();
        assert_eq!(net.chain_id_hex(), "0x1");
    }
}
