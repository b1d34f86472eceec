//! Chain registry: the single source of truth mapping a chain key and network
//! mode to every derived fact the other components need (CAIP-2 namespace,
//! explorer, custody alias or RPC endpoint, token decimals, contract
//! addresses, gas sponsorship).
//!
//! The table is static and read-only after process start; all lookups are
//! pure. Adding a chain means adding one `ChainDescriptor` entry here and
//! nothing else.

use crate::domain::{ChainFamily, NetworkMode};

/// Token symbol and fixed decimal precision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenDescriptor {
    pub symbol: &'static str,
    pub decimals: u8,
}

/// Stablecoin facts, with per-mode contract/mint addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stablecoin {
    pub symbol: &'static str,
    pub decimals: u8,
    pub mainnet_address: Option<&'static str>,
    pub testnet_address: Option<&'static str>,
}

/// How a network is reached for balance queries and sends.
///
/// `Custody` networks are fully handled by the custody provider under the
/// given alias. `RawRpc` networks are outside the provider's coverage and
/// must be queried over JSON-RPC directly. `Both` carries the custody alias
/// plus an RPC endpoint for lookups the provider does not expose (e.g.
/// Solana account existence).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkEndpoint {
    Custody { alias: &'static str },
    RawRpc { url: &'static str },
    Both {
        alias: &'static str,
        url: &'static str,
    },
}

impl NetworkEndpoint {
    #[must_use]
    pub fn custody_alias(&self) -> Option<&'static str> {
        match self {
            Self::Custody { alias } | Self::Both { alias, .. } => Some(alias),
            Self::RawRpc { .. } => None,
        }
    }

    #[must_use]
    pub fn rpc_url(&self) -> Option<&'static str> {
        match self {
            Self::RawRpc { url } | Self::Both { url, .. } => Some(url),
            Self::Custody { .. } => None,
        }
    }
}

/// Per-network configuration for one chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConfig {
    /// CAIP-2 chain namespace (`<namespace>:<reference>`)
    pub caip2: &'static str,
    pub explorer_url: &'static str,
    pub explorer_suffix: Option<&'static str>,
    pub endpoint: NetworkEndpoint,
    /// Whether the custody service covers gas on this network
    pub gas_sponsorship: bool,
}

/// One logical chain with its per-mode networks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainDescriptor {
    pub key: &'static str,
    pub name: &'static str,
    pub family: ChainFamily,
    pub native: TokenDescriptor,
    pub stablecoin: Option<Stablecoin>,
    pub mainnet: Option<NetworkConfig>,
    pub testnet: Option<NetworkConfig>,
}

impl ChainDescriptor {
    #[must_use]
    pub fn network(&self, mode: NetworkMode) -> Option<&NetworkConfig> {
        match mode {
            NetworkMode::Mainnet => self.mainnet.as_ref(),
            NetworkMode::Testnet => self.testnet.as_ref(),
        }
    }
}

const USDC_EVM: Stablecoin = Stablecoin {
    symbol: "usdc",
    decimals: 6,
    mainnet_address: None,
    testnet_address: None,
};

static CHAINS: &[ChainDescriptor] = &[
    ChainDescriptor {
        key: "ethereum",
        name: "Ethereum",
        family: ChainFamily::Ethereum,
        native: TokenDescriptor {
            symbol: "ETH",
            decimals: 18,
        },
        stablecoin: Some(Stablecoin {
            mainnet_address: Some("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
            testnet_address: Some("0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238"),
            ..USDC_EVM
        }),
        mainnet: Some(NetworkConfig {
            caip2: "eip155:1",
            explorer_url: "https://etherscan.io/tx/",
            explorer_suffix: None,
            endpoint: NetworkEndpoint::Custody { alias: "ethereum" },
            gas_sponsorship: false,
        }),
        testnet: Some(NetworkConfig {
            caip2: "eip155:11155111",
            explorer_url: "https://sepolia.etherscan.io/tx/",
            explorer_suffix: None,
            endpoint: NetworkEndpoint::Custody { alias: "sepolia" },
            gas_sponsorship: false,
        }),
    },
    ChainDescriptor {
        key: "base",
        name: "Base",
        family: ChainFamily::Ethereum,
        native: TokenDescriptor {
            symbol: "ETH",
            decimals: 18,
        },
        stablecoin: Some(Stablecoin {
            mainnet_address: Some("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
            testnet_address: Some("0x036CbD53842c5426634e7929541eC2318f3dCF7e"),
            ..USDC_EVM
        }),
        mainnet: Some(NetworkConfig {
            caip2: "eip155:8453",
            explorer_url: "https://basescan.org/tx/",
            explorer_suffix: None,
            endpoint: NetworkEndpoint::Custody { alias: "base" },
            gas_sponsorship: false,
        }),
        testnet: Some(NetworkConfig {
            caip2: "eip155:84532",
            explorer_url: "https://sepolia.basescan.org/tx/",
            explorer_suffix: None,
            endpoint: NetworkEndpoint::Custody {
                alias: "base_sepolia",
            },
            gas_sponsorship: true,
        }),
    },
    ChainDescriptor {
        key: "optimism",
        name: "Optimism",
        family: ChainFamily::Ethereum,
        native: TokenDescriptor {
            symbol: "ETH",
            decimals: 18,
        },
        stablecoin: Some(Stablecoin {
            mainnet_address: Some("0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85"),
            testnet_address: Some("0x5fd84259d66Cd46123540766Be93DFE6D43130D7"),
            ..USDC_EVM
        }),
        mainnet: Some(NetworkConfig {
            caip2: "eip155:10",
            explorer_url: "https://optimistic.etherscan.io/tx/",
            explorer_suffix: None,
            endpoint: NetworkEndpoint::Custody { alias: "optimism" },
            gas_sponsorship: false,
        }),
        testnet: Some(NetworkConfig {
            caip2: "eip155:11155420",
            explorer_url: "https://sepolia-optimism.etherscan.io/tx/",
            explorer_suffix: None,
            endpoint: NetworkEndpoint::Custody {
                alias: "optimism_sepolia",
            },
            gas_sponsorship: true,
        }),
    },
    ChainDescriptor {
        key: "arbitrum",
        name: "Arbitrum",
        family: ChainFamily::Ethereum,
        native: TokenDescriptor {
            symbol: "ETH",
            decimals: 18,
        },
        stablecoin: Some(Stablecoin {
            mainnet_address: Some("0xaf88d065e77c8cC2239327C5EDb3A432268e5831"),
            testnet_address: Some("0x75faf114eafb1BDbe2F0316DF893fd58CE46AA4d"),
            ..USDC_EVM
        }),
        mainnet: Some(NetworkConfig {
            caip2: "eip155:42161",
            explorer_url: "https://arbiscan.io/tx/",
            explorer_suffix: None,
            endpoint: NetworkEndpoint::Custody { alias: "arbitrum" },
            gas_sponsorship: false,
        }),
        testnet: Some(NetworkConfig {
            caip2: "eip155:421614",
            explorer_url: "https://sepolia.arbiscan.io/tx/",
            explorer_suffix: None,
            endpoint: NetworkEndpoint::Custody {
                alias: "arbitrum_sepolia",
            },
            gas_sponsorship: false,
        }),
    },
    // Native-token-only faucet on Polygon; no USDC dispensing here.
    ChainDescriptor {
        key: "polygon",
        name: "Polygon",
        family: ChainFamily::Ethereum,
        native: TokenDescriptor {
            symbol: "POL",
            decimals: 18,
        },
        stablecoin: None,
        mainnet: Some(NetworkConfig {
            caip2: "eip155:137",
            explorer_url: "https://polygonscan.com/tx/",
            explorer_suffix: None,
            endpoint: NetworkEndpoint::Custody { alias: "polygon" },
            gas_sponsorship: false,
        }),
        testnet: Some(NetworkConfig {
            caip2: "eip155:80002",
            explorer_url: "https://amoy.polygonscan.com/tx/",
            explorer_suffix: None,
            endpoint: NetworkEndpoint::Custody {
                alias: "polygon_amoy",
            },
            gas_sponsorship: false,
        }),
    },
    // Outside custody coverage; balances come from raw JSON-RPC. Testnet only.
    ChainDescriptor {
        key: "monad",
        name: "Monad",
        family: ChainFamily::Ethereum,
        native: TokenDescriptor {
            symbol: "MON",
            decimals: 18,
        },
        stablecoin: Some(Stablecoin {
            mainnet_address: None,
            testnet_address: Some("0xf817257fed379853cDe0fa4F97AB987181B1E5Ea"),
            ..USDC_EVM
        }),
        mainnet: None,
        testnet: Some(NetworkConfig {
            caip2: "eip155:10143",
            explorer_url: "https://testnet.monadexplorer.com/tx/",
            explorer_suffix: None,
            endpoint: NetworkEndpoint::RawRpc {
                url: "https://testnet-rpc.monad.xyz",
            },
            gas_sponsorship: false,
        }),
    },
    ChainDescriptor {
        key: "solana",
        name: "Solana",
        family: ChainFamily::Solana,
        native: TokenDescriptor {
            symbol: "SOL",
            decimals: 9,
        },
        stablecoin: Some(Stablecoin {
            symbol: "usdc",
            decimals: 6,
            mainnet_address: Some("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"),
            testnet_address: Some("4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU"),
        }),
        mainnet: Some(NetworkConfig {
            caip2: "solana:5eykt4UsFv8P8NJdTREpY1vzqKqZKvdpKuc147dw2N9d",
            explorer_url: "https://explorer.solana.com/tx/",
            explorer_suffix: None,
            endpoint: NetworkEndpoint::Both {
                alias: "solana",
                url: "https://api.mainnet-beta.solana.com",
            },
            gas_sponsorship: false,
        }),
        testnet: Some(NetworkConfig {
            caip2: "solana:EtWTRABZaYq6iMfeYKouRu166VU2xqa1",
            explorer_url: "https://explorer.solana.com/tx/",
            explorer_suffix: Some("?cluster=devnet"),
            endpoint: NetworkEndpoint::Both {
                alias: "solana_devnet",
                url: "https://api.devnet.solana.com",
            },
            gas_sponsorship: true,
        }),
    },
];

/// All registered chains
#[must_use]
pub fn chains() -> &'static [ChainDescriptor] {
    CHAINS
}

/// Look up a chain by key
#[must_use]
pub fn chain(chain_key: &str) -> Option<&'static ChainDescriptor> {
    CHAINS.iter().find(|c| c.key == chain_key)
}

/// Resolve a chain key and network mode to its network configuration.
/// `None` means unknown chain or unsupported mode; callers must treat this
/// as a client error, not a crash.
#[must_use]
pub fn resolve(chain_key: &str, mode: NetworkMode) -> Option<&'static NetworkConfig> {
    chain(chain_key).and_then(|c| match mode {
        NetworkMode::Mainnet => c.mainnet.as_ref(),
        NetworkMode::Testnet => c.testnet.as_ref(),
    })
}

/// Native token facts for a chain
#[must_use]
pub fn native_token(chain_key: &str) -> Option<&'static TokenDescriptor> {
    chain(chain_key).map(|c| &c.native)
}

/// Stablecoin contract/mint address for a chain and mode, if supported
#[must_use]
pub fn stablecoin_address(chain_key: &str, mode: NetworkMode) -> Option<&'static str> {
    chain(chain_key)
        .and_then(|c| c.stablecoin.as_ref())
        .and_then(|s| match mode {
            NetworkMode::Mainnet => s.mainnet_address,
            NetworkMode::Testnet => s.testnet_address,
        })
}

/// Whether the custody service sponsors gas on this chain/network
#[must_use]
pub fn supports_gas_sponsorship(chain_key: &str, mode: NetworkMode) -> bool {
    resolve(chain_key, mode).is_some_and(|n| n.gas_sponsorship)
}

/// Build an explorer URL for a transaction hash on a chain/network
#[must_use]
pub fn explorer_url(chain_key: &str, mode: NetworkMode, tx_hash: &str) -> Option<String> {
    resolve(chain_key, mode).map(|n| format_explorer(n, tx_hash))
}

/// Reverse lookup by CAIP-2 namespace; the status tracker only knows the
/// namespace carried on the custody record, not the logical chain key.
#[must_use]
pub fn explorer_url_by_caip2(caip2: &str, tx_hash: &str) -> Option<String> {
    CHAINS
        .iter()
        .flat_map(|c| [c.mainnet.as_ref(), c.testnet.as_ref()])
        .flatten()
        .find(|n| n.caip2 == caip2)
        .map(|n| format_explorer(n, tx_hash))
}

fn format_explorer(network: &NetworkConfig, tx_hash: &str) -> String {
    format!(
        "{}{}{}",
        network.explorer_url,
        tx_hash,
        network.explorer_suffix.unwrap_or("")
    )
}

/// Custody network aliases for one mode, partitioned by wallet family
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustodyAliases {
    pub evm: Vec<&'static str>,
    pub solana: Vec<&'static str>,
}

/// Aliases for every network the custody provider supports in this mode,
/// used to batch-query its bulk balance endpoint per wallet family.
#[must_use]
pub fn custody_aliases_by_family(mode: NetworkMode) -> CustodyAliases {
    let mut aliases = CustodyAliases::default();
    for c in CHAINS {
        if let Some(alias) = c.network(mode).and_then(|n| n.endpoint.custody_alias()) {
            match c.family {
                ChainFamily::Ethereum => aliases.evm.push(alias),
                ChainFamily::Solana => aliases.solana.push(alias),
            }
        }
    }
    aliases
}

/// Lowercase asset symbols the custody bulk endpoint should be asked for,
/// per wallet family: every native symbol plus usdc where configured.
#[must_use]
pub fn custody_assets_by_family(family: ChainFamily) -> Vec<String> {
    let mut assets: Vec<String> = Vec::new();
    let mut has_stablecoin = false;
    for c in CHAINS.iter().filter(|c| c.family == family) {
        let custody_backed = [c.mainnet.as_ref(), c.testnet.as_ref()]
            .into_iter()
            .flatten()
            .any(|n| n.endpoint.custody_alias().is_some());
        if !custody_backed {
            continue;
        }
        let symbol = c.native.symbol.to_lowercase();
        if !assets.contains(&symbol) {
            assets.push(symbol);
        }
        if c.stablecoin.is_some() {
            has_stablecoin = true;
        }
    }
    if has_stablecoin {
        assets.push("usdc".to_string());
    }
    assets
}

/// A chain whose balances must be fetched over raw JSON-RPC because the
/// custody provider does not cover it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcChain {
    pub chain_key: String,
    /// Key used for balance entries, mode-qualified like custody aliases
    pub balance_key: String,
    pub rpc_url: String,
    pub symbol: String,
    pub decimals: u8,
    pub stablecoin_address: Option<String>,
    pub stablecoin_decimals: u8,
}

/// Chains in the given mode with no custody alias (RPC-only)
#[must_use]
pub fn rpc_only_chains(mode: NetworkMode) -> Vec<RpcChain> {
    CHAINS
        .iter()
        .filter_map(|c| {
            let network = c.network(mode)?;
            if network.endpoint.custody_alias().is_some() {
                return None;
            }
            let url = network.endpoint.rpc_url()?;
            let balance_key = match mode {
                NetworkMode::Mainnet => c.key.to_string(),
                NetworkMode::Testnet => format!("{}_testnet", c.key),
            };
            Some(RpcChain {
                chain_key: c.key.to_string(),
                balance_key,
                rpc_url: url.to_string(),
                symbol: c.native.symbol.to_lowercase(),
                decimals: c.native.decimals,
                stablecoin_address: stablecoin_address(c.key, mode).map(str::to_string),
                stablecoin_decimals: c.stablecoin.map_or(6, |s| s.decimals),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_network_has_caip2_and_explorer() {
        for c in chains() {
            for mode in [NetworkMode::Mainnet, NetworkMode::Testnet] {
                if let Some(network) = resolve(c.key, mode) {
                    assert!(!network.caip2.is_empty(), "{} {} caip2", c.key, mode);
                    assert!(
                        network.explorer_url.starts_with("https://"),
                        "{} {} explorer",
                        c.key,
                        mode
                    );
                }
            }
        }
    }

    #[test]
    fn test_custody_absent_implies_rpc_endpoint() {
        for c in chains() {
            for mode in [NetworkMode::Mainnet, NetworkMode::Testnet] {
                if let Some(network) = resolve(c.key, mode) {
                    if network.endpoint.custody_alias().is_none() {
                        assert!(
                            network.endpoint.rpc_url().is_some(),
                            "{} {} has neither custody alias nor RPC endpoint",
                            c.key,
                            mode
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_resolve_unknown_chain_or_mode() {
        assert!(resolve("dogechain", NetworkMode::Testnet).is_none());
        // Monad is testnet-only
        assert!(resolve("monad", NetworkMode::Mainnet).is_none());
        assert!(resolve("monad", NetworkMode::Testnet).is_some());
    }

    #[test]
    fn test_lookups_are_idempotent() {
        let first = resolve("base", NetworkMode::Testnet).unwrap();
        let second = resolve("base", NetworkMode::Testnet).unwrap();
        assert_eq!(first, second);

        assert_eq!(
            custody_aliases_by_family(NetworkMode::Testnet),
            custody_aliases_by_family(NetworkMode::Testnet)
        );
        assert_eq!(
            rpc_only_chains(NetworkMode::Testnet),
            rpc_only_chains(NetworkMode::Testnet)
        );
    }

    #[test]
    fn test_native_token_decimals() {
        assert_eq!(native_token("ethereum").unwrap().decimals, 18);
        assert_eq!(native_token("solana").unwrap().decimals, 9);
        assert_eq!(native_token("polygon").unwrap().symbol, "POL");
        assert!(native_token("dogechain").is_none());
    }

    #[test]
    fn test_stablecoin_addresses() {
        assert!(stablecoin_address("base", NetworkMode::Testnet).is_some());
        assert!(stablecoin_address("solana", NetworkMode::Mainnet).is_some());
        // Polygon dispenses native tokens only
        assert!(stablecoin_address("polygon", NetworkMode::Testnet).is_none());
        // Monad has no mainnet at all
        assert!(stablecoin_address("monad", NetworkMode::Mainnet).is_none());
    }

    #[test]
    fn test_gas_sponsorship_flags() {
        assert!(supports_gas_sponsorship("base", NetworkMode::Testnet));
        assert!(!supports_gas_sponsorship("base", NetworkMode::Mainnet));
        assert!(!supports_gas_sponsorship("ethereum", NetworkMode::Testnet));
        assert!(!supports_gas_sponsorship("dogechain", NetworkMode::Testnet));
    }

    #[test]
    fn test_explorer_url_by_chain_key_and_caip2() {
        let by_key = explorer_url("base", NetworkMode::Testnet, "0xabc").unwrap();
        assert_eq!(by_key, "https://sepolia.basescan.org/tx/0xabc");

        let by_caip2 = explorer_url_by_caip2("eip155:84532", "0xabc").unwrap();
        assert_eq!(by_key, by_caip2);

        // Devnet suffix survives the reverse lookup
        let solana = explorer_url_by_caip2("solana:EtWTRABZaYq6iMfeYKouRu166VU2xqa1", "sig").unwrap();
        assert_eq!(solana, "https://explorer.solana.com/tx/sig?cluster=devnet");

        assert!(explorer_url_by_caip2("eip155:999999", "0xabc").is_none());
    }

    #[test]
    fn test_custody_aliases_partitioned_by_family() {
        let testnet = custody_aliases_by_family(NetworkMode::Testnet);
        assert!(testnet.evm.contains(&"sepolia"));
        assert!(testnet.evm.contains(&"base_sepolia"));
        assert!(!testnet.evm.contains(&"monad"));
        assert_eq!(testnet.solana, vec!["solana_devnet"]);

        let mainnet = custody_aliases_by_family(NetworkMode::Mainnet);
        assert!(mainnet.evm.contains(&"ethereum"));
        assert_eq!(mainnet.solana, vec!["solana"]);
    }

    #[test]
    fn test_rpc_only_chains() {
        let testnet = rpc_only_chains(NetworkMode::Testnet);
        assert_eq!(testnet.len(), 1);
        let monad = &testnet[0];
        assert_eq!(monad.chain_key, "monad");
        assert_eq!(monad.balance_key, "monad_testnet");
        assert_eq!(monad.symbol, "mon");
        assert_eq!(monad.decimals, 18);
        assert!(monad.stablecoin_address.is_some());

        assert!(rpc_only_chains(NetworkMode::Mainnet).is_empty());
    }

    #[test]
    fn test_custody_assets_by_family() {
        let evm = custody_assets_by_family(ChainFamily::Ethereum);
        assert!(evm.contains(&"eth".to_string()));
        assert!(evm.contains(&"pol".to_string()));
        assert!(evm.contains(&"usdc".to_string()));
        // Monad is RPC-only; its symbol must not be sent to the custody API
        assert!(!evm.contains(&"mon".to_string()));

        let solana = custody_assets_by_family(ChainFamily::Solana);
        assert_eq!(solana, vec!["sol".to_string(), "usdc".to_string()]);
    }
}
