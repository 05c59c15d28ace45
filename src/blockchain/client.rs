// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Subnet client for relaying allowlist messages.

use std::{future::IntoFuture, time::Duration};

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, Bytes},
    providers::{
        fillers::{
            BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
            WalletFiller,
        },
        Identity, Provider, ProviderBuilder, RootProvider,
    },
};
use async_trait::async_trait;

use super::signing::signer_from_secret;
use super::subnet_control::ISubnetControl;
use super::types::{ChainConfig, RelayTarget};
use super::{ChainError, MessageRelayer};
use crate::config::RelayConfig;

/// HTTP provider type for the subnet (with all fillers and a signing wallet).
type SigningProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider<Ethereum>,
>;

/// Client bound to one subnet, one signer and one control contract.
pub struct SubnetClient {
    chain: ChainConfig,
    target: RelayTarget,
    signer_address: Address,
    provider: SigningProvider,
    timeout: Duration,
}

impl SubnetClient {
    /// Build the client from relay configuration.
    ///
    /// Fails on an unparsable RPC URL, key, address or origin chain id. No
    /// network call is made here.
    pub fn new(config: &RelayConfig, timeout: Duration) -> Result<Self, ChainError> {
        let url: url::Url = config
            .chain
            .rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainError::InvalidRpcUrl(e.to_string()))?;

        let signer = signer_from_secret(&config.private_key)?;
        let signer_address = signer.address();
        let target = RelayTarget::parse(
            &config.subnet_control_address,
            &config.origin_chain_id,
            &config.origin_sender_address,
        )?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url);

        Ok(Self {
            chain: config.chain.clone(),
            target,
            signer_address,
            provider,
            timeout,
        })
    }

    pub fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    pub fn signer_address(&self) -> Address {
        self.signer_address
    }

    /// Await an RPC future under the client timeout.
    async fn bounded<T, E, F>(
        &self,
        what: &'static str,
        fut: F,
        wrap: fn(String) -> ChainError,
    ) -> Result<T, ChainError>
    where
        F: IntoFuture<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(|e| wrap(e.to_string())),
            Err(_) => Err(ChainError::Timeout(what)),
        }
    }
}

#[async_trait]
impl MessageRelayer for SubnetClient {
    async fn relay(&self, message: &Bytes) -> Result<String, ChainError> {
        let contract = ISubnetControl::new(self.target.control_address, &self.provider);
        let call = contract
            .receiveTeleporterMessage(
                self.target.origin_chain_id,
                self.target.origin_sender,
                message.clone(),
            )
            .from(self.signer_address);

        self.bounded("simulation", call.call(), ChainError::SimulationFailed)
            .await?;
        tracing::debug!(chain_id = self.chain.chain_id, "Relay call simulated");

        // A timeout here does not prove the transaction was not broadcast.
        let pending = self
            .bounded("submission", call.send(), ChainError::TransactionFailed)
            .await?;
        Ok(format!("{:?}", pending.tx_hash()))
    }

    async fn block_number(&self) -> Result<u64, ChainError> {
        self.bounded(
            "block number query",
            self.provider.get_block_number(),
            ChainError::RpcError,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::NativeCurrency;

    fn relay_config(rpc_url: &str) -> RelayConfig {
        RelayConfig {
            chain: ChainConfig {
                name: "VeriFree Subnet".into(),
                chain_id: 99999,
                rpc_url: rpc_url.into(),
                currency: NativeCurrency {
                    name: "VeriFree Token".into(),
                    symbol: "VFT".into(),
                    decimals: 18,
                },
            },
            private_key: "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".into(),
            subnet_control_address: "0x1ac16DDefA7F428CA761972eFE2FC6Eaf686ec0c".into(),
            origin_chain_id: "1111111111111111111111111LpoYY".into(),
            origin_sender_address: "0x69Fcc8Ce8E31B4dFBc40249dcCb4F5daAD825748".into(),
        }
    }

    #[test]
    fn client_builds_without_network() {
        let client =
            SubnetClient::new(&relay_config("http://127.0.0.1:9650/ext/bc/verifree/rpc"), Duration::from_secs(1))
                .unwrap();
        assert_eq!(client.chain().chain_id, 99999);
        assert_eq!(
            client.signer_address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn invalid_rpc_url_is_rejected() {
        let result = SubnetClient::new(&relay_config("not a url"), Duration::from_secs(1));
        assert!(matches!(result, Err(ChainError::InvalidRpcUrl(_))));
    }

    #[tokio::test]
    async fn unreachable_rpc_surfaces_as_error() {
        // Port 9 (discard) is closed on test hosts; the call fails fast or times out.
        let client =
            SubnetClient::new(&relay_config("http://127.0.0.1:9"), Duration::from_millis(500)).unwrap();
        let err = client
            .relay(&Bytes::from_static(&[0xde, 0xad]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ChainError::SimulationFailed(_) | ChainError::Timeout(_)
        ));
    }
}
