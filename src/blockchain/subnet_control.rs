// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Subnet control contract interface.

use alloy::sol;

// Entry point of the subnet control contract for cross-chain messages.
sol! {
    #[sol(rpc)]
    interface ISubnetControl {
        function receiveTeleporterMessage(
            bytes32 originChainID,
            address originSenderAddress,
            bytes calldata message
        ) external;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::{
        primitives::{Address, Bytes, B256},
        sol_types::SolCall,
    };

    #[test]
    fn selector_matches_signature() {
        let expected = alloy::primitives::keccak256("receiveTeleporterMessage(bytes32,address,bytes)");
        assert_eq!(
            ISubnetControl::receiveTeleporterMessageCall::SELECTOR,
            expected[..4]
        );
    }

    #[test]
    fn call_encodes_message_bytes() {
        let call = ISubnetControl::receiveTeleporterMessageCall {
            originChainID: B256::repeat_byte(0x11),
            originSenderAddress: Address::repeat_byte(0x22),
            message: Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]),
        };
        let data = call.abi_encode();
        // selector + 3 head words + length word + one padded data word
        assert_eq!(data.len(), 4 + 32 * 5);
        assert_eq!(&data[4 + 32 * 4..4 + 32 * 4 + 4], &[0xde, 0xad, 0xbe, 0xef]);
    }
}
