use anyhow::{format_err, Result};
use base64::Engine;
use solana_client::{
    rpc_client::RpcClient,
    rpc_config::{RpcSendTransactionConfig, RpcSimulateTransactionConfig},
};
use solana_sdk::{
    commitment_config::CommitmentConfig, instruction::Instruction, pubkey::Pubkey,
    signature::Signature, transaction::Transaction,
};

pub fn send_txn(client: &RpcClient, txn: &Transaction, wait_confirm: bool) -> Result<Signature> {
    Ok(client.send_and_confirm_transaction_with_spinner_and_config(
        txn,
        if wait_confirm {
            CommitmentConfig::confirmed()
        } else {
            CommitmentConfig::processed()
        },
        RpcSendTransactionConfig {
            skip_preflight: true,
            ..RpcSendTransactionConfig::default()
        },
    )?)
}

/// Simulates `instructions` and returns the raw return data of the last
/// instruction that set one.
pub fn simulate_return_data(
    client: &RpcClient,
    instructions: &[Instruction],
    payer: &Pubkey,
) -> Result<Vec<u8>> {
    let txn = Transaction::new_with_payer(instructions, Some(payer));
    let result = client
        .simulate_transaction_with_config(
            &txn,
            RpcSimulateTransactionConfig {
                sig_verify: false,
                replace_recent_blockhash: true,
                commitment: Some(CommitmentConfig::confirmed()),
                ..RpcSimulateTransactionConfig::default()
            },
        )?
        .value;
    if let Some(err) = result.err {
        return Err(format_err!(
            "simulation failed: {:?}, logs: {:?}",
            err,
            result.logs.unwrap_or_default()
        ));
    }
    let return_data = result
        .return_data
        .ok_or_else(|| format_err!("simulation produced no return data"))?;
    let (encoded, _encoding) = return_data.data;
    Ok(base64::engine::general_purpose::STANDARD.decode(encoded)?)
}

/// Decodes a borsh `u64` return value.
///
/// The runtime strips trailing zero bytes from return data, so short input is
/// zero-extended.
pub fn decode_u64_return(data: &[u8]) -> Result<u64> {
    if data.len() > 8 {
        return Err(format_err!("return data too long for u64: {} bytes", data.len()));
    }
    let mut bytes = [0u8; 8];
    bytes[..data.len()].copy_from_slice(data);
    Ok(u64::from_le_bytes(bytes))
}
