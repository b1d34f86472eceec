//! Solana payload construction.
//!
//! The faucet never signs. Transactions are built unsigned with a placeholder
//! blockhash, serialized, and handed to the custody service, which replaces
//! the blockhash with a real recent one, signs with the faucet key, and
//! broadcasts. The placeholder is a documented precondition of the custody
//! `signAndSendTransaction` call, not a protocol trick.

use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use solana_sdk::{
    hash::Hash, instruction::Instruction, message::Message, pubkey::Pubkey,
    transaction::Transaction,
};
use solana_system_interface::instruction as system_instruction;
use spl_associated_token_account::{
    get_associated_token_address_with_program_id,
    instruction::create_associated_token_account_idempotent,
};
use spl_token_interface::instruction as token_instruction;

use crate::domain::error::{AppError, ValidationError};

/// SPL Token program (the faucet mints all use the original token program)
pub const TOKEN_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

/// Stand-in blockhash the custody service overwrites before signing
pub const PLACEHOLDER_BLOCKHASH: Hash = Hash::new_from_array([1u8; 32]);

/// Parse and validate a Base58 32-byte Solana address
pub fn parse_pubkey(address: &str) -> Result<Pubkey, ValidationError> {
    Pubkey::from_str(address).map_err(|_| ValidationError::InvalidAddress(address.to_string()))
}

#[must_use]
pub fn is_valid_address(address: &str) -> bool {
    parse_pubkey(address).is_ok()
}

/// Associated token account for a wallet and mint
#[must_use]
pub fn derive_associated_token_account(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    get_associated_token_address_with_program_id(owner, mint, &TOKEN_PROGRAM_ID)
}

/// Whole SOL to lamports, floored. Float multiply is intentional here: faucet
/// amounts are tiny, and the floor guarantees no over-dispensing.
#[must_use]
pub fn sol_to_lamports(amount: f64) -> u64 {
    (amount * 1_000_000_000.0) as u64
}

/// Token amount in display units to its smallest-unit integer, floored
#[must_use]
pub fn to_token_amount(amount: f64, decimals: u8) -> u64 {
    (amount * 10f64.powi(i32::from(decimals))) as u64
}

/// Build an unsigned native SOL transfer, base64-encoded
pub fn build_native_transfer(
    from: &Pubkey,
    to: &Pubkey,
    lamports: u64,
) -> Result<String, AppError> {
    let transfer_ix = system_instruction::transfer(from, to, lamports);
    serialize_unsigned(&[transfer_ix], from)
}

/// Build an unsigned SPL token transfer, base64-encoded.
///
/// When `create_recipient_ata` is set, an idempotent associated-token-account
/// creation instruction is prepended; idempotency covers the race where the
/// ATA appears between the existence check and execution.
pub fn build_token_transfer(
    from: &Pubkey,
    to: &Pubkey,
    mint: &Pubkey,
    amount: u64,
    decimals: u8,
    create_recipient_ata: bool,
) -> Result<String, AppError> {
    let source_ata = derive_associated_token_account(from, mint);
    let destination_ata = derive_associated_token_account(to, mint);

    let mut instructions: Vec<Instruction> = Vec::with_capacity(2);
    if create_recipient_ata {
        instructions.push(create_associated_token_account_idempotent(
            from,
            to,
            mint,
            &TOKEN_PROGRAM_ID,
        ));
    }

    let transfer_ix = token_instruction::transfer_checked(
        &TOKEN_PROGRAM_ID,
        &source_ata,
        mint,
        &destination_ata,
        from,
        &[],
        amount,
        decimals,
    )
    .map_err(|e| {
        AppError::Internal(format!("Failed to build transfer_checked instruction: {}", e))
    })?;
    instructions.push(transfer_ix);

    serialize_unsigned(&instructions, from)
}

fn serialize_unsigned(instructions: &[Instruction], payer: &Pubkey) -> Result<String, AppError> {
    let message = Message::new_with_blockhash(instructions, Some(payer), &PLACEHOLDER_BLOCKHASH);
    let transaction = Transaction::new_unsigned(message);
    let bytes = bincode::serialize(&transaction)
        .map_err(|e| AppError::Internal(format!("Failed to serialize transaction: {}", e)))?;
    Ok(BASE64.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FROM: &str = "4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T";
    const TO: &str = "7UX2i7SucgLMQcfZ75s3VXmZZY4YRUyJN9X1RgfMoDUi";
    const MINT: &str = "4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU";

    #[test]
    fn test_pubkey_validation() {
        assert!(is_valid_address(FROM));
        assert!(!is_valid_address("0x1234567890abcdef1234567890abcdef12345678"));
        assert!(!is_valid_address("too-short"));
        assert!(!is_valid_address(""));
    }

    #[test]
    fn test_amount_conversion_floors() {
        assert_eq!(sol_to_lamports(0.5), 500_000_000);
        assert_eq!(sol_to_lamports(0.0), 0);
        assert_eq!(to_token_amount(1.5, 6), 1_500_000);
        // Sub-lamport remainders are dropped, never rounded up
        assert_eq!(sol_to_lamports(0.000000001999), 1);
    }

    #[test]
    fn test_ata_derivation_is_deterministic() {
        let owner = parse_pubkey(TO).unwrap();
        let mint = parse_pubkey(MINT).unwrap();
        let first = derive_associated_token_account(&owner, &mint);
        let second = derive_associated_token_account(&owner, &mint);
        assert_eq!(first, second);
        assert_ne!(first, owner);
    }

    #[test]
    fn test_native_transfer_round_trips_unsigned() {
        let from = parse_pubkey(FROM).unwrap();
        let to = parse_pubkey(TO).unwrap();
        let encoded = build_native_transfer(&from, &to, 500_000_000).unwrap();

        let bytes = BASE64.decode(&encoded).unwrap();
        let decoded: Transaction = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded.message.recent_blockhash, PLACEHOLDER_BLOCKHASH);
        assert_eq!(decoded.message.account_keys[0], from);
        // Unsigned: signature slots present but zeroed
        assert!(decoded.signatures.iter().all(|s| *s == Default::default()));
    }

    #[test]
    fn test_token_transfer_instruction_order() {
        const ATA_PROGRAM: Pubkey =
            Pubkey::from_str_const("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

        let from = parse_pubkey(FROM).unwrap();
        let to = parse_pubkey(TO).unwrap();
        let mint = parse_pubkey(MINT).unwrap();

        let without = build_token_transfer(&from, &to, &mint, 1_500_000, 6, false).unwrap();
        let with = build_token_transfer(&from, &to, &mint, 1_500_000, 6, true).unwrap();

        let decode = |encoded: &str| -> Transaction {
            bincode::deserialize(&BASE64.decode(encoded).unwrap()).unwrap()
        };
        let program_of = |tx: &Transaction, index: usize| -> Pubkey {
            tx.message.account_keys[tx.message.instructions[index].program_id_index as usize]
        };

        let bare = decode(&without);
        assert_eq!(bare.message.instructions.len(), 1);
        assert_eq!(program_of(&bare, 0), TOKEN_PROGRAM_ID);

        // ATA creation must come before the transfer that needs the account
        let with_create = decode(&with);
        assert_eq!(with_create.message.instructions.len(), 2);
        assert_eq!(program_of(&with_create, 0), ATA_PROGRAM);
        assert_eq!(program_of(&with_create, 1), TOKEN_PROGRAM_ID);
    }
}
