// Solotto Lottery Program - Instructions
use arrayref::array_ref;
use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

use crate::error::LotteryError;

#[derive(Clone, Debug, PartialEq)]
pub enum LotteryInstruction {
    /// Create and initialize the lottery account
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The payer funding the lottery account
    /// 1. `[writable]` The lottery account (PDA, seeds `["lottery"]`)
    /// 2. `[]` The oracle authority allowed to deliver fulfillments
    /// 3. `[]` System program
    Initialize {
        /// Minimum entry payment in lamports
        entrance_fee: u64,
        /// Seconds between draws
        interval: u64,
        /// Gas lane the oracle coordinator should use
        key_hash: [u8; 32],
        /// Oracle subscription that funds the requests
        subscription_id: u64,
        /// Gas budget for the oracle callback
        callback_gas_limit: u32,
    },

    /// Enter the current round
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The player entering
    /// 1. `[writable]` The lottery account
    /// 2. `[]` System program
    Enter {
        /// Payment in lamports, at least the entrance fee
        amount: u64,
    },

    /// Probe whether the round is ready to close. Mutates nothing and
    /// reports the verdict through return data as a borsh encoded
    /// `UpkeepStatus`.
    ///
    /// Accounts expected:
    /// 0. `[]` The lottery account
    CheckUpkeep,

    /// Close the round and request randomness from the oracle
    ///
    /// Accounts expected:
    /// 0. `[writable]` The lottery account
    PerformUpkeep,

    /// Oracle callback delivering the random value for a pending request
    ///
    /// Accounts expected:
    /// 0. `[signer]` The oracle authority registered at initialization
    /// 1. `[writable]` The lottery account
    /// 2. `[writable]` The winner account (player at the drawn index)
    FulfillRandomness {
        /// Correlation id issued when the round was closed
        request_id: u64,
        /// Random value produced by the oracle
        randomness: [u8; 32],
    },
}

impl LotteryInstruction {
    /// Unpacks a byte buffer into a LotteryInstruction
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        let (tag, rest) = input
            .split_first()
            .ok_or(LotteryError::InvalidInstructionData)?;

        Ok(match tag {
            0 => {
                if rest.len() < 60 {
                    return Err(LotteryError::InvalidInstructionData.into());
                }
                Self::Initialize {
                    entrance_fee: u64::from_le_bytes(*array_ref![rest, 0, 8]),
                    interval: u64::from_le_bytes(*array_ref![rest, 8, 8]),
                    key_hash: *array_ref![rest, 16, 32],
                    subscription_id: u64::from_le_bytes(*array_ref![rest, 48, 8]),
                    callback_gas_limit: u32::from_le_bytes(*array_ref![rest, 56, 4]),
                }
            }
            1 => {
                if rest.len() < 8 {
                    return Err(LotteryError::InvalidInstructionData.into());
                }
                Self::Enter {
                    amount: u64::from_le_bytes(*array_ref![rest, 0, 8]),
                }
            }
            2 => Self::CheckUpkeep,
            3 => Self::PerformUpkeep,
            4 => {
                if rest.len() < 40 {
                    return Err(LotteryError::InvalidInstructionData.into());
                }
                Self::FulfillRandomness {
                    request_id: u64::from_le_bytes(*array_ref![rest, 0, 8]),
                    randomness: *array_ref![rest, 8, 32],
                }
            }
            _ => return Err(LotteryError::InvalidInstructionData.into()),
        })
    }

    /// Packs a LotteryInstruction into a byte buffer
    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64);
        match self {
            Self::Initialize {
                entrance_fee,
                interval,
                key_hash,
                subscription_id,
                callback_gas_limit,
            } => {
                buf.push(0);
                buf.extend_from_slice(&entrance_fee.to_le_bytes());
                buf.extend_from_slice(&interval.to_le_bytes());
                buf.extend_from_slice(key_hash);
                buf.extend_from_slice(&subscription_id.to_le_bytes());
                buf.extend_from_slice(&callback_gas_limit.to_le_bytes());
            }
            Self::Enter { amount } => {
                buf.push(1);
                buf.extend_from_slice(&amount.to_le_bytes());
            }
            Self::CheckUpkeep => buf.push(2),
            Self::PerformUpkeep => buf.push(3),
            Self::FulfillRandomness {
                request_id,
                randomness,
            } => {
                buf.push(4);
                buf.extend_from_slice(&request_id.to_le_bytes());
                buf.extend_from_slice(randomness);
            }
        }
        buf
    }
}

/// Creates an `Initialize` instruction
#[allow(clippy::too_many_arguments)]
pub fn initialize(
    program_id: &Pubkey,
    payer: &Pubkey,
    lottery: &Pubkey,
    oracle_authority: &Pubkey,
    entrance_fee: u64,
    interval: u64,
    key_hash: [u8; 32],
    subscription_id: u64,
    callback_gas_limit: u32,
) -> Result<Instruction, ProgramError> {
    let data = LotteryInstruction::Initialize {
        entrance_fee,
        interval,
        key_hash,
        subscription_id,
        callback_gas_limit,
    }
    .pack();

    let accounts = vec![
        AccountMeta::new(*payer, true),
        AccountMeta::new(*lottery, false),
        AccountMeta::new_readonly(*oracle_authority, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Creates an `Enter` instruction
pub fn enter(
    program_id: &Pubkey,
    player: &Pubkey,
    lottery: &Pubkey,
    amount: u64,
) -> Result<Instruction, ProgramError> {
    let data = LotteryInstruction::Enter { amount }.pack();

    let accounts = vec![
        AccountMeta::new(*player, true),
        AccountMeta::new(*lottery, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Creates a `CheckUpkeep` instruction
///
/// The verdict comes back through return data. The runtime trims trailing
/// zero bytes from it, so readers have to pad the payload back to
/// `UpkeepStatus::LEN` before deserializing.
pub fn check_upkeep(program_id: &Pubkey, lottery: &Pubkey) -> Result<Instruction, ProgramError> {
    let data = LotteryInstruction::CheckUpkeep.pack();

    let accounts = vec![AccountMeta::new_readonly(*lottery, false)];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Creates a `PerformUpkeep` instruction
pub fn perform_upkeep(program_id: &Pubkey, lottery: &Pubkey) -> Result<Instruction, ProgramError> {
    let data = LotteryInstruction::PerformUpkeep.pack();

    let accounts = vec![AccountMeta::new(*lottery, false)];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Creates a `FulfillRandomness` instruction
pub fn fulfill_randomness(
    program_id: &Pubkey,
    oracle_authority: &Pubkey,
    lottery: &Pubkey,
    winner: &Pubkey,
    request_id: u64,
    randomness: [u8; 32],
) -> Result<Instruction, ProgramError> {
    let data = LotteryInstruction::FulfillRandomness {
        request_id,
        randomness,
    }
    .pack();

    let accounts = vec![
        AccountMeta::new_readonly(*oracle_authority, true),
        AccountMeta::new(*lottery, false),
        AccountMeta::new(*winner, false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpack_rejects_empty_and_unknown() {
        assert!(LotteryInstruction::unpack(&[]).is_err());
        assert!(LotteryInstruction::unpack(&[9]).is_err());
    }

    #[test]
    fn unpack_rejects_short_payloads() {
        assert!(LotteryInstruction::unpack(&[0; 8]).is_err());
        assert!(LotteryInstruction::unpack(&[1, 0, 0, 0]).is_err());
        assert!(LotteryInstruction::unpack(&[4; 20]).is_err());
    }

    #[test]
    fn initialize_round_trips() {
        let original = LotteryInstruction::Initialize {
            entrance_fee: 10_000_000,
            interval: 30,
            key_hash: [0xab; 32],
            subscription_id: 588,
            callback_gas_limit: 500_000,
        };
        let unpacked = LotteryInstruction::unpack(&original.pack()).unwrap();
        assert_eq!(unpacked, original);
    }

    #[test]
    fn fulfill_round_trips() {
        let original = LotteryInstruction::FulfillRandomness {
            request_id: 7,
            randomness: [0x11; 32],
        };
        let unpacked = LotteryInstruction::unpack(&original.pack()).unwrap();
        assert_eq!(unpacked, original);
    }
}
