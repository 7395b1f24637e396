// Solotto Lottery Program - Instruction Processor
use borsh::BorshSerialize;
use solana_program::{
    account_info::{next_account_info, AccountInfo},
    clock::Clock,
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed, set_return_data},
    program_error::ProgramError,
    program_pack::IsInitialized,
    pubkey::Pubkey,
    rent::Rent,
    system_instruction,
    sysvar::Sysvar,
};

use crate::{
    error::LotteryError,
    instruction::LotteryInstruction,
    state::{Lottery, LotteryState, LOTTERY_SEED, MAX_PLAYERS, NUM_WORDS, REQUEST_CONFIRMATIONS},
    utils,
};

/// Program state handler.
pub struct Processor {}

impl Processor {
    /// Process a Solotto lottery instruction
    pub fn process_instruction(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = LotteryInstruction::unpack(instruction_data)?;

        match instruction {
            LotteryInstruction::Initialize {
                entrance_fee,
                interval,
                key_hash,
                subscription_id,
                callback_gas_limit,
            } => {
                msg!("Instruction: Initialize");
                Self::process_initialize(
                    program_id,
                    accounts,
                    entrance_fee,
                    interval,
                    key_hash,
                    subscription_id,
                    callback_gas_limit,
                )
            }
            LotteryInstruction::Enter { amount } => {
                msg!("Instruction: Enter");
                Self::process_enter(program_id, accounts, amount)
            }
            LotteryInstruction::CheckUpkeep => {
                msg!("Instruction: CheckUpkeep");
                Self::process_check_upkeep(program_id, accounts)
            }
            LotteryInstruction::PerformUpkeep => {
                msg!("Instruction: PerformUpkeep");
                Self::process_perform_upkeep(program_id, accounts)
            }
            LotteryInstruction::FulfillRandomness {
                request_id,
                randomness,
            } => {
                msg!("Instruction: FulfillRandomness");
                Self::process_fulfill_randomness(program_id, accounts, request_id, randomness)
            }
        }
    }

    /// Process Initialize instruction
    fn process_initialize(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        entrance_fee: u64,
        interval: u64,
        key_hash: [u8; 32],
        subscription_id: u64,
        callback_gas_limit: u32,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();

        let payer_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;
        let oracle_authority_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        // Verify the payer signed the transaction
        if !payer_info.is_signer {
            msg!("Payer must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        // Verify the lottery account is the expected PDA
        let (expected_lottery_pubkey, bump_seed) = utils::find_lottery_address(program_id);
        if *lottery_info.key != expected_lottery_pubkey {
            msg!("Invalid lottery account address");
            return Err(ProgramError::InvalidArgument);
        }

        // Create the lottery account if it doesn't exist yet
        if lottery_info.owner != program_id {
            let rent = Rent::get()?;
            let rent_lamports = rent.minimum_balance(Lottery::MAX_LEN);

            invoke_signed(
                &system_instruction::create_account(
                    payer_info.key,
                    lottery_info.key,
                    rent_lamports,
                    Lottery::MAX_LEN as u64,
                    program_id,
                ),
                &[
                    payer_info.clone(),
                    lottery_info.clone(),
                    system_program_info.clone(),
                ],
                &[&[LOTTERY_SEED, &[bump_seed]]],
            )?;
        }

        // Reject a second initialization
        if let Ok(lottery) = Lottery::unpack(&lottery_info.data.borrow()) {
            if lottery.is_initialized() {
                msg!("Lottery account is already initialized");
                return Err(LotteryError::AlreadyInitialized.into());
            }
        }

        let clock = Clock::get()?;
        let lottery = Lottery::new(
            entrance_fee,
            interval,
            key_hash,
            subscription_id,
            callback_gas_limit,
            *oracle_authority_info.key,
            clock.unix_timestamp,
            bump_seed,
        );
        lottery.pack(&mut lottery_info.data.borrow_mut())?;

        msg!(
            "Lottery initialized: entrance_fee={} interval={}s oracle_authority={}",
            entrance_fee,
            interval,
            oracle_authority_info.key
        );
        Ok(())
    }

    /// Process Enter instruction
    fn process_enter(program_id: &Pubkey, accounts: &[AccountInfo], amount: u64) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();

        let player_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        // Verify the player signed the transaction
        if !player_info.is_signer {
            msg!("Player must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        // Verify the lottery account is owned by this program
        if lottery_info.owner != program_id {
            msg!("Lottery account is not owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut lottery = Lottery::unpack(&lottery_info.data.borrow())?;
        if !lottery.is_initialized() {
            return Err(LotteryError::NotInitialized.into());
        }

        // Entries are only accepted while the round is open
        if lottery.state != LotteryState::Open {
            msg!("Entries are closed while a winner is being drawn");
            return Err(LotteryError::LotteryClosed.into());
        }

        // The payment has to cover the entrance fee
        if amount < lottery.entrance_fee {
            msg!(
                "Entry of {} lamports is below the {} lamport entrance fee",
                amount,
                lottery.entrance_fee
            );
            return Err(LotteryError::NotEnoughLamports.into());
        }

        if lottery.players.len() >= MAX_PLAYERS {
            msg!("Round already has {} players", lottery.players.len());
            return Err(LotteryError::LotteryFull.into());
        }

        // Move the payment into the pool
        invoke(
            &system_instruction::transfer(player_info.key, lottery_info.key, amount),
            &[
                player_info.clone(),
                lottery_info.clone(),
                system_program_info.clone(),
            ],
        )?;

        lottery.players.push(*player_info.key);
        lottery.pool_lamports = lottery
            .pool_lamports
            .checked_add(amount)
            .ok_or(LotteryError::CalculationOverflow)?;
        lottery.pack(&mut lottery_info.data.borrow_mut())?;

        msg!("LotteryEntered: player={} amount={}", player_info.key, amount);
        Ok(())
    }

    /// Process CheckUpkeep instruction
    fn process_check_upkeep(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();

        let lottery_info = next_account_info(account_info_iter)?;

        if lottery_info.owner != program_id {
            msg!("Lottery account is not owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        let lottery = Lottery::unpack(&lottery_info.data.borrow())?;
        if !lottery.is_initialized() {
            return Err(LotteryError::NotInitialized.into());
        }

        let clock = Clock::get()?;
        let status = lottery.check_upkeep(clock.unix_timestamp);

        msg!(
            "Upkeep check: needed={} open={} interval_elapsed={} pool={} players={}",
            status.upkeep_needed,
            status.is_open,
            status.interval_elapsed,
            lottery.pool_lamports,
            lottery.player_count()
        );

        let payload = status.try_to_vec()?;
        set_return_data(&payload);
        Ok(())
    }

    /// Process PerformUpkeep instruction
    fn process_perform_upkeep(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();

        let lottery_info = next_account_info(account_info_iter)?;

        if lottery_info.owner != program_id {
            msg!("Lottery account is not owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut lottery = Lottery::unpack(&lottery_info.data.borrow())?;
        if !lottery.is_initialized() {
            return Err(LotteryError::NotInitialized.into());
        }

        // Re-verify the upkeep conditions on chain, callers are untrusted
        let clock = Clock::get()?;
        let status = lottery.check_upkeep(clock.unix_timestamp);
        if !status.upkeep_needed {
            msg!(
                "Upkeep not needed: open={} interval_elapsed={} pool={} players={}",
                status.is_open,
                status.interval_elapsed,
                lottery.pool_lamports,
                lottery.player_count()
            );
            return Err(LotteryError::UpkeepNotNeeded.into());
        }

        // Close the round and record the request the oracle has to answer
        lottery.state = LotteryState::Calculating;
        let request_id = lottery
            .request_counter
            .checked_add(1)
            .ok_or(LotteryError::CalculationOverflow)?;
        lottery.request_counter = request_id;
        lottery.pending_request = Some(request_id);
        lottery.pack(&mut lottery_info.data.borrow_mut())?;

        msg!(
            "RandomnessRequested: request_id={} key_hash={} subscription_id={} confirmations={} callback_gas_limit={} num_words={}",
            request_id,
            Pubkey::new_from_array(lottery.key_hash),
            lottery.subscription_id,
            REQUEST_CONFIRMATIONS,
            lottery.callback_gas_limit,
            NUM_WORDS
        );
        Ok(())
    }

    /// Process FulfillRandomness instruction
    fn process_fulfill_randomness(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        request_id: u64,
        randomness: [u8; 32],
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();

        let oracle_authority_info = next_account_info(account_info_iter)?;
        let lottery_info = next_account_info(account_info_iter)?;
        let winner_info = next_account_info(account_info_iter)?;

        if lottery_info.owner != program_id {
            msg!("Lottery account is not owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut lottery = Lottery::unpack(&lottery_info.data.borrow())?;
        if !lottery.is_initialized() {
            return Err(LotteryError::NotInitialized.into());
        }

        // Only the registered oracle authority may deliver randomness
        if !oracle_authority_info.is_signer {
            msg!("Oracle authority must sign the fulfillment");
            return Err(LotteryError::Unauthorized.into());
        }
        if *oracle_authority_info.key != lottery.oracle_authority {
            msg!(
                "Fulfillment signed by {} but the oracle authority is {}",
                oracle_authority_info.key,
                lottery.oracle_authority
            );
            return Err(LotteryError::Unauthorized.into());
        }

        // The delivery has to match the one outstanding request
        if lottery.pending_request != Some(request_id) {
            msg!("No pending randomness request with id {}", request_id);
            return Err(LotteryError::UnknownRequest.into());
        }

        let player_count = lottery.player_count();
        if player_count == 0 {
            return Err(LotteryError::NoParticipants.into());
        }

        let index = utils::winner_index(&randomness, player_count);
        let winner = lottery.player_at(index)?;
        if *winner_info.key != winner {
            msg!(
                "Expected winner {} at index {}, got {}",
                winner,
                index,
                winner_info.key
            );
            return Err(LotteryError::WinnerAccountMismatch.into());
        }

        // Reset the round before moving any funds
        let prize = lottery.pool_lamports;
        let clock = Clock::get()?;
        lottery.players.clear();
        lottery.pool_lamports = 0;
        lottery.pending_request = None;
        lottery.recent_winner = Some(winner);
        lottery.last_timestamp = clock.unix_timestamp;
        lottery.state = LotteryState::Open;
        lottery.pack(&mut lottery_info.data.borrow_mut())?;

        // Pay the whole pool to the winner
        let lottery_lamports = lottery_info.lamports();
        **lottery_info.try_borrow_mut_lamports()? = lottery_lamports
            .checked_sub(prize)
            .ok_or(LotteryError::PayoutFailed)?;
        let winner_lamports = winner_info.lamports();
        **winner_info.try_borrow_mut_lamports()? = winner_lamports
            .checked_add(prize)
            .ok_or(LotteryError::PayoutFailed)?;

        msg!(
            "WinnerPicked: winner={} prize={} request_id={}",
            winner,
            prize,
            request_id
        );
        Ok(())
    }
}
