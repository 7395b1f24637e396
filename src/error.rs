// Solotto Lottery Program - Errors
use solana_program::{
    decode_error::DecodeError,
    msg,
    program_error::{PrintProgramError, ProgramError},
};
use thiserror::Error;

/// Errors that may be returned by the lottery program
#[derive(Error, Debug, Copy, Clone, PartialEq)]
pub enum LotteryError {
    /// Instruction data could not be decoded
    #[error("Invalid instruction data")]
    InvalidInstructionData,

    /// The lottery account has already been initialized
    #[error("Lottery account already initialized")]
    AlreadyInitialized,

    /// The lottery account has not been initialized
    #[error("Lottery account not initialized")]
    NotInitialized,

    /// Entry payment is below the entrance fee
    #[error("Entry payment below the entrance fee")]
    NotEnoughLamports,

    /// Entries are rejected while a winner is being drawn
    #[error("Lottery is not open")]
    LotteryClosed,

    /// The player list for this round is at capacity
    #[error("Player list is full for this round")]
    LotteryFull,

    /// One of the upkeep preconditions does not hold
    #[error("Upkeep not needed")]
    UpkeepNotNeeded,

    /// Fulfillment was not signed by the configured oracle authority
    #[error("Caller is not the oracle authority")]
    Unauthorized,

    /// Fulfillment does not match the pending request id
    #[error("Request id does not match the pending request")]
    UnknownRequest,

    /// Fulfillment reached with an empty player list
    #[error("No participants in the round")]
    NoParticipants,

    /// The winner account passed in does not match the drawn player
    #[error("Winner account does not match the drawn player")]
    WinnerAccountMismatch,

    /// Moving the prize to the winner failed
    #[error("Prize payout failed")]
    PayoutFailed,

    /// Player index beyond the end of the list
    #[error("Player index out of range")]
    IndexOutOfRange,

    /// Checked arithmetic overflowed
    #[error("Calculation overflow")]
    CalculationOverflow,
}

impl From<LotteryError> for ProgramError {
    fn from(e: LotteryError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for LotteryError {
    fn type_of() -> &'static str {
        "Lottery Error"
    }
}

impl PrintProgramError for LotteryError {
    fn print<E>(&self) {
        msg!(&self.to_string());
    }
}
