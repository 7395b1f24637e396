// Solotto Lottery Program - State
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    clock::UnixTimestamp,
    program_error::ProgramError,
    program_pack::{IsInitialized, Sealed},
    pubkey::Pubkey,
};

use crate::error::LotteryError;

/// Seed of the lottery PDA
pub const LOTTERY_SEED: &[u8] = b"lottery";

/// Hard cap on players per round. The account is allocated up front and has
/// to stay under the 10 KiB limit for accounts created through CPI.
pub const MAX_PLAYERS: usize = 256;

/// Random words requested from the oracle per round
pub const NUM_WORDS: u32 = 1;

/// Confirmations the oracle should wait for before answering
pub const REQUEST_CONFIRMATIONS: u16 = 3;

/// Lifecycle of a lottery round
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq)]
pub enum LotteryState {
    /// Accepting entries
    Open,
    /// Randomness requested, waiting for the oracle callback
    Calculating,
}

/// Lottery state
#[derive(BorshSerialize, BorshDeserialize, Debug)]
pub struct Lottery {
    /// Is the lottery initialized
    pub is_initialized: bool,
    /// Current round state
    pub state: LotteryState,
    /// Minimum payment to enter, in lamports
    pub entrance_fee: u64,
    /// Seconds that must elapse since `last_timestamp` before a draw
    pub interval: u64,
    /// Gas lane the oracle coordinator should use
    pub key_hash: [u8; 32],
    /// Oracle subscription that funds the requests
    pub subscription_id: u64,
    /// Gas budget for the oracle callback
    pub callback_gas_limit: u32,
    /// Key authorized to deliver fulfillments
    pub oracle_authority: Pubkey,
    /// Start of the current round
    pub last_timestamp: UnixTimestamp,
    /// Sum of accepted entry payments this round, in lamports
    pub pool_lamports: u64,
    /// Monotonic counter backing request ids
    pub request_counter: u64,
    /// Correlation id of the outstanding randomness request, if any
    pub pending_request: Option<u64>,
    /// Winner of the most recently completed round
    pub recent_winner: Option<Pubkey>,
    /// Players of the current round, in entry order
    pub players: Vec<Pubkey>,
    /// Bump seed of the lottery PDA
    pub bump: u8,
}

/// Result of the upkeep probe, handed back to keepers through return data
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq)]
pub struct UpkeepStatus {
    /// Conjunction of the four conditions below
    pub upkeep_needed: bool,
    /// The round is accepting entries
    pub is_open: bool,
    /// The round interval has elapsed
    pub interval_elapsed: bool,
    /// The pool holds at least one lamport
    pub has_balance: bool,
    /// At least one player has entered
    pub has_players: bool,
}

impl UpkeepStatus {
    /// Borsh serialized width. The runtime trims trailing zero bytes from
    /// return data, so readers pad the payload back to this length before
    /// deserializing.
    pub const LEN: usize = 5;
}

impl Sealed for Lottery {}

impl IsInitialized for Lottery {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Lottery {
    /// Serialized size with a full player list. The account is allocated at
    /// this length so the list can grow in place.
    pub const MAX_LEN: usize = 1 // is_initialized
        + 1 // state
        + 8 // entrance_fee
        + 8 // interval
        + 32 // key_hash
        + 8 // subscription_id
        + 4 // callback_gas_limit
        + 32 // oracle_authority
        + 8 // last_timestamp
        + 8 // pool_lamports
        + 8 // request_counter
        + 9 // pending_request
        + 33 // recent_winner
        + 4 + 32 * MAX_PLAYERS // players
        + 1; // bump

    /// Create a fresh, open lottery
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        entrance_fee: u64,
        interval: u64,
        key_hash: [u8; 32],
        subscription_id: u64,
        callback_gas_limit: u32,
        oracle_authority: Pubkey,
        now: UnixTimestamp,
        bump: u8,
    ) -> Self {
        Self {
            is_initialized: true,
            state: LotteryState::Open,
            entrance_fee,
            interval,
            key_hash,
            subscription_id,
            callback_gas_limit,
            oracle_authority,
            last_timestamp: now,
            pool_lamports: 0,
            request_counter: 0,
            pending_request: None,
            recent_winner: None,
            players: Vec::new(),
            bump,
        }
    }

    /// Check if the round interval has elapsed. An interval whose deadline
    /// cannot be represented never elapses.
    pub fn interval_elapsed(&self, now: UnixTimestamp) -> bool {
        i64::try_from(self.interval)
            .ok()
            .and_then(|interval| self.last_timestamp.checked_add(interval))
            .map(|deadline| now >= deadline)
            .unwrap_or(false)
    }

    /// Evaluate the upkeep conditions. Reads only, so callers may probe as
    /// often as they like.
    pub fn check_upkeep(&self, now: UnixTimestamp) -> UpkeepStatus {
        let is_open = self.state == LotteryState::Open;
        let interval_elapsed = self.interval_elapsed(now);
        let has_balance = self.pool_lamports > 0;
        let has_players = !self.players.is_empty();

        UpkeepStatus {
            upkeep_needed: is_open && interval_elapsed && has_balance && has_players,
            is_open,
            interval_elapsed,
            has_balance,
            has_players,
        }
    }

    /// Number of players in the current round
    pub fn player_count(&self) -> u64 {
        self.players.len() as u64
    }

    /// Player at the given index, in entry order
    pub fn player_at(&self, index: u64) -> Result<Pubkey, LotteryError> {
        self.players
            .get(index as usize)
            .copied()
            .ok_or(LotteryError::IndexOutOfRange)
    }

    /// Deserialize from account data, ignoring the unused tail of the fixed
    /// allocation.
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        let mut data = input;
        Self::deserialize(&mut data).map_err(|_| ProgramError::InvalidAccountData)
    }

    /// Serialize into account data
    pub fn pack(&self, dst: &mut [u8]) -> Result<(), ProgramError> {
        let mut writer = dst;
        self.serialize(&mut writer)
            .map_err(|_| ProgramError::AccountDataTooSmall)
    }
}
