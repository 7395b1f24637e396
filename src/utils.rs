// Solotto Lottery Program - Utility Functions
use arrayref::array_ref;
use solana_program::pubkey::Pubkey;

use crate::state::LOTTERY_SEED;

/// Reduce an oracle random value to a winner index.
///
/// Takes the first 8 bytes of the value as a little-endian u64 and reduces it
/// modulo the player count, so the result always lands in entry order range.
pub fn winner_index(randomness: &[u8; 32], player_count: u64) -> u64 {
    if player_count == 0 {
        return 0;
    }

    let value = u64::from_le_bytes(*array_ref![randomness, 0, 8]);
    value % player_count
}

/// Find the program derived address of the lottery account
pub fn find_lottery_address(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[LOTTERY_SEED], program_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn randomness_from(value: u64) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&value.to_le_bytes());
        bytes
    }

    #[test]
    fn single_player_always_wins() {
        assert_eq!(winner_index(&randomness_from(7), 1), 0);
        assert_eq!(winner_index(&randomness_from(u64::MAX), 1), 0);
    }

    #[test]
    fn index_stays_in_range() {
        for value in [0, 1, 3, 4, 11, 255, u64::MAX] {
            assert!(winner_index(&randomness_from(value), 4) < 4);
        }
        assert_eq!(winner_index(&randomness_from(11), 4), 3);
    }

    #[test]
    fn only_first_eight_bytes_matter() {
        let mut bytes = randomness_from(5);
        bytes[8..].fill(0xff);
        assert_eq!(winner_index(&bytes, 10), 5);
    }

    #[test]
    fn zero_players_guarded() {
        assert_eq!(winner_index(&randomness_from(99), 0), 0);
    }

    #[test]
    fn lottery_address_is_deterministic() {
        let program_id = Pubkey::new_unique();
        let (first, first_bump) = find_lottery_address(&program_id);
        let (second, second_bump) = find_lottery_address(&program_id);
        assert_eq!(first, second);
        assert_eq!(first_bump, second_bump);
    }
}
