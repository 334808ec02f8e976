//! Moves and round outcome resolution

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// A player's move. The canonical spellings are exactly "Rock", "Paper"
/// and "Scissors".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Move {
    Rock,
    Paper,
    Scissors,
}

impl FromStr for Move {
    type Err = GameError;

    /// Parse a move, case-insensitively. Non-canonical spellings such as
    /// "Scissor" are rejected rather than silently mis-resolved.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.eq_ignore_ascii_case("rock") {
            Ok(Move::Rock)
        } else if t.eq_ignore_ascii_case("paper") {
            Ok(Move::Paper)
        } else if t.eq_ignore_ascii_case("scissors") {
            Ok(Move::Scissors)
        } else {
            Err(GameError::InvalidMove(s.to_string()))
        }
    }
}

/// Result of one round, from the seats' point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Draw,
    /// Seat 0 (the room creator) wins
    P1,
    /// Seat 1 (the joiner) wins
    P2,
}

/// Resolve one round: Rock beats Scissors, Scissors beats Paper, Paper
/// beats Rock. Total over the 3x3 grid and symmetric under swapping the
/// inputs.
pub fn resolve(player1: Move, player2: Move) -> Outcome {
    use Move::*;

    match (player1, player2) {
        (a, b) if a == b => Outcome::Draw,
        (Rock, Scissors) | (Scissors, Paper) | (Paper, Rock) => Outcome::P1,
        _ => Outcome::P2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_MOVES: [Move; 3] = [Move::Rock, Move::Paper, Move::Scissors];

    #[test]
    fn test_resolve_canonical_cases() {
        assert_eq!(resolve(Move::Rock, Move::Scissors), Outcome::P1);
        assert_eq!(resolve(Move::Scissors, Move::Rock), Outcome::P2);
        assert_eq!(resolve(Move::Paper, Move::Paper), Outcome::Draw);
    }

    #[test]
    fn test_resolve_is_total_and_symmetric() {
        for a in ALL_MOVES {
            for b in ALL_MOVES {
                let forward = resolve(a, b);
                let backward = resolve(b, a);
                match forward {
                    Outcome::Draw => assert_eq!(backward, Outcome::Draw),
                    Outcome::P1 => assert_eq!(backward, Outcome::P2),
                    Outcome::P2 => assert_eq!(backward, Outcome::P1),
                }
            }
        }
    }

    #[test]
    fn test_draw_only_on_equal_moves() {
        for a in ALL_MOVES {
            for b in ALL_MOVES {
                assert_eq!(resolve(a, b) == Outcome::Draw, a == b);
            }
        }
    }

    #[test]
    fn test_parse_canonical_spellings() {
        assert_eq!("Rock".parse::<Move>().unwrap(), Move::Rock);
        assert_eq!("Paper".parse::<Move>().unwrap(), Move::Paper);
        assert_eq!("Scissors".parse::<Move>().unwrap(), Move::Scissors);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("rock".parse::<Move>().unwrap(), Move::Rock);
        assert_eq!("SCISSORS".parse::<Move>().unwrap(), Move::Scissors);
    }

    #[test]
    fn test_parse_rejects_non_canonical_spellings() {
        // Older browser clients sent "Scissor"; it must never resolve as
        // a valid move.
        assert!("Scissor".parse::<Move>().is_err());
        assert!("rocks".parse::<Move>().is_err());
        assert!("".parse::<Move>().is_err());
        assert!("Lizard".parse::<Move>().is_err());
    }
}
