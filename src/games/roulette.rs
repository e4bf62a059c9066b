//! Single-zero roulette: the fixed slot table, the payout rules and the table's bet book.
//!
//! Stakes leave the balance when a bet is placed. Settlement only credits the
//! multiplier product of winning bets, so a losing bet contributes nothing.

use crate::config::RouletteConfig;
use crate::errors::GameError;
use crate::games::rng::RngSource;
use crate::games::session::RoundEngine;
use crate::games::types::{Bet, BetKind, BetLine, Color, GameType, RoundResult, RouletteOutcome, Slot};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

pub const SLOT_COUNT: usize = 37;

/// Pocket order around a single-zero wheel, starting at zero
const WHEEL_ORDER: [u8; SLOT_COUNT] = [
    0, 32, 15, 19, 4, 21, 2, 25, 17, 34, 6, 27, 13, 36, 11, 30, 8, 23, 10, 5, 24, 16, 33, 1, 20,
    14, 31, 9, 22, 18, 29, 7, 28, 12, 35, 3, 26,
];

const RED_NUMBERS: [u8; 18] = [1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36];

pub const STRAIGHT_MULTIPLIER: u64 = 35;
pub const COLOR_MULTIPLIER: u64 = 2;
pub const RANGE_MULTIPLIER: u64 = 2;

const fn color_of(number: u8) -> Color {
    if number == 0 {
        return Color::Green;
    }
    let mut i = 0;
    while i < RED_NUMBERS.len() {
        if RED_NUMBERS[i] == number {
            return Color::Red;
        }
        i += 1;
    }
    Color::Black
}

const fn build_slots() -> [Slot; SLOT_COUNT] {
    let mut slots = [Slot {
        number: 0,
        color: Color::Green,
    }; SLOT_COUNT];
    let mut i = 0;
    while i < SLOT_COUNT {
        let number = WHEEL_ORDER[i];
        slots[i] = Slot {
            number,
            color: color_of(number),
        };
        i += 1;
    }
    slots
}

/// All 37 pockets in wheel order. A draw of `idx` lands on `SLOTS[idx]`.
pub const SLOTS: [Slot; SLOT_COUNT] = build_slots();

pub fn slot_for_number(number: u8) -> Option<Slot> {
    SLOTS.iter().copied().find(|slot| slot.number == number)
}

impl BetKind {
    pub fn straight(number: u8) -> Self {
        BetKind::Straight { number }
    }

    pub fn color(color: Color) -> Self {
        BetKind::Color { color }
    }

    pub fn range(low: u8, high: u8) -> Self {
        BetKind::Range { low, high }
    }

    /// 1-18
    pub fn low() -> Self {
        BetKind::Range { low: 1, high: 18 }
    }

    /// 19-36
    pub fn high() -> Self {
        BetKind::Range { low: 19, high: 36 }
    }

    /// Reject malformed kinds at placement time so settlement never sees them
    pub fn validate(&self) -> Result<(), GameError> {
        match *self {
            BetKind::Straight { number } if number > 36 => Err(GameError::InvalidArgument(
                format!("straight bet on {} is outside 0-36", number),
            )),
            BetKind::Color { color: Color::Green } => Err(GameError::InvalidArgument(
                "color bets accept red or black only".to_string(),
            )),
            BetKind::Range { low, high } if low < 1 || high > 36 || low > high => {
                Err(GameError::InvalidArgument(format!(
                    "range {}-{} must lie within 1-36 with low <= high",
                    low, high
                )))
            }
            _ => Ok(()),
        }
    }

    pub fn payout_multiplier(&self) -> u64 {
        match self {
            BetKind::Straight { .. } => STRAIGHT_MULTIPLIER,
            BetKind::Color { .. } => COLOR_MULTIPLIER,
            BetKind::Range { .. } => RANGE_MULTIPLIER,
        }
    }

    /// Green never matches a color bet and zero never falls inside a range
    pub fn wins_on(&self, slot: Slot) -> bool {
        match *self {
            BetKind::Straight { number } => slot.number == number,
            BetKind::Color { color } => slot.color != Color::Green && slot.color == color,
            BetKind::Range { low, high } => {
                slot.number != 0 && low <= slot.number && slot.number <= high
            }
        }
    }
}

impl fmt::Display for BetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetKind::Straight { number } => write!(f, "straight:{}", number),
            BetKind::Color { color } => write!(f, "color:{}", color),
            BetKind::Range { low, high } => write!(f, "range:{}-{}", low, high),
        }
    }
}

fn parse_number(text: &str) -> Result<u8, GameError> {
    text.trim()
        .parse::<u8>()
        .map_err(|_| GameError::InvalidArgument(format!("'{}' is not a pocket number", text)))
}

fn parse_color(text: &str) -> Result<Color, GameError> {
    match text.trim().to_ascii_lowercase().as_str() {
        "red" => Ok(Color::Red),
        "black" => Ok(Color::Black),
        "green" => Ok(Color::Green),
        other => Err(GameError::InvalidArgument(format!("unknown color '{}'", other))),
    }
}

fn parse_range(text: &str) -> Result<BetKind, GameError> {
    let (low, high) = text
        .split_once('-')
        .ok_or_else(|| GameError::InvalidArgument(format!("'{}' is not a low-high range", text)))?;
    Ok(BetKind::range(parse_number(low)?, parse_number(high)?))
}

impl FromStr for BetKind {
    type Err = GameError;

    /// Accepts `17`, `straight:17`, `red`, `color:black`, `1-18`, `range:19-36`, `low` and `high`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_ascii_lowercase();
        let kind = match text.split_once(':') {
            Some(("straight", value)) => BetKind::straight(parse_number(value)?),
            Some(("color", value)) => BetKind::color(parse_color(value)?),
            Some(("range", value)) => parse_range(value)?,
            Some((prefix, _)) => {
                return Err(GameError::InvalidArgument(format!(
                    "unknown bet kind '{}'",
                    prefix
                )))
            }
            None => match text.as_str() {
                "low" => BetKind::low(),
                "high" => BetKind::high(),
                "red" | "black" | "green" => BetKind::color(parse_color(&text)?),
                _ if text.contains('-') => parse_range(&text)?,
                _ => BetKind::straight(parse_number(&text)?),
            },
        };
        kind.validate()?;
        Ok(kind)
    }
}

fn signed(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Score a bet set against a known slot. Deterministic in `(bets, slot)`.
pub fn evaluate(bets: &[Bet], slot: Slot) -> RouletteOutcome {
    let lines: Vec<BetLine> = bets
        .iter()
        .map(|bet| {
            let payout = if bet.kind.wins_on(slot) {
                bet.amount.saturating_mul(bet.kind.payout_multiplier())
            } else {
                0
            };
            BetLine { bet: *bet, payout }
        })
        .collect();

    let total_staked = bets.iter().fold(0u64, |acc, bet| acc.saturating_add(bet.amount));
    let total_payout = lines.iter().fold(0u64, |acc, line| acc.saturating_add(line.payout));

    RouletteOutcome {
        slot,
        bets: lines,
        total_staked,
        total_payout,
        net: signed(total_payout) - signed(total_staked),
    }
}

/// Draw a pocket and settle the given bets against it
pub fn spin(bets: &[Bet], rng: &mut dyn RngSource) -> Result<RouletteOutcome, GameError> {
    let idx = rng.draw(SLOT_COUNT as u32)? as usize;
    let slot = SLOTS[idx];
    Ok(evaluate(bets, slot))
}

/// Bankroll and active bets for one roulette table
#[derive(Debug, Clone)]
pub struct RouletteTable {
    balance: u64,
    bets: BTreeMap<BetKind, u64>,
    chip_values: Vec<u64>,
}

impl RouletteTable {
    pub fn new(config: &RouletteConfig) -> Self {
        Self {
            balance: config.starting_balance,
            bets: BTreeMap::new(),
            chip_values: config.chip_values.clone(),
        }
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn chip_values(&self) -> &[u64] {
        &self.chip_values
    }

    /// One entry per bet kind, in bet book order
    pub fn active_bets(&self) -> Vec<Bet> {
        self.bets
            .iter()
            .map(|(kind, amount)| Bet {
                kind: *kind,
                amount: *amount,
            })
            .collect()
    }

    pub fn total_staked(&self) -> u64 {
        self.bets.values().sum()
    }

    /// Deduct `amount` from the balance and add it to the stake on `kind`
    pub fn place_bet(&mut self, kind: BetKind, amount: u64) -> Result<Vec<Bet>, GameError> {
        kind.validate()?;
        if amount == 0 {
            return Err(GameError::InvalidArgument(
                "bet amount must be positive".to_string(),
            ));
        }
        if amount > self.balance {
            return Err(GameError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }

        self.balance -= amount;
        *self.bets.entry(kind).or_insert(0) += amount;
        Ok(self.active_bets())
    }

    /// Refund every active stake. Returns the refunded amount.
    pub fn clear_bets(&mut self) -> u64 {
        let refund = self.total_staked();
        self.balance += refund;
        self.bets.clear();
        refund
    }
}

impl RoundEngine for RouletteTable {
    const GAME: GameType = GameType::Roulette;

    fn spin_precondition(&self) -> Result<(), GameError> {
        if self.bets.is_empty() {
            return Err(GameError::PreconditionNotMet(
                "place at least one bet before spinning".to_string(),
            ));
        }
        Ok(())
    }

    fn settle(&mut self, rng: &mut dyn RngSource) -> Result<RoundResult, GameError> {
        let outcome = spin(&self.active_bets(), rng)?;

        self.balance = self.balance.saturating_add(outcome.total_payout);
        self.bets.clear();

        debug!(
            slot = %outcome.slot,
            total_staked = outcome.total_staked,
            total_payout = outcome.total_payout,
            balance = self.balance,
            "Roulette round settled"
        );

        Ok(RoundResult::Roulette(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::rng::ScriptedRng;
    use std::collections::HashSet;

    fn table(balance: u64) -> RouletteTable {
        RouletteTable::new(&RouletteConfig {
            starting_balance: balance,
            ..Default::default()
        })
    }

    fn wheel_index(number: u8) -> u32 {
        SLOTS.iter().position(|slot| slot.number == number).unwrap() as u32
    }

    #[test]
    fn test_slot_table_is_complete() {
        let numbers: HashSet<u8> = SLOTS.iter().map(|slot| slot.number).collect();
        assert_eq!(numbers.len(), SLOT_COUNT);
        assert!(numbers.iter().all(|n| *n <= 36));

        assert_eq!(SLOTS[0], Slot { number: 0, color: Color::Green });
        let reds = SLOTS.iter().filter(|s| s.color == Color::Red).count();
        let blacks = SLOTS.iter().filter(|s| s.color == Color::Black).count();
        assert_eq!((reds, blacks), (18, 18));
        assert_eq!(slot_for_number(17).unwrap().color, Color::Black);
        assert_eq!(slot_for_number(32).unwrap().color, Color::Red);
        assert!(slot_for_number(37).is_none());
    }

    #[test]
    fn test_straight_and_color_pay_together() {
        let bets = [
            Bet { kind: BetKind::straight(17), amount: 100 },
            Bet { kind: BetKind::color(Color::Black), amount: 50 },
        ];
        let outcome = evaluate(&bets, slot_for_number(17).unwrap());

        assert_eq!(outcome.total_payout, 3600);
        assert_eq!(outcome.total_staked, 150);
        assert_eq!(outcome.net, 3450);
        assert_eq!(outcome.bets[0].payout, 3500);
        assert_eq!(outcome.bets[1].payout, 100);
    }

    #[test]
    fn test_zero_never_matches_range_or_color() {
        let zero = slot_for_number(0).unwrap();
        let bets = [
            Bet { kind: BetKind::low(), amount: 100 },
            Bet { kind: BetKind::high(), amount: 100 },
            Bet { kind: BetKind::color(Color::Red), amount: 100 },
            Bet { kind: BetKind::color(Color::Black), amount: 100 },
        ];
        let outcome = evaluate(&bets, zero);
        assert_eq!(outcome.total_payout, 0);
        assert_eq!(outcome.net, -400);

        let on_zero = evaluate(&[Bet { kind: BetKind::straight(0), amount: 10 }], zero);
        assert_eq!(on_zero.total_payout, 350);
    }

    #[test]
    fn test_payout_matches_table_for_every_slot() {
        let bets = [
            Bet { kind: BetKind::straight(7), amount: 10 },
            Bet { kind: BetKind::color(Color::Red), amount: 20 },
            Bet { kind: BetKind::color(Color::Black), amount: 30 },
            Bet { kind: BetKind::low(), amount: 40 },
            Bet { kind: BetKind::range(13, 24), amount: 50 },
        ];

        for slot in SLOTS {
            let expected: u64 = bets
                .iter()
                .map(|bet| {
                    let wins = match bet.kind {
                        BetKind::Straight { number } => slot.number == number,
                        BetKind::Color { color } => slot.color == color,
                        BetKind::Range { low, high } => {
                            slot.number >= low && slot.number <= high
                        }
                    };
                    if wins { bet.amount * bet.kind.payout_multiplier() } else { 0 }
                })
                .sum();

            let first = evaluate(&bets, slot);
            let second = evaluate(&bets, slot);
            assert_eq!(first.total_payout, expected, "slot {}", slot);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_spin_uses_drawn_index() {
        let mut rng = ScriptedRng::new([wheel_index(17)]);
        let bets = [Bet { kind: BetKind::straight(17), amount: 1 }];
        let outcome = spin(&bets, &mut rng).unwrap();
        assert_eq!(outcome.slot.number, 17);
        assert_eq!(outcome.total_payout, 35);
    }

    #[test]
    fn test_validation_rejects_malformed_kinds() {
        assert!(BetKind::straight(37).validate().is_err());
        assert!(BetKind::color(Color::Green).validate().is_err());
        assert!(BetKind::range(0, 18).validate().is_err());
        assert!(BetKind::range(19, 37).validate().is_err());
        assert!(BetKind::range(20, 10).validate().is_err());
        assert!(BetKind::range(5, 5).validate().is_ok());
        assert!(BetKind::straight(0).validate().is_ok());
    }

    #[test]
    fn test_parse_bet_kinds() {
        assert_eq!("17".parse::<BetKind>().unwrap(), BetKind::straight(17));
        assert_eq!("straight:0".parse::<BetKind>().unwrap(), BetKind::straight(0));
        assert_eq!("Red".parse::<BetKind>().unwrap(), BetKind::color(Color::Red));
        assert_eq!("color:black".parse::<BetKind>().unwrap(), BetKind::color(Color::Black));
        assert_eq!("1-18".parse::<BetKind>().unwrap(), BetKind::low());
        assert_eq!("range:19-36".parse::<BetKind>().unwrap(), BetKind::high());
        assert_eq!("high".parse::<BetKind>().unwrap(), BetKind::high());

        assert!("green".parse::<BetKind>().is_err());
        assert!("0-18".parse::<BetKind>().is_err());
        assert!("split:1".parse::<BetKind>().is_err());
        assert!("forty".parse::<BetKind>().is_err());

        let kind = BetKind::range(19, 36);
        assert_eq!(kind.to_string().parse::<BetKind>().unwrap(), kind);
    }

    #[test]
    fn test_chip_values_follow_config() {
        assert_eq!(table(0).chip_values(), &[10, 50, 100, 500, 1000]);

        let custom = RouletteTable::new(&RouletteConfig {
            chip_values: vec![5, 25],
            ..Default::default()
        });
        assert_eq!(custom.chip_values(), &[5, 25]);
    }

    #[test]
    fn test_place_bet_deducts_and_merges() {
        let mut table = table(1_000);
        table.place_bet(BetKind::straight(5), 100).unwrap();
        let bets = table.place_bet(BetKind::straight(5), 50).unwrap();

        assert_eq!(bets, vec![Bet { kind: BetKind::straight(5), amount: 150 }]);
        assert_eq!(table.balance(), 850);
    }

    #[test]
    fn test_merge_equivalent_to_single_bet() {
        let mut split = table(1_000);
        split.place_bet(BetKind::color(Color::Red), 30).unwrap();
        split.place_bet(BetKind::color(Color::Red), 70).unwrap();

        let mut single = table(1_000);
        single.place_bet(BetKind::color(Color::Red), 100).unwrap();

        assert_eq!(split.active_bets(), single.active_bets());
        assert_eq!(split.balance(), single.balance());
    }

    #[test]
    fn test_place_bet_rejections_leave_state() {
        let mut table = table(100);
        assert_eq!(
            table.place_bet(BetKind::straight(1), 101),
            Err(GameError::InsufficientFunds { requested: 101, available: 100 })
        );
        assert!(matches!(
            table.place_bet(BetKind::straight(1), 0),
            Err(GameError::InvalidArgument(_))
        ));
        assert!(matches!(
            table.place_bet(BetKind::range(0, 36), 10),
            Err(GameError::InvalidArgument(_))
        ));
        assert_eq!(table.balance(), 100);
        assert!(table.active_bets().is_empty());
    }

    #[test]
    fn test_clear_bets_refunds() {
        let mut table = table(500);
        table.place_bet(BetKind::low(), 100).unwrap();
        table.place_bet(BetKind::straight(3), 25).unwrap();

        assert_eq!(table.clear_bets(), 125);
        assert_eq!(table.balance(), 500);
        assert!(table.spin_precondition().is_err());
    }

    #[test]
    fn test_settle_credits_payout_and_clears() {
        let mut table = table(1_000);
        table.place_bet(BetKind::straight(17), 100).unwrap();
        table.place_bet(BetKind::color(Color::Black), 50).unwrap();

        let mut rng = ScriptedRng::new([wheel_index(17)]);
        let result = table.settle(&mut rng).unwrap();

        assert_eq!(result.payout(), 3600);
        assert_eq!(table.balance(), 850 + 3600);
        assert!(table.active_bets().is_empty());
    }
}
