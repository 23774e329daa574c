//! Names a strategy from the shape of its legs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::contract::OptionKind;
use crate::strategy::{OptionStrategy, StrategyLeg};

/// Shares one contract covers.
const SHARES_PER_CONTRACT: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    fn of(size: i64) -> Option<Self> {
        match size.signum() {
            1 => Some(Direction::Long),
            -1 => Some(Direction::Short),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "Long"),
            Direction::Short => write!(f, "Short"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpreadShape {
    /// Same expiration, different strikes.
    Vertical,
    /// Different expirations and strikes.
    Diagonal,
    /// Same strike, different expirations.
    Calendar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PremiumFlow {
    Debit,
    Credit,
}

/// Canonical strategy names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    Single {
        direction: Direction,
        kind: OptionKind,
    },
    WithShares {
        direction: Direction,
        kind: OptionKind,
        shares: Direction,
    },
    CoveredCall,
    ProtectivePut,
    CoveredPut,
    ProtectiveCall,
    Spread {
        shape: SpreadShape,
        kind: OptionKind,
        flow: PremiumFlow,
    },
    /// Two legs of one type, both long or both short.
    SameDirection {
        direction: Direction,
        kind: OptionKind,
    },
    Straddle(Direction),
    Strangle(Direction),
    Condor(OptionKind),
    IronCondor,
    /// Three-leg strategies have no classification rules yet.
    NotYetClassified,
    Unknown,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Single { direction, kind } => write!(f, "{direction} {kind}"),
            StrategyKind::WithShares {
                direction,
                kind,
                shares,
            } => write!(f, "{direction} {kind} + {shares} Shares"),
            StrategyKind::CoveredCall => write!(f, "Covered Call"),
            StrategyKind::ProtectivePut => write!(f, "Protective Put"),
            StrategyKind::CoveredPut => write!(f, "Covered Put"),
            StrategyKind::ProtectiveCall => write!(f, "Protective Call"),
            StrategyKind::Spread { shape, kind, flow } => {
                write!(f, "{shape:?} {kind} {flow:?} Spread")
            }
            StrategyKind::SameDirection { direction, kind } => write!(f, "{direction} {kind}s"),
            StrategyKind::Straddle(direction) => write!(f, "{direction} Straddle"),
            StrategyKind::Strangle(direction) => write!(f, "{direction} Strangle"),
            StrategyKind::Condor(kind) => write!(f, "{kind} Condor"),
            StrategyKind::IronCondor => write!(f, "Iron Condor"),
            StrategyKind::NotYetClassified => write!(f, "Not Yet Classified"),
            StrategyKind::Unknown => write!(f, "Unknown Strategy"),
        }
    }
}

/// Classify a strategy by leg count, option types, directions, strikes and
/// expirations.
pub fn classify(strategy: &OptionStrategy) -> StrategyKind {
    match strategy.legs.as_slice() {
        [leg] => single_leg(leg, strategy.share_count),
        [first, second] => two_legs(first, second),
        [_, _, _] => StrategyKind::NotYetClassified,
        [_, _, _, _] => four_legs(&strategy.legs),
        _ => StrategyKind::Unknown,
    }
}

fn single_leg(leg: &StrategyLeg, share_count: i64) -> StrategyKind {
    let kind = leg.contract.option_type;
    let Some(direction) = Direction::of(leg.position_size) else {
        return StrategyKind::Unknown;
    };
    let Some(shares) = Direction::of(share_count) else {
        return StrategyKind::Single { direction, kind };
    };

    // stock position exactly offsets the option's notional
    let offsets = leg.position_size.unsigned_abs().checked_mul(SHARES_PER_CONTRACT)
        == Some(share_count.unsigned_abs());

    let special = match (kind, direction, shares) {
        (OptionKind::Call, Direction::Short, Direction::Long) => Some(StrategyKind::CoveredCall),
        (OptionKind::Put, Direction::Long, Direction::Long) => Some(StrategyKind::ProtectivePut),
        (OptionKind::Put, Direction::Short, Direction::Short) => Some(StrategyKind::CoveredPut),
        (OptionKind::Call, Direction::Long, Direction::Short) => Some(StrategyKind::ProtectiveCall),
        _ => None,
    };

    match special {
        Some(named) if offsets => named,
        _ => StrategyKind::WithShares {
            direction,
            kind,
            shares,
        },
    }
}

fn two_legs(first: &StrategyLeg, second: &StrategyLeg) -> StrategyKind {
    let (a, b) = (&first.contract, &second.contract);

    if a.option_type != b.option_type {
        let (call, put) = if a.option_type == OptionKind::Call {
            (first, second)
        } else {
            (second, first)
        };
        let direction = match (Direction::of(call.position_size), Direction::of(put.position_size)) {
            (Some(c), Some(p)) if c == p => c,
            _ => return StrategyKind::Unknown,
        };
        return if call.contract.strike == put.contract.strike {
            StrategyKind::Straddle(direction)
        } else {
            StrategyKind::Strangle(direction)
        };
    }

    let kind = a.option_type;
    let short = [first, second].into_iter().find(|leg| leg.is_short());
    let long = [first, second].into_iter().find(|leg| leg.is_long());

    let (short, long) = match (short, long) {
        (Some(short), Some(long)) => (short, long),
        (Some(_), None) => {
            return StrategyKind::SameDirection {
                direction: Direction::Short,
                kind,
            }
        }
        (None, Some(_)) => {
            return StrategyKind::SameDirection {
                direction: Direction::Long,
                kind,
            }
        }
        (None, None) => return StrategyKind::Unknown,
    };

    let (short_strike, long_strike) = (short.contract.strike, long.contract.strike);
    let (short_exp, long_exp) = (short.contract.expiration, long.contract.expiration);

    if short_strike == long_strike {
        let flow = match short_exp.cmp(&long_exp) {
            std::cmp::Ordering::Greater => PremiumFlow::Credit,
            std::cmp::Ordering::Less => PremiumFlow::Debit,
            std::cmp::Ordering::Equal => return StrategyKind::Unknown,
        };
        return StrategyKind::Spread {
            shape: SpreadShape::Calendar,
            kind,
            flow,
        };
    }

    // calls: selling the higher strike is a debit; puts: selling the lower one is
    let short_is_higher = short_strike > long_strike;
    let flow = match (kind, short_is_higher) {
        (OptionKind::Call, true) | (OptionKind::Put, false) => PremiumFlow::Debit,
        (OptionKind::Call, false) | (OptionKind::Put, true) => PremiumFlow::Credit,
    };
    let shape = if short_exp == long_exp {
        SpreadShape::Vertical
    } else {
        SpreadShape::Diagonal
    };

    StrategyKind::Spread { shape, kind, flow }
}

fn four_legs(legs: &[StrategyLeg]) -> StrategyKind {
    let count = |kind: OptionKind, direction: Direction| {
        legs.iter()
            .filter(|leg| {
                leg.contract.option_type == kind && Direction::of(leg.position_size) == Some(direction)
            })
            .count()
    };

    let long_calls = count(OptionKind::Call, Direction::Long);
    let short_calls = count(OptionKind::Call, Direction::Short);
    let long_puts = count(OptionKind::Put, Direction::Long);
    let short_puts = count(OptionKind::Put, Direction::Short);

    match (long_calls, short_calls, long_puts, short_puts) {
        (2, 2, _, _) => StrategyKind::Condor(OptionKind::Call),
        (_, _, 2, 2) => StrategyKind::Condor(OptionKind::Put),
        (1, 1, 1, 1) => StrategyKind::IronCondor,
        _ => StrategyKind::Unknown,
    }
}
