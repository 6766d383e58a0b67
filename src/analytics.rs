//! Aggregation engine - win-rate statistics over the full trade log
//!
//! Everything here is a pure function of the record set and is recomputed
//! on every request.
//!
//! Ordering rules:
//! - tables (breakdown, pivot) are sorted by key: session in Asia, London,
//!   New York, Off Hours order, then time block chronologically;
//! - rankings (most active session, top zones, top strategies) are stable by
//!   first-seen key, so ties keep the order in which the key first appeared
//!   in the log.

use crate::types::{Outcome, Session, TimeBlock, Trade};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// How many entries the top-N rankings return
pub const TOP_N: usize = 3;

/// A trade with its read-time derived fields
#[derive(Debug, Clone, Serialize)]
pub struct DerivedTrade<'a> {
    #[serde(flatten)]
    pub trade: &'a Trade,
    pub time_block: TimeBlock,
    pub win: u8,
}

impl<'a> DerivedTrade<'a> {
    pub fn new(trade: &'a Trade) -> Self {
        Self {
            trade,
            time_block: trade.time_block(),
            win: u8::from(trade.is_win()),
        }
    }
}

pub fn derive_fields(trades: &[Trade]) -> Vec<DerivedTrade<'_>> {
    trades.iter().map(DerivedTrade::new).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_trades: usize,
    /// Percentage of winning trades, one decimal place
    pub win_rate: f64,
    pub most_active_session: Session,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownRow {
    pub session: Session,
    pub time_block: TimeBlock,
    /// Counts aligned with `BlockBreakdown::outcomes`
    pub counts: Vec<usize>,
}

/// Trade counts per (session, time block), one column per outcome seen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockBreakdown {
    pub outcomes: Vec<Outcome>,
    pub rows: Vec<BreakdownRow>,
}

impl BlockBreakdown {
    pub fn count(&self, session: Session, time_block: TimeBlock, outcome: Outcome) -> Option<usize> {
        let column = self.outcomes.iter().position(|o| *o == outcome)?;
        self.rows
            .iter()
            .find(|r| r.session == session && r.time_block == time_block)
            .map(|r| r.counts[column])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotRow {
    pub time_block: TimeBlock,
    /// Win rates aligned with `WinRatePivot::sessions`
    pub win_rates: Vec<f64>,
}

/// Win rate (%) with time blocks as rows and sessions as columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WinRatePivot {
    pub sessions: Vec<Session>,
    pub rows: Vec<PivotRow>,
}

impl WinRatePivot {
    /// Cell value; `Some(0.0)` for a filled gap, `None` if the row or column is absent
    pub fn cell(&self, session: Session, time_block: TimeBlock) -> Option<f64> {
        let column = self.sessions.iter().position(|s| *s == session)?;
        self.rows
            .iter()
            .find(|r| r.time_block == time_block)
            .map(|r| r.win_rates[column])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneWinRate {
    pub session: Session,
    pub time_block: TimeBlock,
    pub win_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyWins {
    pub strategy: String,
    pub wins: usize,
}

/// Everything the dashboard shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analytics {
    pub summary: Summary,
    pub block_breakdown: BlockBreakdown,
    pub win_rate_pivot: WinRatePivot,
    pub top_zones: Vec<ZoneWinRate>,
    pub top_strategies: Vec<StrategyWins>,
}

/// Run the full pipeline. Returns `None` when there are no trades.
pub fn analyze(trades: &[Trade]) -> Option<Analytics> {
    let derived = derive_fields(trades);
    let summary = summarize(&derived)?;
    let zones = zone_win_rates(&derived);

    Some(Analytics {
        summary,
        block_breakdown: block_breakdown(&derived),
        win_rate_pivot: win_rate_pivot(&zones),
        top_zones: top_zones(&zones, TOP_N),
        top_strategies: top_strategies(trades, TOP_N),
    })
}

pub fn summarize(derived: &[DerivedTrade<'_>]) -> Option<Summary> {
    if derived.is_empty() {
        return None;
    }

    let total_trades = derived.len();
    let wins: usize = derived.iter().map(|d| usize::from(d.win)).sum();
    let win_rate = round_one_decimal(wins as f64 * 100.0 / total_trades as f64);

    let mut session_counts: IndexMap<Session, usize> = IndexMap::new();
    for d in derived {
        *session_counts.entry(d.trade.session).or_default() += 1;
    }
    let most_active_session = first_max_by_count(session_counts)?;

    Some(Summary {
        total_trades,
        win_rate,
        most_active_session,
    })
}

pub fn block_breakdown(derived: &[DerivedTrade<'_>]) -> BlockBreakdown {
    let mut counts: BTreeMap<(Session, TimeBlock), BTreeMap<Outcome, usize>> = BTreeMap::new();
    let mut outcomes: BTreeSet<Outcome> = BTreeSet::new();

    for d in derived {
        outcomes.insert(d.trade.outcome);
        *counts
            .entry((d.trade.session, d.time_block))
            .or_default()
            .entry(d.trade.outcome)
            .or_default() += 1;
    }

    let outcomes: Vec<Outcome> = outcomes.into_iter().collect();
    let rows = counts
        .into_iter()
        .map(|((session, time_block), by_outcome)| BreakdownRow {
            session,
            time_block,
            counts: outcomes
                .iter()
                .map(|o| by_outcome.get(o).copied().unwrap_or(0))
                .collect(),
        })
        .collect();

    BlockBreakdown { outcomes, rows }
}

/// Win rate (%) for every (session, time block) that has trades, first-seen order
pub fn zone_win_rates(derived: &[DerivedTrade<'_>]) -> Vec<ZoneWinRate> {
    let mut groups: IndexMap<(Session, TimeBlock), (usize, usize)> = IndexMap::new();
    for d in derived {
        let (wins, total) = groups.entry((d.trade.session, d.time_block)).or_default();
        *wins += usize::from(d.win);
        *total += 1;
    }

    groups
        .into_iter()
        .map(|((session, time_block), (wins, total))| ZoneWinRate {
            session,
            time_block,
            win_rate: wins as f64 * 100.0 / total as f64,
        })
        .collect()
}

pub fn win_rate_pivot(zones: &[ZoneWinRate]) -> WinRatePivot {
    let sessions: Vec<Session> = zones
        .iter()
        .map(|z| z.session)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let blocks: BTreeSet<TimeBlock> = zones.iter().map(|z| z.time_block).collect();

    let rows = blocks
        .into_iter()
        .map(|time_block| PivotRow {
            time_block,
            win_rates: sessions
                .iter()
                .map(|session| {
                    zones
                        .iter()
                        .find(|z| z.session == *session && z.time_block == time_block)
                        .map(|z| z.win_rate)
                        .unwrap_or(0.0)
                })
                .collect(),
        })
        .collect();

    WinRatePivot { sessions, rows }
}

/// Highest win-rate zones. Only zones with trades are ranked.
pub fn top_zones(zones: &[ZoneWinRate], n: usize) -> Vec<ZoneWinRate> {
    let mut ranked = zones.to_vec();
    // sort_by is stable: equal rates keep first-seen order
    ranked.sort_by(|a, b| b.win_rate.total_cmp(&a.win_rate));
    ranked.truncate(n);
    ranked
}

/// Strategies with the most winning trades
pub fn top_strategies(trades: &[Trade], n: usize) -> Vec<StrategyWins> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for trade in trades.iter().filter(|t| t.is_win()) {
        *counts.entry(trade.strategy_used.as_str()).or_default() += 1;
    }

    let mut ranked: Vec<StrategyWins> = counts
        .into_iter()
        .map(|(strategy, wins)| StrategyWins {
            strategy: strategy.to_string(),
            wins,
        })
        .collect();
    ranked.sort_by(|a, b| b.wins.cmp(&a.wins));
    ranked.truncate(n);
    ranked
}

fn first_max_by_count<K>(counts: IndexMap<K, usize>) -> Option<K> {
    let mut best: Option<(K, usize)> = None;
    for (key, count) in counts {
        // strictly greater, so the earliest key wins a tie
        if best.as_ref().map_or(true, |(_, best_count)| count > *best_count) {
            best = Some((key, count));
        }
    }
    best.map(|(key, _)| key)
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
