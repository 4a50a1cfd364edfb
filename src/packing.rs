use crate::error::{SolveError, SolveResult};

/// One linear supply option the packer may open a bar from.
#[derive(Debug, Clone)]
pub struct SupplyOption {
    pub length_mm: u32,
    /// Index into the caller's inventory-unit table for finite offcuts;
    /// `None` marks an infinite new-stock template.
    pub unit: Option<usize>,
}

impl SupplyOption {
    pub fn new_stock(length_mm: u32) -> Self {
        Self {
            length_mm,
            unit: None,
        }
    }

    pub fn inventory(length_mm: u32, unit: usize) -> Self {
        Self {
            length_mm,
            unit: Some(unit),
        }
    }
}

/// Policy for equal-slack ties when opening a new bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    /// Spend yard offcuts on interchangeable fits.
    PreferInventory,
    /// Keep unique offcuts for cuts only they can serve (mixed-pool mode).
    PreferNewStock,
}

/// What to do with a request no supply option can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exhausted {
    /// Open the largest new-stock template anyway; the bin goes oversubscribed
    /// and its residual is clamped at report time.
    ForceLargestNew,
    /// Hand the request back to the caller untouched.
    Defer,
}

/// One stock bar (or inventory offcut) being sawn into ordered lengths.
///
/// `remaining_mm` is the exact bookkeeping residual `stock − Σ(cut + kerf)`;
/// it goes negative on a force-oversized bin and is clamped on emit.
#[derive(Debug, Clone)]
pub struct Bin {
    pub stock_length_mm: u32,
    pub remaining_mm: i64,
    pub cuts: Vec<u32>,
    pub unit: Option<usize>,
}

impl Bin {
    pub fn open(stock_length_mm: u32, unit: Option<usize>) -> Self {
        Self {
            stock_length_mm,
            remaining_mm: stock_length_mm as i64,
            cuts: Vec::new(),
            unit,
        }
    }

    pub fn push_cut(&mut self, len: u32, kerf: u32) {
        self.cuts.push(len);
        self.remaining_mm -= len as i64 + kerf as i64;
    }
}

#[derive(Debug, Clone, Default)]
pub struct PackOutcome {
    pub bins: Vec<Bin>,
    /// Inventory unit indices consumed by this pass.
    pub used_units: Vec<usize>,
    /// Requests skipped under [`Exhausted::Defer`], in input order.
    pub deferred: Vec<u32>,
}

/// Total residual headroom; the Monte Carlo quality metric (lower is better).
pub fn residual_sum(bins: &[Bin]) -> i64 {
    bins.iter().map(|b| b.remaining_mm).sum()
}

/// One best-fit pass over `requests` in the given order.
///
/// Each request takes `len + kerf` out of a bar. Placement tries the open bin
/// with the tightest fit first, then opens the tightest-fitting supply option
/// (inventory units are consumed at most once), then falls back per
/// `exhausted`.
pub fn pack_pass(
    dia: u32,
    requests: &[u32],
    supply: &[SupplyOption],
    kerf: u32,
    tie: TieBreak,
    exhausted: Exhausted,
    unit_count: usize,
) -> SolveResult<PackOutcome> {
    let mut bins: Vec<Bin> = Vec::new();
    let mut consumed = vec![false; unit_count];
    let mut deferred = Vec::new();

    for &len in requests {
        let needed = len as i64 + kerf as i64;

        // Tightest fit among open bins.
        let mut best: Option<(usize, i64)> = None;
        for (bi, bin) in bins.iter().enumerate() {
            if bin.remaining_mm >= needed {
                let slack = bin.remaining_mm - needed;
                if best.map_or(true, |(_, s)| slack < s) {
                    best = Some((bi, slack));
                }
            }
        }
        if let Some((bi, _)) = best {
            bins[bi].push_cut(len, kerf);
            continue;
        }

        // Tightest fit among supply options.
        let mut chosen: Option<(usize, i64)> = None;
        for (oi, opt) in supply.iter().enumerate() {
            if opt.unit.map_or(false, |u| consumed[u]) {
                continue;
            }
            if (opt.length_mm as i64) < needed {
                continue;
            }
            let slack = opt.length_mm as i64 - needed;
            let better = match chosen {
                None => true,
                Some((ci, cs)) => slack < cs || (slack == cs && tie_wins(opt, &supply[ci], tie)),
            };
            if better {
                chosen = Some((oi, slack));
            }
        }
        if let Some((oi, _)) = chosen {
            let opt = &supply[oi];
            if let Some(u) = opt.unit {
                consumed[u] = true;
            }
            let mut bin = Bin::open(opt.length_mm, opt.unit);
            bin.push_cut(len, kerf);
            bins.push(bin);
            continue;
        }

        match exhausted {
            Exhausted::Defer => deferred.push(len),
            Exhausted::ForceLargestNew => {
                let largest = supply
                    .iter()
                    .filter(|o| o.unit.is_none())
                    .max_by_key(|o| o.length_mm);
                match largest {
                    Some(opt) => {
                        let mut bin = Bin::open(opt.length_mm, None);
                        bin.push_cut(len, kerf);
                        bins.push(bin);
                    }
                    None => {
                        return Err(SolveError::UnservedRequest {
                            dia,
                            length_mm: len,
                        })
                    }
                }
            }
        }
    }

    let used_units = consumed
        .iter()
        .enumerate()
        .filter(|&(_, &used)| used)
        .map(|(i, _)| i)
        .collect();

    Ok(PackOutcome {
        bins,
        used_units,
        deferred,
    })
}

fn tie_wins(candidate: &SupplyOption, incumbent: &SupplyOption, tie: TieBreak) -> bool {
    match tie {
        TieBreak::PreferInventory => candidate.unit.is_some() && incumbent.unit.is_none(),
        TieBreak::PreferNewStock => candidate.unit.is_none() && incumbent.unit.is_some(),
    }
}
