use tracing::{debug, warn};

use crate::error::{SolveError, SolveResult};
use crate::rules::{LapSchedule, StockCatalog};
use crate::types::{BarRun, ProjectSettings, SplicePiece, SplicePlanItem, SpliceZone};

/// Safety floor for any emitted piece length.
pub const MIN_PIECE_MM: u32 = 1_000;

/// Zones wider than this get the splice pushed toward their far end.
const LONG_ZONE_MM: u32 = 1_000;

/// Clearance kept between a pushed splice and the zone end.
const ZONE_END_BUFFER_MM: i64 = 100;

/// Splice plan for all runs plus accumulated structural warnings.
#[derive(Debug, Clone)]
pub struct SplicePlan {
    /// One item per run, in input order.
    pub items: Vec<SplicePlanItem>,
    pub warnings: Vec<String>,
}

/// Walks each run and chooses cut points that respect the maximum stock
/// length while landing the lap inside a permitted zone.
pub struct SplicePlanner<'a> {
    laps: &'a LapSchedule,
    stock: &'a StockCatalog,
    settings: &'a ProjectSettings,
}

impl<'a> SplicePlanner<'a> {
    pub fn new(laps: &'a LapSchedule, stock: &'a StockCatalog, settings: &'a ProjectSettings) -> Self {
        Self {
            laps,
            stock,
            settings,
        }
    }

    pub fn plan(&self, runs: &[BarRun]) -> SolveResult<SplicePlan> {
        let mut items = Vec::with_capacity(runs.len());
        let mut warnings = Vec::new();
        for run in runs {
            validate_run(run)?;
            let (item, mut run_warnings) = self.plan_run(run)?;
            items.push(item);
            warnings.append(&mut run_warnings);
        }
        Ok(SplicePlan { items, warnings })
    }

    fn plan_run(&self, run: &BarRun) -> SolveResult<(SplicePlanItem, Vec<String>)> {
        let lap = self.laps.lap_length(run.dia, run.member_type.lap_case());
        let max_stock = self.stock.max_for(run.dia);
        if lap >= max_stock {
            return Err(SolveError::LapExceedsStock {
                bar_mark: run.bar_mark.clone(),
                lap_mm: lap,
                max_stock_mm: max_stock,
            });
        }

        let l = max_stock as i64;
        let lam = lap as i64;
        let half_lap = lam / 2;
        let step = self.settings.rounding_step_mm as i64;

        let mut pieces = Vec::new();
        let mut warnings = Vec::new();
        let mut cursor: i64 = 0;
        let mut remaining: i64 = run.total_length_mm as i64;

        loop {
            if remaining <= l {
                pieces.push(piece(cursor, remaining));
                break;
            }

            // The furthest this piece can reach with one stock bar.
            let reach = cursor + l;
            let center_target = reach - half_lap;
            let zone = pick_zone(&run.allowed_zones, center_target, reach);

            let (mut piece_len, violation) = match zone {
                Some(z) => {
                    let mut center = (z.start_mm as i64 + z.end_mm as i64) / 2;
                    if z.width() > LONG_ZONE_MM {
                        center = z.end_mm as i64 - half_lap - ZONE_END_BUFFER_MM;
                    }
                    if center + half_lap - cursor > l {
                        center = reach - half_lap;
                    }
                    ((center + half_lap) - cursor, false)
                }
                // No zone reachable: cut at stock max regardless.
                None => (l, true),
            };

            piece_len -= piece_len.rem_euclid(step);
            piece_len = piece_len.max(MIN_PIECE_MM as i64);

            if piece_len <= lam {
                return Err(SolveError::DegenerateCut {
                    bar_mark: run.bar_mark.clone(),
                    piece_mm: piece_len.max(0) as u32,
                    lap_mm: lap,
                });
            }

            if violation {
                let splice_pos = cursor + piece_len - half_lap;
                warn!(bar_mark = %run.bar_mark, splice_pos, "forced splice outside allowed zones");
                warnings.push(format!(
                    "STRUCTURAL WARNING [{}]: Forced splice at {} mm. \
                     No allowed zone reachable with stock {} mm.",
                    run.bar_mark, splice_pos, max_stock
                ));
            }

            pieces.push(piece(cursor, piece_len));
            cursor += piece_len - lam;
            remaining -= piece_len - lam;
        }

        debug!(
            bar_mark = %run.bar_mark,
            pieces = pieces.len(),
            lap_mm = lap,
            "planned run"
        );

        Ok((
            SplicePlanItem {
                run_id: run.id.clone(),
                bar_mark: run.bar_mark.clone(),
                group_id: 0,
                pieces,
            },
            warnings,
        ))
    }
}

fn piece(start: i64, length: i64) -> SplicePiece {
    SplicePiece {
        length_mm: length as u32,
        start_mm: start as u32,
        end_mm: (start + length) as u32,
    }
}

/// Prefer a zone containing the natural splice position; otherwise the
/// furthest zone that ends before the stock runs out, to maximize bar usage.
fn pick_zone(zones: &[SpliceZone], center_target: i64, reach: i64) -> Option<&SpliceZone> {
    if let Some(z) = zones.iter().find(|z| z.contains(center_target)) {
        return Some(z);
    }
    zones
        .iter()
        .filter(|z| (z.end_mm as i64) < reach)
        .max_by_key(|z| (z.end_mm, z.start_mm))
}

fn validate_run(run: &BarRun) -> SolveResult<()> {
    let invalid = |reason: &str| SolveError::InvalidRun {
        id: run.id.clone(),
        reason: reason.to_string(),
    };
    if run.dia == 0 {
        return Err(invalid("diameter must be positive"));
    }
    if run.total_length_mm == 0 {
        return Err(invalid("total length must be positive"));
    }
    if run.qty_parallel == 0 {
        return Err(invalid("parallel quantity must be positive"));
    }
    for zone in &run.allowed_zones {
        if zone.start_mm >= zone.end_mm {
            return Err(invalid("splice zone must have start < end"));
        }
    }
    for pair in run.allowed_zones.windows(2) {
        if pair[1].start_mm < pair[0].end_mm {
            return Err(invalid("splice zones must be ascending and non-overlapping"));
        }
    }
    Ok(())
}
