use serde::{Deserialize, Serialize};

use crate::error::{SolveError, SolveResult};
use crate::solver::Solver;
use crate::types::{
    BarRun, DirectPiece, LapCase, LapRule, MemberType, OffcutInventoryItem, ProjectSettings,
    SpliceZone, StockCatalogItem,
};

/// Fallback zone policy: a narrow band centered on the segment midpoint.
const FALLBACK_BAND_MM: u32 = 400;

fn default_project_name() -> String {
    "untitled".to_string()
}

fn default_units() -> String {
    "mm".to_string()
}

/// A bar run as stored in the project file. The run's total length and
/// allowed splice zones are not persisted; they are recomputed from
/// `geometry` and the member type on every load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarRunRow {
    pub id: String,
    pub bar_mark: String,
    pub member_type: MemberType,
    pub dia: u32,
    pub qty: u32,
    /// Comma-separated segment lengths in mm, e.g. `"3200,3200,3600"`.
    pub geometry: String,
}

impl BarRunRow {
    pub fn compile(&self, settings: &ProjectSettings) -> SolveResult<BarRun> {
        let segments = parse_geometry(&self.geometry)?;
        let total_length_mm = segments.iter().sum();
        let allowed_zones = allowed_zones(self.member_type, &segments, settings.beam_depth_mm);
        Ok(BarRun {
            id: self.id.clone(),
            bar_mark: self.bar_mark.clone(),
            member_type: self.member_type,
            dia: self.dia,
            qty_parallel: self.qty,
            total_length_mm,
            allowed_zones,
        })
    }
}

/// The persisted project document: settings plus the five input tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default = "default_project_name")]
    pub project_name: String,
    #[serde(default = "default_units")]
    pub units: String,
    #[serde(default)]
    pub settings: ProjectSettings,
    #[serde(default)]
    pub stock: Vec<StockCatalogItem>,
    #[serde(default)]
    pub inventory: Vec<OffcutInventoryItem>,
    #[serde(default)]
    pub rules: Vec<LapRule>,
    #[serde(default)]
    pub bar_runs: Vec<BarRunRow>,
    #[serde(default)]
    pub fixed_pieces: Vec<DirectPiece>,
}

impl Project {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Recompute run lengths and zones from geometry and build the solver.
    pub fn solver(&self) -> SolveResult<Solver> {
        let runs = self
            .bar_runs
            .iter()
            .map(|row| row.compile(&self.settings))
            .collect::<SolveResult<Vec<_>>>()?;
        Ok(Solver::new(
            runs,
            self.fixed_pieces.clone(),
            self.settings.clone(),
            self.stock.clone(),
            self.rules.clone(),
            self.inventory.clone(),
        ))
    }
}

pub fn parse_geometry(raw: &str) -> SolveResult<Vec<u32>> {
    let invalid = |reason: &str| SolveError::InvalidGeometry {
        raw: raw.to_string(),
        reason: reason.to_string(),
    };
    let mut segments = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            return Err(invalid("empty segment"));
        }
        let length: u32 = part
            .parse()
            .map_err(|_| invalid("segment is not a whole number of mm"))?;
        if length == 0 {
            return Err(invalid("segment length must be positive"));
        }
        segments.push(length);
    }
    if segments.is_empty() {
        return Err(invalid("no segments"));
    }
    Ok(segments)
}

/// Code-permitted splice zones along a run, per segment, offsets accumulated
/// so the returned list is ascending along the whole run.
///
/// - Column vertical splice: middle half of each segment.
/// - Beam top: middle third.
/// - Beam bottom: `[2h, L/3]` and `[2L/3, L − 2h]` per span, either omitted
///   when its start reaches its end.
/// - Everything else: a 400 mm band centered on the segment midpoint.
pub fn allowed_zones(member: MemberType, segments: &[u32], beam_depth_mm: u32) -> Vec<SpliceZone> {
    let mut zones = Vec::new();
    let mut offset: u32 = 0;
    for &len in segments {
        match member.lap_case() {
            LapCase::ColumnVertical => {
                push_zone(&mut zones, offset + len / 4, offset + 3 * len / 4);
            }
            LapCase::BeamTop => {
                push_zone(&mut zones, offset + len / 3, offset + 2 * len / 3);
            }
            LapCase::BeamBottom => {
                let clear = 2 * beam_depth_mm;
                push_zone(&mut zones, offset + clear, offset + len / 3);
                push_zone(
                    &mut zones,
                    offset + 2 * len / 3,
                    offset + len.saturating_sub(clear),
                );
            }
            LapCase::General => {
                let mid = len / 2;
                let start = mid.saturating_sub(FALLBACK_BAND_MM / 2);
                let end = (mid + FALLBACK_BAND_MM / 2).min(len);
                push_zone(&mut zones, offset + start, offset + end);
            }
        }
        offset += len;
    }
    zones
}

fn push_zone(zones: &mut Vec<SpliceZone>, start_mm: u32, end_mm: u32) {
    if start_mm < end_mm {
        zones.push(SpliceZone::new(start_mm, end_mm));
    }
}
