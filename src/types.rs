use serde::{Deserialize, Serialize};

use crate::error::{SolveError, SolveResult};

/// Iteration budget for the Monte Carlo packing driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptimizationLevel {
    Fast,
    Balanced,
    Deep,
}

impl OptimizationLevel {
    pub fn iterations(self) -> usize {
        match self {
            OptimizationLevel::Fast => 1,
            OptimizationLevel::Balanced => 50,
            OptimizationLevel::Deep => 200,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InventoryStrategy {
    /// Consume yard offcuts first, then pack the remainder from new stock.
    Sequential,
    /// Offer offcuts and new stock as one combined supply pool.
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberType {
    Column,
    BeamTop,
    BeamBottom,
    Slab,
    Foundation,
}

impl MemberType {
    /// Lap case governing splice length and allowed-zone policy.
    pub fn lap_case(self) -> LapCase {
        match self {
            MemberType::Column => LapCase::ColumnVertical,
            MemberType::BeamTop => LapCase::BeamTop,
            MemberType::BeamBottom => LapCase::BeamBottom,
            MemberType::Slab | MemberType::Foundation => LapCase::General,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LapCase {
    ColumnVertical,
    BeamTop,
    BeamBottom,
    General,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    /// Cut lengths are floored to a multiple of this step.
    pub rounding_step_mm: u32,
    /// Material consumed by each saw cut.
    pub kerf_mm: u32,
    /// Residual at or above this length is a reusable offcut, below it waste.
    pub min_leftover_mm: u32,
    /// When false every residual is waste regardless of `min_leftover_mm`.
    pub allow_offcuts: bool,
    /// Beam depth `h`, used by the beam-bottom zone policy.
    pub beam_depth_mm: u32,
    pub optimization_level: OptimizationLevel,
    pub inventory_strategy: InventoryStrategy,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            rounding_step_mm: 10,
            kerf_mm: 5,
            min_leftover_mm: 1_000,
            allow_offcuts: true,
            beam_depth_mm: 500,
            optimization_level: OptimizationLevel::Balanced,
            inventory_strategy: InventoryStrategy::Sequential,
        }
    }
}

impl ProjectSettings {
    pub fn validate(&self) -> SolveResult<()> {
        if self.rounding_step_mm == 0 {
            return Err(SolveError::InvalidSettings(
                "rounding_step_mm must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockCatalogItem {
    pub dia: u32,
    pub stock_lengths: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffcutInventoryItem {
    pub id: String,
    pub dia: u32,
    pub length_mm: u32,
    /// Each unit of the quantity is a distinct consumable bar.
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LapRule {
    pub dia: u32,
    pub lap_case: LapCase,
    pub length_mm: u32,
}

/// Half-open interval `[start, end)` along a run's axis where the splice
/// center may fall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpliceZone {
    pub start_mm: u32,
    pub end_mm: u32,
}

impl SpliceZone {
    pub fn new(start_mm: u32, end_mm: u32) -> Self {
        Self { start_mm, end_mm }
    }

    pub fn contains(&self, pos_mm: i64) -> bool {
        self.start_mm as i64 <= pos_mm && pos_mm < self.end_mm as i64
    }

    pub fn width(&self) -> u32 {
        self.end_mm.saturating_sub(self.start_mm)
    }
}

/// One continuous reinforcement line, possibly spanning several segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarRun {
    pub id: String,
    pub bar_mark: String,
    pub member_type: MemberType,
    pub dia: u32,
    /// Identical parallel bars spliced together at the same stations
    /// (Class B, 100%).
    pub qty_parallel: u32,
    pub total_length_mm: u32,
    /// Ascending, non-overlapping.
    pub allowed_zones: Vec<SpliceZone>,
}

/// An already-detailed piece that only needs cutting, no splice planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectPiece {
    pub id: String,
    pub bar_mark: String,
    pub dia: u32,
    pub length_mm: u32,
    pub qty: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplicePiece {
    pub length_mm: u32,
    pub start_mm: u32,
    pub end_mm: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplicePlanItem {
    pub run_id: String,
    pub bar_mark: String,
    /// Always 0 under Class B: all parallel bars share splice stations.
    pub group_id: u32,
    /// Ascending by start; consecutive pieces overlap by the lap length.
    pub pieces: Vec<SplicePiece>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    NewStock,
    ExistingInventory,
}

/// One cutting pattern: `count` bars of `stock_length_mm` each sawn into
/// `cuts`. Exactly one of `waste_mm`/`offcut_mm` is positive (or both zero).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuttingPlanItem {
    pub dia: u32,
    pub source: SourceType,
    pub stock_length_mm: u32,
    /// Sorted descending.
    pub cuts: Vec<u32>,
    pub count: u32,
    pub waste_mm: u32,
    pub offcut_mm: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcurementItem {
    pub dia: u32,
    pub stock_length_mm: u32,
    pub quantity: u32,
    pub total_length_mm: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Σ stock length over all bins, inventory included.
    pub total_input_mm: u64,
    /// Σ cut length over all bins.
    pub total_parts_mm: u64,
    /// Input minus parts; kerf losses are absorbed into waste by definition.
    pub total_waste_mm: u64,
    /// Rounded to 0.01 %.
    pub waste_percent: f64,
    /// Σ (dia²/162) kg/m over all bins, rounded to 0.01 kg.
    pub total_weight_kg: f64,
    pub new_bar_count: u32,
    pub inventory_bar_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub splice_plan: Vec<SplicePlanItem>,
    pub cutting_plan: Vec<CuttingPlanItem>,
    pub procurement: Vec<ProcurementItem>,
    pub summary: Summary,
    pub warnings: Vec<String>,
}

/// Nominal bar weight: `dia²/162` kg per meter.
pub fn weight_kg(dia: u32, length_mm: u32) -> f64 {
    (dia * dia) as f64 / 162.0 * (length_mm as f64 / 1000.0)
}
