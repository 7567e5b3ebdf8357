// Occupancy math for lodging entities. Pure functions; thresholds are fixed
// design constants, not configuration.

use serde::{Deserialize, Serialize};

use crate::models::Hostel;

pub const WARNING_THRESHOLD: f32 = 0.8;
pub const CRITICAL_THRESHOLD: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupancyLevel {
    Normal,
    Warning,
    Critical,
}

// current / total clamped to [0, 1]; a zero-capacity entity reads as empty.
pub fn occupancy_ratio(current: u32, total: u32) -> f32 {
    if total == 0 {
        return 0.0;
    }
    (current as f32 / total as f32).clamp(0.0, 1.0)
}

pub fn occupancy_level(ratio: f32) -> OccupancyLevel {
    if ratio >= CRITICAL_THRESHOLD {
        OccupancyLevel::Critical
    } else if ratio >= WARNING_THRESHOLD {
        OccupancyLevel::Warning
    } else {
        OccupancyLevel::Normal
    }
}

// The three occupancy bars the hostel detail view renders, computed in one
// pass. The level is derived from the overall ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacitySnapshot {
    pub total_ratio: f32,
    pub men_ratio: f32,
    pub women_ratio: f32,
    pub level: OccupancyLevel,
}

impl CapacitySnapshot {
    pub fn of(hostel: &Hostel) -> Self {
        let total_ratio = occupancy_ratio(hostel.current_capacity, hostel.total_capacity);
        Self {
            total_ratio,
            men_ratio: occupancy_ratio(hostel.current_men_capacity, hostel.men_capacity),
            women_ratio: occupancy_ratio(hostel.current_women_capacity, hostel.women_capacity),
            level: occupancy_level(total_ratio),
        }
    }
}
