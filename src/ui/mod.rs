pub mod panels;
pub mod plot;
pub mod tabs;

use std::collections::BTreeMap;

use crate::data::model::Channel;
use crate::data::process::SurveyRegion;

/// Text being edited in the UI but not yet applied to the session.
#[derive(Debug, Clone)]
pub struct Drafts {
    pub station: String,
    pub regions: Vec<SurveyRegion>,
    pub crop_from: f64,
    pub crop_to: f64,
    pub resample_step: f64,
    pub energy_min: f64,
    pub energy_max: f64,
    pub percentile_start: f64,
    pub percentile_end: f64,
    /// Target hole length per channel for depth stretching.
    pub stretch_targets: BTreeMap<Channel, f64>,
}

impl Default for Drafts {
    fn default() -> Self {
        Self {
            station: String::new(),
            regions: Vec::new(),
            crop_from: 0.0,
            crop_to: 30.0,
            resample_step: 0.02,
            energy_min: 0.0,
            energy_max: 1000.0,
            percentile_start: 0.0,
            percentile_end: 100.0,
            stretch_targets: BTreeMap::new(),
        }
    }
}
