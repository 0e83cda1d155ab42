//! Tuning constants for the settlement simulation. Every field has a serde
//! default so scenario files only name what they change. Rates are per second.

use serde::{Deserialize, Serialize};

fn default_food_per_capita() -> f64 {
    0.05
}

fn default_water_per_capita() -> f64 {
    0.05
}

fn default_power_per_capita() -> f64 {
    0.02
}

fn default_initial_happiness() -> f64 {
    50.0
}

fn default_decay_rate() -> f64 {
    2.0
}

fn default_recovery_rate() -> f64 {
    1.0
}

fn default_power_bonus() -> f64 {
    0.2
}

fn default_medicine_bonus() -> f64 {
    0.1
}

fn default_growth_interval() -> f64 {
    30.0
}

fn default_growth_happiness_min() -> f64 {
    60.0
}

fn default_death_no_food_interval() -> f64 {
    60.0
}

fn default_death_no_water_interval() -> f64 {
    30.0
}

fn default_base_max_population() -> u32 {
    5
}

fn default_workforce_ratio() -> f64 {
    1.0
}

fn default_max_tick_seconds() -> f64 {
    1.0
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_report_every_ticks() -> u64 {
    60
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerCapitaRates {
    #[serde(default = "default_food_per_capita")]
    pub food: f64,
    #[serde(default = "default_water_per_capita")]
    pub water: f64,
    #[serde(default = "default_power_per_capita")]
    pub power: f64,
}

impl Default for PerCapitaRates {
    fn default() -> Self {
        Self {
            food: default_food_per_capita(),
            water: default_water_per_capita(),
            power: default_power_per_capita(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HappinessConfig {
    #[serde(default = "default_initial_happiness")]
    pub initial: f64,
    #[serde(default = "default_decay_rate")]
    pub decay_rate: f64,
    #[serde(default = "default_recovery_rate")]
    pub recovery_rate: f64,
    #[serde(default = "default_power_bonus")]
    pub power_bonus: f64,
    #[serde(default = "default_medicine_bonus")]
    pub medicine_bonus: f64,
}

impl Default for HappinessConfig {
    fn default() -> Self {
        Self {
            initial: default_initial_happiness(),
            decay_rate: default_decay_rate(),
            recovery_rate: default_recovery_rate(),
            power_bonus: default_power_bonus(),
            medicine_bonus: default_medicine_bonus(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub per_capita: PerCapitaRates,
    #[serde(default)]
    pub happiness: HappinessConfig,
    #[serde(default = "default_growth_interval")]
    pub growth_interval: f64,
    #[serde(default = "default_growth_happiness_min")]
    pub growth_happiness_min: f64,
    #[serde(default = "default_death_no_food_interval")]
    pub death_no_food_interval: f64,
    #[serde(default = "default_death_no_water_interval")]
    pub death_no_water_interval: f64,
    #[serde(default = "default_base_max_population")]
    pub base_max_population: u32,
    /// Share of the population that counts as workforce.
    #[serde(default = "default_workforce_ratio")]
    pub workforce_ratio: f64,
    #[serde(default = "default_max_tick_seconds")]
    pub max_tick_seconds: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            per_capita: PerCapitaRates::default(),
            happiness: HappinessConfig::default(),
            growth_interval: default_growth_interval(),
            growth_happiness_min: default_growth_happiness_min(),
            death_no_food_interval: default_death_no_food_interval(),
            death_no_water_interval: default_death_no_water_interval(),
            base_max_population: default_base_max_population(),
            workforce_ratio: default_workforce_ratio(),
            max_tick_seconds: default_max_tick_seconds(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// KPI log cadence for the runner; 0 disables it.
    #[serde(default = "default_report_every_ticks")]
    pub report_every_ticks: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            report_every_ticks: default_report_every_ticks(),
        }
    }
}
