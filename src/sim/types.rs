//! Core value types: sensor readings, alerts, predictions, and analytics.

use std::fmt;

use chrono::{DateTime, Local};
use serde::Serialize;
use uuid::Uuid;

/// Voltage, current, and power of a single DC subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerReading {
    /// Bus voltage (V).
    pub voltage_v: f64,
    /// Current (A), derived as `power_w / voltage_v`.
    pub current_a: f64,
    /// Power (W, non-negative).
    pub power_w: f64,
}

impl PowerReading {
    /// Builds a reading from power and voltage, deriving the current.
    pub fn from_power(power_w: f64, voltage_v: f64) -> Self {
        Self {
            voltage_v,
            current_a: power_w / voltage_v,
            power_w,
        }
    }
}

/// Wind turbine measurements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindReading {
    /// Turbine output voltage (V).
    pub voltage_v: f64,
    /// Output current (A).
    pub current_a: f64,
    /// Output power (W, non-negative).
    pub power_w: f64,
    /// Wind speed at hub height (m/s).
    pub speed_ms: f64,
}

/// Battery pack measurements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatteryReading {
    /// Pack voltage (V).
    pub voltage_v: f64,
    /// Pack current (A; positive = charging, negative = discharging).
    pub current_a: f64,
    /// State of charge (%), always within `[10, 100]`.
    pub soc: f64,
    /// State of health (%), always within `[80, 100]`.
    pub soh: f64,
    /// Cell temperature (°C).
    pub temperature_c: f64,
}

/// One timestamped telemetry snapshot of a microgrid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReading {
    pub id: Uuid,
    pub microgrid_id: String,
    pub timestamp: DateTime<Local>,
    pub solar: PowerReading,
    pub wind: WindReading,
    pub battery: BatteryReading,
    pub load: PowerReading,
    /// Ambient temperature, independent of the battery cell temperature (°C).
    pub ambient_temperature_c: f64,
}

impl SensorReading {
    /// Generation minus consumption (W; negative = deficit).
    pub fn net_power_w(&self) -> f64 {
        self.solar.power_w + self.wind.power_w - self.load.power_w
    }

    /// Operating status shown for this reading.
    pub fn status(&self) -> SystemStatus {
        if self.battery.soc < 15.0 || self.battery.temperature_c > 45.0 {
            SystemStatus::Fault
        } else {
            SystemStatus::Online
        }
    }
}

/// Microgrid operating status derived from the battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemStatus {
    Online,
    /// SoC below 15 % or cell temperature above 45 °C.
    Fault,
}

impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Online => "online",
            Self::Fault => "fault",
        })
    }
}

impl fmt::Display for SensorReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] | solar={:>7.1} W  wind={:>7.1} W ({:>4.1} m/s)  load={:>7.1} W | \
             net={:>8.1} W | SoC={:>5.1}%  SoH={:>6.3}%  T={:>4.1}°C | ambient={:.1}°C | {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.microgrid_id,
            self.solar.power_w,
            self.wind.power_w,
            self.wind.speed_ms,
            self.load.power_w,
            self.net_power_w(),
            self.battery.soc,
            self.battery.soh,
            self.battery.temperature_c,
            self.ambient_temperature_c,
            self.status(),
        )
    }
}

/// Severity class of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Fault,
    Warning,
    Info,
    Critical,
}

impl AlertType {
    /// All alert types, in declaration order.
    pub const ALL: [AlertType; 4] = [Self::Fault, Self::Warning, Self::Info, Self::Critical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fault => "fault",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Critical => "critical",
        }
    }
}

/// Subsystem an alert refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    Battery,
    Solar,
    Wind,
    Load,
    System,
}

impl AlertCategory {
    /// All alert categories, in declaration order.
    pub const ALL: [AlertCategory; 5] = [
        Self::Battery,
        Self::Solar,
        Self::Wind,
        Self::Load,
        Self::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Battery => "battery",
            Self::Solar => "solar",
            Self::Wind => "wind",
            Self::Load => "load",
            Self::System => "system",
        }
    }
}

/// Operator lifecycle state of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Resolved,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Acknowledged => "acknowledged",
            Self::Resolved => "resolved",
        }
    }
}

/// The detector rule that produced an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertRule {
    BatteryLow,
    BatteryTemperature,
    BatteryHealth,
    SolarLow,
    WindHigh,
    PowerDeficit,
}

impl AlertRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BatteryLow => "battery_low",
            Self::BatteryTemperature => "battery_temperature",
            Self::BatteryHealth => "battery_health",
            Self::SolarLow => "solar_low",
            Self::WindHigh => "wind_high",
            Self::PowerDeficit => "power_deficit",
        }
    }
}

/// Numeric alert severity on a 1 (lowest) to 5 (highest) scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Severity(u8);

impl Severity {
    pub const MIN: Severity = Severity(1);
    pub const MAX: Severity = Severity(5);

    /// Creates a severity, clamping `level` into `1..=5`.
    pub fn new(level: u8) -> Self {
        Self(level.clamp(Self::MIN.0, Self::MAX.0))
    }

    pub fn level(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A detected anomaly.
///
/// The detector only ever creates `Active` alerts. Acknowledge and resolve
/// are operator actions, applied by consumers through [`Alert::acknowledge`]
/// and [`Alert::resolve`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub id: Uuid,
    pub microgrid_id: String,
    pub rule: AlertRule,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub category: AlertCategory,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub status: AlertStatus,
    pub acknowledged_by: Option<String>,
    pub acknowledged_at: Option<DateTime<Local>>,
    pub resolved_at: Option<DateTime<Local>>,
    pub created_at: DateTime<Local>,
}

impl Alert {
    /// Marks an active alert as acknowledged by `by`.
    ///
    /// Returns `false` and leaves the alert untouched unless it is `Active`.
    pub fn acknowledge(&mut self, by: impl Into<String>, at: DateTime<Local>) -> bool {
        if self.status != AlertStatus::Active {
            return false;
        }
        self.status = AlertStatus::Acknowledged;
        self.acknowledged_by = Some(by.into());
        self.acknowledged_at = Some(at);
        true
    }

    /// Marks the alert as resolved. Returns `false` if it already was.
    pub fn resolve(&mut self, at: DateTime<Local>) -> bool {
        if self.status == AlertStatus::Resolved {
            return false;
        }
        self.status = AlertStatus::Resolved;
        self.resolved_at = Some(at);
        true
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}/{} sev={} {}: {}",
            self.created_at.format("%Y-%m-%d %H:%M:%S"),
            self.microgrid_id,
            self.alert_type.as_str(),
            self.category.as_str(),
            self.severity,
            self.title,
            self.description,
        )
    }
}

/// Kind of advisory record.
///
/// `Failure` is declared for forward compatibility and is never produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionType {
    Energy,
    BatteryLife,
    Maintenance,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradationRate {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceReason {
    HighOperatingTemperature,
    DecliningHealthMetrics,
}

impl fmt::Display for MaintenanceReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::HighOperatingTemperature => "High operating temperature",
            Self::DecliningHealthMetrics => "Declining health metrics",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

/// Per-type payload of an advisory record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "prediction_type", rename_all = "snake_case")]
pub enum PredictedValue {
    BatteryLife {
        estimated_soh_in_one_year: f64,
        recommended_replacement_date: DateTime<Local>,
        cycles_degrading: DegradationRate,
        cost_savings: f64,
    },
    Energy {
        next_24h_solar_kwh: f64,
        next_24h_wind_kwh: f64,
        next_24h_load_kwh: f64,
        expected_battery_soc_end: f64,
    },
    Maintenance {
        component: String,
        reason: MaintenanceReason,
        urgency: Urgency,
        estimated_cost: f64,
    },
}

impl PredictedValue {
    pub fn prediction_type(&self) -> PredictionType {
        match self {
            Self::BatteryLife { .. } => PredictionType::BatteryLife,
            Self::Energy { .. } => PredictionType::Energy,
            Self::Maintenance { .. } => PredictionType::Maintenance,
        }
    }
}

/// A forward-looking advisory record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiPrediction {
    pub id: Uuid,
    pub microgrid_id: String,
    /// Date the prediction refers to.
    pub prediction_date: DateTime<Local>,
    /// Fixed per prediction type.
    pub confidence_score: f64,
    pub predicted_value: PredictedValue,
    /// Reserved for comparing against observed outcomes; never populated.
    pub actual_value: Option<PredictedValue>,
    pub created_at: DateTime<Local>,
}

impl AiPrediction {
    pub fn prediction_type(&self) -> PredictionType {
        self.predicted_value.prediction_type()
    }
}

impl fmt::Display for AiPrediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = self.prediction_date.format("%Y-%m-%d");
        let confidence = self.confidence_score * 100.0;
        match &self.predicted_value {
            PredictedValue::BatteryLife {
                estimated_soh_in_one_year,
                recommended_replacement_date,
                cost_savings,
                ..
            } => write!(
                f,
                "battery life by {date} ({confidence:.0}%): SoH {estimated_soh_in_one_year:.1}%, \
                 replace by {}, savings ${cost_savings:.0}",
                recommended_replacement_date.format("%Y-%m-%d"),
            ),
            PredictedValue::Energy {
                next_24h_solar_kwh,
                next_24h_wind_kwh,
                next_24h_load_kwh,
                expected_battery_soc_end,
            } => write!(
                f,
                "energy by {date} ({confidence:.0}%): solar {next_24h_solar_kwh:.1} kWh, \
                 wind {next_24h_wind_kwh:.1} kWh, load {next_24h_load_kwh:.1} kWh, \
                 SoC {expected_battery_soc_end:.1}%",
            ),
            PredictedValue::Maintenance {
                component,
                reason,
                estimated_cost,
                ..
            } => write!(
                f,
                "maintenance by {date} ({confidence:.0}%): {component}, {reason}, \
                 est. ${estimated_cost:.0}",
            ),
        }
    }
}

/// Aggregation window of an analytics rollup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsPeriod {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

/// Energy totals over one analytics period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyAnalytics {
    pub id: Uuid,
    pub microgrid_id: String,
    pub date: DateTime<Local>,
    pub period: AnalyticsPeriod,
    pub solar_energy_kwh: f64,
    pub wind_energy_kwh: f64,
    pub battery_charged_kwh: f64,
    pub battery_discharged_kwh: f64,
    pub load_consumed_kwh: f64,
    pub grid_export_kwh: f64,
    pub grid_import_kwh: f64,
    pub efficiency_percent: f64,
}

impl fmt::Display for EnergyAnalytics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Daily Analytics ({}) ---", self.date.format("%Y-%m-%d"))?;
        writeln!(f, "Solar energy:        {:.1} kWh", self.solar_energy_kwh)?;
        writeln!(f, "Wind energy:         {:.1} kWh", self.wind_energy_kwh)?;
        writeln!(f, "Battery charged:     {:.1} kWh", self.battery_charged_kwh)?;
        writeln!(f, "Battery discharged:  {:.1} kWh", self.battery_discharged_kwh)?;
        writeln!(f, "Load consumed:       {:.1} kWh", self.load_consumed_kwh)?;
        writeln!(f, "Grid export:         {:.1} kWh", self.grid_export_kwh)?;
        writeln!(f, "Grid import:         {:.1} kWh", self.grid_import_kwh)?;
        write!(f, "Efficiency:          {:.1}%", self.efficiency_percent)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{Local, TimeZone};

    use super::*;

    /// A quiet midday reading that triggers no detector rule.
    pub fn nominal_reading() -> SensorReading {
        SensorReading {
            id: Uuid::new_v4(),
            microgrid_id: "mg-test".to_string(),
            timestamp: Local.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            solar: PowerReading::from_power(6000.0, 48.0),
            wind: WindReading {
                voltage_v: 48.0,
                current_a: 2500.0 / 48.0,
                power_w: 2500.0,
                speed_ms: 9.0,
            },
            battery: BatteryReading {
                voltage_v: 50.5,
                current_a: 0.0,
                soc: 75.0,
                soh: 98.0,
                temperature_c: 30.0,
            },
            load: PowerReading::from_power(4500.0, 48.0),
            ambient_temperature_c: 24.0,
        }
    }

    /// Same as [`nominal_reading`] but stamped at `hour:00` local time.
    pub fn reading_at_hour(hour: u32) -> SensorReading {
        let mut r = nominal_reading();
        r.timestamp = Local.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap();
        r
    }
}
