//! Threshold-rule anomaly detection over single readings.

use chrono::Timelike;
use uuid::Uuid;

use super::types::{
    Alert, AlertCategory, AlertRule, AlertStatus, AlertType, SensorReading, Severity,
};

/// SoC below which the low-charge warning fires (%).
pub const LOW_SOC_PCT: f64 = 20.0;
/// SoC below which the low-charge warning escalates to severity 5 (%).
pub const CRITICAL_SOC_PCT: f64 = 10.0;
pub const MAX_BATTERY_TEMPERATURE_C: f64 = 45.0;
pub const MIN_HEALTHY_SOH_PCT: f64 = 85.0;
/// Minimum expected solar output during peak hours (W).
pub const MIN_PEAK_SOLAR_W: f64 = 500.0;
/// Peak solar window, inclusive local hours.
pub const PEAK_SOLAR_HOURS: (u32, u32) = (10, 14);
pub const MAX_WIND_SPEED_MS: f64 = 20.0;
/// Net power below which a deficit is reported when the battery is low (W).
pub const DEFICIT_THRESHOLD_W: f64 = -2_000.0;
pub const DEFICIT_SOC_PCT: f64 = 30.0;

/// Evaluates every rule against `reading` and returns the alerts that fire.
///
/// Rules are independent; any number may fire for one reading, and the
/// result is ordered as the rules are listed in [`AlertRule`]. The peak-hour
/// solar rule and `created_at` both use the reading's own timestamp, so the
/// result depends only on the reading (apart from fresh alert ids).
/// Repeated violations across readings produce repeated alerts.
pub fn detect_anomalies(reading: &SensorReading) -> Vec<Alert> {
    let mut alerts = Vec::new();
    let battery = &reading.battery;

    if battery.soc < LOW_SOC_PCT {
        let severity = if battery.soc < CRITICAL_SOC_PCT { 5 } else { 3 };
        alerts.push(alert(
            reading,
            AlertRule::BatteryLow,
            AlertType::Warning,
            AlertCategory::Battery,
            severity,
            "Low Battery Charge",
            format!(
                "Battery State of Charge is {:.1}%. Consider reducing load or increasing generation.",
                battery.soc
            ),
        ));
    }

    if battery.temperature_c > MAX_BATTERY_TEMPERATURE_C {
        alerts.push(alert(
            reading,
            AlertRule::BatteryTemperature,
            AlertType::Critical,
            AlertCategory::Battery,
            5,
            "High Battery Temperature",
            format!(
                "Battery temperature is {:.1}°C. Risk of thermal damage.",
                battery.temperature_c
            ),
        ));
    }

    if battery.soh < MIN_HEALTHY_SOH_PCT {
        alerts.push(alert(
            reading,
            AlertRule::BatteryHealth,
            AlertType::Warning,
            AlertCategory::Battery,
            3,
            "Degraded Battery Health",
            format!(
                "Battery State of Health is {:.1}%. Schedule maintenance soon.",
                battery.soh
            ),
        ));
    }

    let hour = reading.timestamp.hour();
    let (peak_start, peak_end) = PEAK_SOLAR_HOURS;
    if reading.solar.power_w < MIN_PEAK_SOLAR_W && (peak_start..=peak_end).contains(&hour) {
        alerts.push(alert(
            reading,
            AlertRule::SolarLow,
            AlertType::Warning,
            AlertCategory::Solar,
            4,
            "Low Solar Output",
            format!(
                "Solar power output is only {:.0}W during peak hours. Check for panel obstruction or fault.",
                reading.solar.power_w
            ),
        ));
    }

    if reading.wind.speed_ms > MAX_WIND_SPEED_MS {
        alerts.push(alert(
            reading,
            AlertRule::WindHigh,
            AlertType::Critical,
            AlertCategory::Wind,
            4,
            "High Wind Speed",
            format!(
                "Wind speed is {:.1} m/s. Wind turbine may enter protection mode.",
                reading.wind.speed_ms
            ),
        ));
    }

    let balance_w = reading.net_power_w();
    if balance_w < DEFICIT_THRESHOLD_W && battery.soc < DEFICIT_SOC_PCT {
        alerts.push(alert(
            reading,
            AlertRule::PowerDeficit,
            AlertType::Fault,
            AlertCategory::System,
            5,
            "Power Deficit",
            format!(
                "System is consuming {:.0}W more than generating. Battery depleting rapidly.",
                balance_w.abs()
            ),
        ));
    }

    alerts
}

fn alert(
    reading: &SensorReading,
    rule: AlertRule,
    alert_type: AlertType,
    category: AlertCategory,
    severity: u8,
    title: &str,
    description: String,
) -> Alert {
    Alert {
        id: Uuid::new_v4(),
        microgrid_id: reading.microgrid_id.clone(),
        rule,
        alert_type,
        category,
        title: title.to_string(),
        description,
        severity: Severity::new(severity),
        status: AlertStatus::Active,
        acknowledged_by: None,
        acknowledged_at: None,
        resolved_at: None,
        created_at: reading.timestamp,
    }
}
