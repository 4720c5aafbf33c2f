//! CSV export for simulated readings and raised alerts.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::{Alert, SensorReading};

/// Column header for reading telemetry.
const READINGS_HEADER: &str = "timestamp,microgrid_id,solar_w,solar_v,solar_a,\
                               wind_w,wind_v,wind_a,wind_speed_ms,\
                               battery_v,battery_a,battery_soc,battery_soh,battery_temp_c,\
                               load_w,load_v,load_a,ambient_temp_c,net_w";

/// Column header for alert logs.
const ALERTS_HEADER: &str = "created_at,microgrid_id,rule,type,category,severity,status,\
                             title,description";

/// Exports readings to a CSV file at the given path.
///
/// Writes a header row followed by one data row per reading. Produces
/// deterministic output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_readings_csv(readings: &[SensorReading], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_readings_csv(readings, io::BufWriter::new(file))
}

/// Writes readings as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_readings_csv(readings: &[SensorReading], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(READINGS_HEADER.split(',').map(str::trim))?;

    for r in readings {
        wtr.write_record(&[
            r.timestamp.to_rfc3339(),
            r.microgrid_id.clone(),
            format!("{:.2}", r.solar.power_w),
            format!("{:.3}", r.solar.voltage_v),
            format!("{:.3}", r.solar.current_a),
            format!("{:.2}", r.wind.power_w),
            format!("{:.3}", r.wind.voltage_v),
            format!("{:.3}", r.wind.current_a),
            format!("{:.2}", r.wind.speed_ms),
            format!("{:.3}", r.battery.voltage_v),
            format!("{:.3}", r.battery.current_a),
            format!("{:.4}", r.battery.soc),
            format!("{:.4}", r.battery.soh),
            format!("{:.2}", r.battery.temperature_c),
            format!("{:.2}", r.load.power_w),
            format!("{:.3}", r.load.voltage_v),
            format!("{:.3}", r.load.current_a),
            format!("{:.2}", r.ambient_temperature_c),
            format!("{:.2}", r.net_power_w()),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports alerts to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_alerts_csv(alerts: &[Alert], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_alerts_csv(alerts, io::BufWriter::new(file))
}

/// Writes alerts as CSV to any writer. Descriptions are quoted as needed.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_alerts_csv(alerts: &[Alert], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(ALERTS_HEADER.split(',').map(str::trim))?;

    for a in alerts {
        wtr.write_record(&[
            a.created_at.to_rfc3339(),
            a.microgrid_id.clone(),
            a.rule.as_str().to_string(),
            a.alert_type.as_str().to_string(),
            a.category.as_str().to_string(),
            a.severity.level().to_string(),
            a.status.as_str().to_string(),
            a.title.clone(),
            a.description.clone(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
