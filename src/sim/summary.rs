//! Post-hoc statistics over a batch of readings and alerts.

use std::fmt;

use super::types::{Alert, AlertCategory, AlertType, SensorReading};

/// Aggregate figures derived from a complete simulation run.
///
/// Computed after the run from the recorded readings and alerts so the
/// report always agrees with exported telemetry.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Number of readings in the run.
    pub steps: usize,
    pub min_soc: f64,
    pub max_soc: f64,
    pub final_soc: f64,
    pub final_soh: f64,
    /// Mean smoothed solar output (W).
    pub mean_solar_w: f64,
    /// Mean smoothed wind output (W).
    pub mean_wind_w: f64,
    /// Mean load demand (W).
    pub mean_load_w: f64,
    /// Solar energy (kWh, sum of power * dt).
    pub solar_energy_kwh: f64,
    pub wind_energy_kwh: f64,
    pub load_energy_kwh: f64,
    /// Alert counts in [`AlertCategory::ALL`] order.
    pub alerts_by_category: Vec<(AlertCategory, usize)>,
    /// Alert counts in [`AlertType::ALL`] order.
    pub alerts_by_type: Vec<(AlertType, usize)>,
}

impl RunSummary {
    /// Computes the summary.
    ///
    /// # Arguments
    ///
    /// * `readings` - Every reading of the run, in order
    /// * `alerts` - Every alert raised during the run
    /// * `step_hours` - Simulated time between readings in hours
    pub fn from_run(readings: &[SensorReading], alerts: &[Alert], step_hours: f64) -> Self {
        let alerts_by_category = AlertCategory::ALL
            .iter()
            .map(|c| (*c, alerts.iter().filter(|a| a.category == *c).count()))
            .collect();
        let alerts_by_type = AlertType::ALL
            .iter()
            .map(|t| (*t, alerts.iter().filter(|a| a.alert_type == *t).count()))
            .collect();

        let Some(last) = readings.last() else {
            return Self {
                steps: 0,
                min_soc: 0.0,
                max_soc: 0.0,
                final_soc: 0.0,
                final_soh: 0.0,
                mean_solar_w: 0.0,
                mean_wind_w: 0.0,
                mean_load_w: 0.0,
                solar_energy_kwh: 0.0,
                wind_energy_kwh: 0.0,
                load_energy_kwh: 0.0,
                alerts_by_category,
                alerts_by_type,
            };
        };

        let n = readings.len() as f64;
        let mut min_soc = f64::INFINITY;
        let mut max_soc = f64::NEG_INFINITY;
        let mut solar_sum = 0.0;
        let mut wind_sum = 0.0;
        let mut load_sum = 0.0;

        for r in readings {
            min_soc = min_soc.min(r.battery.soc);
            max_soc = max_soc.max(r.battery.soc);
            solar_sum += r.solar.power_w;
            wind_sum += r.wind.power_w;
            load_sum += r.load.power_w;
        }

        let kwh = |sum_w: f64| sum_w * step_hours / 1_000.0;

        Self {
            steps: readings.len(),
            min_soc,
            max_soc,
            final_soc: last.battery.soc,
            final_soh: last.battery.soh,
            mean_solar_w: solar_sum / n,
            mean_wind_w: wind_sum / n,
            mean_load_w: load_sum / n,
            solar_energy_kwh: kwh(solar_sum),
            wind_energy_kwh: kwh(wind_sum),
            load_energy_kwh: kwh(load_sum),
            alerts_by_category,
            alerts_by_type,
        }
    }

    /// Total number of alerts raised.
    pub fn total_alerts(&self) -> usize {
        self.alerts_by_type.iter().map(|(_, n)| n).sum()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Run Summary ---")?;
        writeln!(f, "Steps:                 {}", self.steps)?;
        writeln!(
            f,
            "Battery SoC:           {:.1}% final ({:.1}% min, {:.1}% max)",
            self.final_soc, self.min_soc, self.max_soc
        )?;
        writeln!(f, "Battery SoH:           {:.3}%", self.final_soh)?;
        writeln!(
            f,
            "Solar:                 {:.0} W mean, {:.2} kWh",
            self.mean_solar_w, self.solar_energy_kwh
        )?;
        writeln!(
            f,
            "Wind:                  {:.0} W mean, {:.2} kWh",
            self.mean_wind_w, self.wind_energy_kwh
        )?;
        writeln!(
            f,
            "Load:                  {:.0} W mean, {:.2} kWh",
            self.mean_load_w, self.load_energy_kwh
        )?;
        let by_type: Vec<String> = self
            .alerts_by_type
            .iter()
            .map(|(t, n)| format!("{} {n}", t.as_str()))
            .collect();
        writeln!(
            f,
            "Alerts:                {} ({})",
            self.total_alerts(),
            by_type.join(", ")
        )?;
        let by_category: Vec<String> = self
            .alerts_by_category
            .iter()
            .filter(|(_, n)| *n > 0)
            .map(|(c, n)| format!("{} {n}", c.as_str()))
            .collect();
        if by_category.is_empty() {
            write!(f, "Alerts by category:    none")
        } else {
            write!(f, "Alerts by category:    {}", by_category.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::anomaly::detect_anomalies;
    use crate::sim::types::fixtures::nominal_reading;

    fn reading(soc: f64, solar_w: f64) -> SensorReading {
        let mut r = nominal_reading();
        r.battery.soc = soc;
        r.solar.power_w = solar_w;
        r
    }

    #[test]
    fn soc_extremes_and_final_values() {
        let readings = vec![reading(50.0, 0.0), reading(30.0, 0.0), reading(70.0, 0.0)];
        let s = RunSummary::from_run(&readings, &[], 1.0);
        assert_eq!(s.steps, 3);
        assert_eq!(s.min_soc, 30.0);
        assert_eq!(s.max_soc, 70.0);
        assert_eq!(s.final_soc, 70.0);
        assert_eq!(s.final_soh, 98.0);
    }

    #[test]
    fn energy_uses_step_duration() {
        // 4 readings of 2000 W solar at 0.5 h each = 4 kWh
        let readings = vec![reading(50.0, 2_000.0); 4];
        let s = RunSummary::from_run(&readings, &[], 0.5);
        assert!((s.solar_energy_kwh - 4.0).abs() < 1e-9);
        assert!((s.mean_solar_w - 2_000.0).abs() < 1e-9);
        // load is 4500 W in the fixture
        assert!((s.load_energy_kwh - 9.0).abs() < 1e-9);
    }

    #[test]
    fn alerts_are_counted_by_category_and_type() {
        let mut r = nominal_reading();
        r.battery.soc = 15.0;
        r.battery.temperature_c = 50.0;
        r.wind.speed_ms = 25.0;
        let alerts = detect_anomalies(&r);
        let s = RunSummary::from_run(&[r], &alerts, 1.0);

        assert_eq!(s.total_alerts(), 3);
        let count = |c: AlertCategory| {
            s.alerts_by_category
                .iter()
                .find(|(k, _)| *k == c)
                .map(|(_, n)| *n)
        };
        assert_eq!(count(AlertCategory::Battery), Some(2));
        assert_eq!(count(AlertCategory::Wind), Some(1));
        assert_eq!(count(AlertCategory::Solar), Some(0));
        let critical = s
            .alerts_by_type
            .iter()
            .find(|(t, _)| *t == AlertType::Critical)
            .map(|(_, n)| *n);
        assert_eq!(critical, Some(2));
    }

    #[test]
    fn empty_run() {
        let s = RunSummary::from_run(&[], &[], 1.0);
        assert_eq!(s.steps, 0);
        assert_eq!(s.total_alerts(), 0);
        assert_eq!(s.alerts_by_category.len(), AlertCategory::ALL.len());
        assert!(s.to_string().contains("none"));
    }
}
