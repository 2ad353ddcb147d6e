use super::SpatialError;
use serde::{Deserialize, Serialize};

/// Sign restriction applied to a fitted elevation slope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TrendConstraint {
    /// A negative slope is replaced by the null trend.
    Positive,
    /// A positive slope is replaced by the null trend.
    Negative,
    #[default]
    Unconstrained,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
pub struct ElevationTrend {
    pub slope: f64,
    pub intercept: f64,
}

impl ElevationTrend {
    pub const NULL: Self = Self {
        slope: 0.0,
        intercept: 0.0,
    };

    pub fn at(&self, elevation: f64) -> f64 {
        self.slope * elevation + self.intercept
    }

    pub fn detrend(&self, elevation: f64, value: f64) -> f64 {
        value - self.at(elevation)
    }

    pub fn retrend(&self, elevation: f64, residual: f64) -> f64 {
        residual + self.at(elevation)
    }
}

/// Least-squares line `value = slope * elevation + intercept`.
pub fn fit_elevation_trend(
    elevations: &[f64],
    values: &[f64],
    constraint: TrendConstraint,
) -> Result<ElevationTrend, SpatialError> {
    if elevations.len() != values.len() {
        return Err(SpatialError::LengthMismatch {
            name: "trend values",
            expected: elevations.len(),
            actual: values.len(),
        });
    }

    let count = elevations.len();
    if count < 2 {
        return Err(SpatialError::DegenerateTrend {
            station_count: count,
        });
    }

    let n = count as f64;
    let mean_elevation = elevations.iter().sum::<f64>() / n;
    let mean_value = values.iter().sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (&elevation, &value) in elevations.iter().zip(values) {
        let dz = elevation - mean_elevation;
        sxx += dz * dz;
        sxy += dz * (value - mean_value);
    }
    if sxx == 0.0 {
        return Err(SpatialError::DegenerateTrend {
            station_count: count,
        });
    }

    let slope = sxy / sxx;
    let trend = ElevationTrend {
        slope,
        intercept: mean_value - slope * mean_elevation,
    };

    Ok(match constraint {
        TrendConstraint::Positive if slope < 0.0 => ElevationTrend::NULL,
        TrendConstraint::Negative if slope > 0.0 => ElevationTrend::NULL,
        _ => trend,
    })
}

#[cfg(test)]
mod tests {
    use super::{ElevationTrend, TrendConstraint, fit_elevation_trend};
    use crate::spatial::SpatialError;

    #[test]
    fn fit_recovers_exact_lapse_rate() {
        let elevations = [1000.0, 1500.0, 2000.0, 2600.0];
        let values: Vec<f64> = elevations.iter().map(|z| 15.0 - 0.0065 * z).collect();

        let trend = fit_elevation_trend(&elevations, &values, TrendConstraint::Unconstrained)
            .expect("trend");

        assert!((trend.slope + 0.0065).abs() < 1.0e-12);
        assert!((trend.intercept - 15.0).abs() < 1.0e-9);
        assert!(trend.detrend(1800.0, 15.0 - 0.0065 * 1800.0).abs() < 1.0e-9);
    }

    #[test]
    fn constraint_nulls_slope_of_wrong_sign() {
        let elevations = [1000.0, 2000.0, 3000.0];
        let values = [5.0, 3.0, 1.0];

        let positive = fit_elevation_trend(&elevations, &values, TrendConstraint::Positive)
            .expect("positive");
        assert_eq!(positive, ElevationTrend::NULL);

        let negative = fit_elevation_trend(&elevations, &values, TrendConstraint::Negative)
            .expect("negative");
        assert!((negative.slope + 0.002).abs() < 1.0e-15);
        assert!((negative.intercept - 7.0).abs() < 1.0e-12);
    }

    #[test]
    fn retrend_inverts_detrend() {
        let trend = ElevationTrend {
            slope: 0.002,
            intercept: -1.5,
        };
        let residual = trend.detrend(2400.0, 4.25);
        assert!((trend.retrend(2400.0, residual) - 4.25).abs() < 1.0e-12);
    }

    #[test]
    fn flat_or_single_station_sets_are_degenerate() {
        assert_eq!(
            fit_elevation_trend(&[1200.0], &[3.0], TrendConstraint::Unconstrained)
                .expect_err("single station"),
            SpatialError::DegenerateTrend { station_count: 1 }
        );
        assert_eq!(
            fit_elevation_trend(&[1200.0, 1200.0], &[3.0, 4.0], TrendConstraint::Unconstrained)
                .expect_err("flat elevations"),
            SpatialError::DegenerateTrend { station_count: 2 }
        );
    }
}
