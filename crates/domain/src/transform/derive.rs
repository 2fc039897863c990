//! Derived quantities: frozen precipitation, snow depth, precipitation type
//! and running totals
//!
//! All rules work on unrounded, truncated tables. Inputs that must line up
//! (same axis, same model columns) are checked first and an `Alignment`
//! error is returned when they do not.

use crate::DomainError;
use crate::entities::{Column, ForecastTable, Variable};

use super::snow_ratio::SnowRatioStrategy;

/// Highest temperature (°F) counted as freezing
pub const FREEZING_F: f64 = 32.0;

/// Precipitation values above this are treated as a reporting model
const VALID_PRECIP_FLOOR: f64 = -10.0;

/// Column labels of the precipitation-type table, in order
pub const PRECIP_TYPE_COLUMNS: [&str; 3] = ["Snow", "Rain", "Ice"];

/// Apply `rule` row by row to the matching columns of two aligned tables
fn zip_columns<F>(
    variable: Variable,
    left: &ForecastTable,
    right: &ForecastTable,
    mut rule: F,
) -> Result<ForecastTable, DomainError>
where
    F: FnMut(f64, f64) -> f64,
{
    left.ensure_aligned_with(right)?;
    let columns = left
        .columns()
        .iter()
        .zip(right.columns())
        .map(|(l, r)| {
            let values = l
                .values()
                .iter()
                .zip(r.values())
                .map(|(a, b)| rule(*a, *b))
                .collect();
            Column::new(l.name(), values)
        })
        .collect();
    ForecastTable::new(variable, *left.axis(), columns)
}

/// Precipitation falling at or below freezing
///
/// Missing precipitation stays missing. A missing temperature with valid
/// precipitation counts as not freezing.
///
/// # Errors
///
/// Returns `Alignment` if the two tables do not share axis and columns.
pub fn frozen_precipitation(
    temperature: &ForecastTable,
    precipitation: &ForecastTable,
) -> Result<ForecastTable, DomainError> {
    zip_columns(
        Variable::FrozenPrecipitation,
        temperature,
        precipitation,
        |t, p| if t <= FREEZING_F { p } else { p * 0.0 },
    )
}

/// Snow depth from liquid-equivalent precipitation
///
/// A model contributes snow only where its own snowfall is positive and it
/// precipitates. Missing temperature or precipitation yields missing. The
/// result replaces the raw `snowfall` table.
///
/// # Errors
///
/// Returns `Alignment` if the three tables do not share axis and columns.
pub fn snow_depth(
    temperature: &ForecastTable,
    precipitation: &ForecastTable,
    snowfall: &ForecastTable,
    ratio: &dyn SnowRatioStrategy,
) -> Result<ForecastTable, DomainError> {
    temperature.ensure_aligned_with(snowfall)?;
    let liquid_snow = zip_columns(Variable::Snowfall, precipitation, snowfall, |p, s| {
        if p.is_nan() {
            f64::NAN
        } else if s > 0.0 && p > 0.0 {
            p
        } else {
            0.0
        }
    })?;
    zip_columns(Variable::Snowfall, temperature, &liquid_snow, |t, liquid| {
        if t.is_nan() || liquid.is_nan() {
            f64::NAN
        } else if liquid > 0.0 {
            liquid * ratio.ratio(t)
        } else {
            0.0
        }
    })
}

/// Per-timestep share of models producing snow, rain or ice
///
/// Every model in the tables is counted, the bias-corrected blend included.
/// A model reports when its precipitation is valid. Snow is decided by the
/// model's own snowfall; otherwise precipitating models count as ice below
/// freezing and rain otherwise, so a missing temperature classifies as rain.
/// With no reporting model the shares are `NaN`.
///
/// # Errors
///
/// Returns `Alignment` if the three tables do not share axis and columns.
pub fn precip_type(
    temperature: &ForecastTable,
    precipitation: &ForecastTable,
    snowfall: &ForecastTable,
) -> Result<ForecastTable, DomainError> {
    temperature.ensure_aligned_with(precipitation)?;
    temperature.ensure_aligned_with(snowfall)?;

    let rows = temperature.row_count();
    let mut snow = vec![0u32; rows];
    let mut rain = vec![0u32; rows];
    let mut ice = vec![0u32; rows];
    let mut reporting = vec![0u32; rows];

    for ((t_col, p_col), s_col) in temperature
        .columns()
        .iter()
        .zip(precipitation.columns())
        .zip(snowfall.columns())
    {
        for row in 0..rows {
            let (t, p, s) = (t_col.values()[row], p_col.values()[row], s_col.values()[row]);
            if p > VALID_PRECIP_FLOOR {
                reporting[row] += 1;
            }
            if s > 0.0 {
                snow[row] += 1;
            } else if p > 0.0 && t < FREEZING_F {
                ice[row] += 1;
            } else if p > 0.0 {
                // Anything not below freezing, a missing temperature included
                rain[row] += 1;
            }
        }
    }

    let share = |counts: &[u32]| -> Vec<f64> {
        counts
            .iter()
            .zip(&reporting)
            .map(|(&count, &total)| {
                if total == 0 {
                    f64::NAN
                } else {
                    f64::from(count) / f64::from(total) * 100.0
                }
            })
            .collect()
    };

    let [snow_name, rain_name, ice_name] = PRECIP_TYPE_COLUMNS;
    ForecastTable::new(
        Variable::PrecipType,
        *temperature.axis(),
        vec![
            Column::new(snow_name, share(&snow)),
            Column::new(rain_name, share(&rain)),
            Column::new(ice_name, share(&ice)),
        ],
    )
}

/// Running sum that leaves missing steps missing without resetting
#[must_use]
pub fn running_sum(values: &[f64]) -> Vec<f64> {
    let mut total = 0.0;
    values
        .iter()
        .map(|&v| {
            if v.is_nan() {
                f64::NAN
            } else {
                total += v;
                total
            }
        })
        .collect()
}

/// Running totals of an hourly table, including its mean column
///
/// The sum restarts at the first row of the (truncated) table.
#[must_use]
pub fn running_total(hourly: &ForecastTable, total: Variable) -> ForecastTable {
    hourly.clone().relabel(total).map_series(running_sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::TimeAxis;
    use crate::transform::SnowRatio;
    use chrono::{TimeDelta, TimeZone, Utc};

    fn table(variable: Variable, columns: &[(&str, &[f64])]) -> ForecastTable {
        let len = columns.first().map_or(0, |(_, v)| v.len());
        let start = Utc.with_ymd_and_hms(2026, 1, 15, 2, 0, 0).unwrap();
        let axis = TimeAxis::new(start, TimeDelta::hours(1), len).unwrap();
        ForecastTable::new(
            variable,
            axis,
            columns
                .iter()
                .map(|(name, values)| Column::new(*name, values.to_vec()))
                .collect(),
        )
        .unwrap()
    }

    fn temp(values: &[f64]) -> ForecastTable {
        table(Variable::Temperature2m, &[("GFS", values)])
    }

    fn precip(values: &[f64]) -> ForecastTable {
        table(Variable::Precipitation, &[("GFS", values)])
    }

    fn snowfall(values: &[f64]) -> ForecastTable {
        table(Variable::Snowfall, &[("GFS", values)])
    }

    fn gfs(t: &ForecastTable) -> &[f64] {
        t.column("GFS").unwrap().values()
    }

    #[test]
    fn frozen_is_zero_above_freezing() {
        let frozen = frozen_precipitation(&temp(&[40.0]), &precip(&[0.5])).unwrap();
        assert!(gfs(&frozen)[0].abs() < f64::EPSILON);
    }

    #[test]
    fn frozen_keeps_precip_at_freezing() {
        let frozen = frozen_precipitation(&temp(&[32.0, 20.0]), &precip(&[0.5, 0.1])).unwrap();
        assert_eq!(gfs(&frozen), &[0.5, 0.1]);
        assert_eq!(frozen.variable(), Variable::FrozenPrecipitation);
    }

    #[test]
    fn frozen_missing_handling() {
        let frozen = frozen_precipitation(&temp(&[f64::NAN, 30.0]), &precip(&[0.2, f64::NAN]))
            .unwrap();
        assert!(gfs(&frozen)[0].abs() < f64::EPSILON);
        assert!(gfs(&frozen)[1].is_nan());
    }

    #[test]
    fn frozen_requires_alignment() {
        let other = table(Variable::Precipitation, &[("ECMWF", &[0.5][..])]);
        let err = frozen_precipitation(&temp(&[30.0]), &other).unwrap_err();
        assert!(matches!(err, DomainError::Alignment(_)));
    }

    #[test]
    fn snow_golden_values() {
        let ratio = SnowRatio::default();
        let snow = snow_depth(
            &temp(&[32.0, 20.0]),
            &precip(&[1.0, 1.0]),
            &snowfall(&[0.7, 0.9]),
            &ratio,
        )
        .unwrap();
        assert!((gfs(&snow)[0] - 9.0).abs() < 1e-12);
        assert!((gfs(&snow)[1] - 15.0).abs() < 1e-12);
        assert_eq!(snow.variable(), Variable::Snowfall);
    }

    #[test]
    fn snow_needs_model_snowfall() {
        let snow = snow_depth(
            &temp(&[30.0]),
            &precip(&[0.4]),
            &snowfall(&[0.0]),
            &SnowRatio::default(),
        )
        .unwrap();
        assert!(gfs(&snow)[0].abs() < f64::EPSILON);
    }

    #[test]
    fn snow_is_zero_not_negative_when_warm() {
        // 25 - 0.5 * 60 would be a negative ratio
        let snow = snow_depth(
            &temp(&[60.0]),
            &precip(&[0.5]),
            &snowfall(&[0.1]),
            &SnowRatio::default(),
        )
        .unwrap();
        assert!(gfs(&snow)[0].abs() < f64::EPSILON);
        assert!(!gfs(&snow)[0].is_sign_negative());
    }

    #[test]
    fn snow_missing_inputs_stay_missing() {
        let snow = snow_depth(
            &temp(&[f64::NAN, 30.0]),
            &precip(&[0.4, f64::NAN]),
            &snowfall(&[0.0, 1.0]),
            &SnowRatio::default(),
        )
        .unwrap();
        assert!(gfs(&snow)[0].is_nan());
        assert!(gfs(&snow)[1].is_nan());
    }

    #[test]
    fn snow_with_fixed_ratio() {
        let snow = snow_depth(
            &temp(&[30.0]),
            &precip(&[0.25]),
            &snowfall(&[0.1]),
            &SnowRatio::TEN_TO_ONE,
        )
        .unwrap();
        assert!((gfs(&snow)[0] - 2.5).abs() < 1e-12);
    }

    fn three_models(variable: Variable, a: f64, b: f64, c: f64) -> ForecastTable {
        table(
            variable,
            &[("GFS", &[a][..]), ("ECMWF", &[b][..]), ("NBM", &[c][..])],
        )
    }

    #[test]
    fn precip_type_classifies_each_model() {
        let t = three_models(Variable::Temperature2m, 28.0, 28.0, 36.0);
        let p = three_models(Variable::Precipitation, 0.1, 0.1, 0.1);
        let s = three_models(Variable::Snowfall, 0.5, 0.0, 0.0);
        let pt = precip_type(&t, &p, &s).unwrap();

        let cols: Vec<_> = pt.column_names().collect();
        assert_eq!(cols, PRECIP_TYPE_COLUMNS);
        assert!(pt.mean().is_none());
        for name in PRECIP_TYPE_COLUMNS {
            let v = pt.column(name).unwrap().values()[0];
            assert!((v - 100.0 / 3.0).abs() < 1e-9, "{name}: {v}");
        }
    }

    #[test]
    fn precip_type_shares_sum_to_hundred_when_all_precipitate() {
        let t = three_models(Variable::Temperature2m, 20.0, 31.0, 40.0);
        let p = three_models(Variable::Precipitation, 0.2, 0.3, 0.1);
        let s = three_models(Variable::Snowfall, 1.0, 0.0, 0.0);
        let pt = precip_type(&t, &p, &s).unwrap();
        let sum: f64 = PRECIP_TYPE_COLUMNS
            .iter()
            .map(|n| pt.column(n).unwrap().values()[0])
            .sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn precip_type_missing_temperature_counts_as_rain() {
        let t = table(
            Variable::Temperature2m,
            &[("GFS", &[f64::NAN]), ("ECMWF", &[40.0])],
        );
        let p = table(Variable::Precipitation, &[("GFS", &[0.2]), ("ECMWF", &[0.2])]);
        let s = table(Variable::Snowfall, &[("GFS", &[0.0]), ("ECMWF", &[0.0])]);
        let pt = precip_type(&t, &p, &s).unwrap();

        assert!((pt.column("Rain").unwrap().values()[0] - 100.0).abs() < 1e-9);
        assert!(pt.column("Snow").unwrap().values()[0].abs() < f64::EPSILON);
        assert!(pt.column("Ice").unwrap().values()[0].abs() < f64::EPSILON);
    }

    #[test]
    fn precip_type_dry_models_count_toward_total() {
        let t = three_models(Variable::Temperature2m, 40.0, 40.0, 40.0);
        let p = three_models(Variable::Precipitation, 0.1, 0.0, 0.0);
        let s = three_models(Variable::Snowfall, 0.0, 0.0, 0.0);
        let pt = precip_type(&t, &p, &s).unwrap();
        let rain = pt.column("Rain").unwrap().values()[0];
        assert!((rain - 100.0 / 3.0).abs() < 1e-9);
        assert!(pt.column("Snow").unwrap().values()[0].abs() < f64::EPSILON);
    }

    #[test]
    fn precip_type_without_reporting_models_is_nan() {
        let t = three_models(Variable::Temperature2m, 30.0, 30.0, 30.0);
        let p = three_models(Variable::Precipitation, f64::NAN, f64::NAN, f64::NAN);
        let s = three_models(Variable::Snowfall, 0.0, 0.0, 0.0);
        let pt = precip_type(&t, &p, &s).unwrap();
        for name in PRECIP_TYPE_COLUMNS {
            assert!(pt.column(name).unwrap().values()[0].is_nan());
        }
    }

    #[test]
    fn running_sum_skips_missing_steps() {
        let sums = running_sum(&[0.1, f64::NAN, 0.2, 0.3]);
        assert!((sums[0] - 0.1).abs() < 1e-12);
        assert!(sums[1].is_nan());
        assert!((sums[2] - 0.3).abs() < 1e-12);
        assert!((sums[3] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn running_total_sums_mean_too() {
        let hourly = precip(&[0.1, 0.2, 0.3]).with_mean(vec![0.2, 0.2, 0.2]).unwrap();
        let total = running_total(&hourly, Variable::TotalPrecipitation);
        assert_eq!(total.variable(), Variable::TotalPrecipitation);
        let mean = total.mean().unwrap();
        assert!((mean[2] - 0.6).abs() < 1e-12);
        assert!((gfs(&total)[2] - 0.6).abs() < 1e-12);
    }
}
