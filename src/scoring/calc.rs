use crate::{
    localization::{Localization, Message},
    types::CalcPointsType,
};

/// Title-point policy applied to a qualifying run.
pub trait CalcPoints: Send + Sync {
    /// Policy selector.
    fn kind(&self) -> CalcPointsType;

    /// Points earned. `points` is the configured value for the run's fault band.
    fn points(&self, points: f64, time: f64, sct: f64, place: i16, class_size: i16) -> f64;

    /// Display name of a configured row.
    fn generic_name(&self, loc: &dyn Localization, points: f64, faults: f64) -> String;

    /// Whether rows carry user-configured point values.
    fn allows_configuration(&self) -> bool {
        true
    }
}

/// Configured points pass through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalcPointsNormal;

impl CalcPoints for CalcPointsNormal {
    fn kind(&self) -> CalcPointsType {
        CalcPointsType::Normal
    }

    fn points(&self, points: f64, _time: f64, _sct: f64, _place: i16, _class_size: i16) -> f64 {
        points
    }

    fn generic_name(&self, loc: &dyn Localization, points: f64, faults: f64) -> String {
        loc.message(&Message::TitlePointsName { points, faults })
    }
}

/// Time-to-beat: ten points for the winning time, then one less per
/// ten-percent band over SCT.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalcPointsT2B;

impl CalcPoints for CalcPointsT2B {
    fn kind(&self) -> CalcPointsType {
        CalcPointsType::T2B
    }

    fn points(&self, _points: f64, time: f64, sct: f64, place: i16, _class_size: i16) -> f64 {
        if time == sct && place == 1 {
            return 10.0;
        }
        // Thresholds truncate before the run time is compared, and the run
        // time is truncated too.
        let run = time.trunc();
        for band in 1..=9 {
            let threshold = (0.1 * f64::from(band) * sct + sct).floor();
            if run <= threshold {
                return f64::from(10 - band);
            }
        }
        0.0
    }

    fn generic_name(&self, _loc: &dyn Localization, _points: f64, _faults: f64) -> String {
        "T2B".into()
    }

    fn allows_configuration(&self) -> bool {
        false
    }
}

/// UKI placement table.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalcPointsUki;

impl CalcPoints for CalcPointsUki {
    fn kind(&self) -> CalcPointsType {
        CalcPointsType::Uki
    }

    fn points(&self, _points: f64, _time: f64, _sct: f64, place: i16, class_size: i16) -> f64 {
        let table: &[f64] = if class_size <= 10 {
            &[6.0, 5.0]
        } else if class_size <= 30 {
            &[9.0, 8.0, 7.0, 6.0]
        } else {
            &[12.0, 11.0, 10.0, 9.0, 8.0, 7.0, 6.0, 5.0]
        };
        usize::try_from(place)
            .ok()
            .and_then(|place| place.checked_sub(1))
            .and_then(|idx| table.get(idx).copied())
            .unwrap_or(4.0)
    }

    fn generic_name(&self, _loc: &dyn Localization, _points: f64, _faults: f64) -> String {
        "UKI".into()
    }

    fn allows_configuration(&self) -> bool {
        false
    }
}

/// Shared calculator for a policy.
pub fn calculator(kind: CalcPointsType) -> &'static dyn CalcPoints {
    match kind {
        CalcPointsType::Normal => &CalcPointsNormal,
        CalcPointsType::T2B => &CalcPointsT2B,
        CalcPointsType::Uki => &CalcPointsUki,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t2b_winning_time_scores_ten() {
        assert_eq!(CalcPointsT2B.points(0.0, 40.0, 40.0, 1, 12), 10.0);
        // Matching SCT without the win falls into the first band.
        assert_eq!(CalcPointsT2B.points(0.0, 40.0, 40.0, 2, 12), 9.0);
    }

    #[test]
    fn t2b_band_boundaries_take_the_lower_value() {
        for sct in [30.0_f64, 37.0, 45.5, 52.7] {
            for band in 1..=9 {
                let boundary = sct.trunc() + (0.1 * f64::from(band) * sct).trunc();
                assert_eq!(
                    CalcPointsT2B.points(0.0, boundary, sct, 2, 12),
                    f64::from(10 - band),
                    "sct {sct} band {band}"
                );
            }
            let past = (0.1 * 9.0 * sct + sct).floor() + 1.0;
            assert_eq!(CalcPointsT2B.points(0.0, past, sct, 2, 12), 0.0, "sct {sct}");
        }
    }

    #[test]
    fn t2b_ignores_fractions_of_the_run_time() {
        // 33.9 truncates to 33, which is inside the 33-second first band.
        assert_eq!(CalcPointsT2B.points(0.0, 33.9, 30.0, 2, 12), 9.0);
        assert_eq!(CalcPointsT2B.points(0.0, 34.0, 30.0, 2, 12), 8.0);
    }

    #[test]
    fn uki_table_cells() {
        let uki = CalcPointsUki;
        assert_eq!(uki.points(0.0, 0.0, 0.0, 1, 10), 6.0);
        assert_eq!(uki.points(0.0, 0.0, 0.0, 3, 10), 4.0);
        assert_eq!(uki.points(0.0, 0.0, 0.0, 3, 30), 7.0);
        assert_eq!(uki.points(0.0, 0.0, 0.0, 5, 50), 8.0);
        assert_eq!(uki.points(0.0, 0.0, 0.0, 9, 50), 4.0);
        assert_eq!(uki.points(0.0, 0.0, 0.0, 0, 50), 4.0);
        assert_eq!(uki.points(0.0, 0.0, 0.0, -1, 5), 4.0);
    }

    #[test]
    fn normal_passes_points_through() {
        assert_eq!(CalcPointsNormal.points(7.5, 99.0, 40.0, 9, 3), 7.5);
        assert_eq!(calculator(CalcPointsType::T2B).kind(), CalcPointsType::T2B);
        assert!(!calculator(CalcPointsType::Uki).allows_configuration());
    }
}
