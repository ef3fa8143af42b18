//! Scoring-style translation and title-point calculators.

mod calc;

pub use calc::{CalcPoints, CalcPointsNormal, CalcPointsT2B, CalcPointsUki, calculator};

use crate::types::{ScoringStyle, ScoringType};

/// Maps a configured style onto the shape of numbers a run records.
pub fn translate_config_scoring(style: ScoringStyle) -> ScoringType {
    match style {
        ScoringStyle::FaultsThenTime
        | ScoringStyle::Faults100ThenTime
        | ScoringStyle::Faults200ThenTime
        | ScoringStyle::TimePlusFaults => ScoringType::ByTime,
        ScoringStyle::OcScoreThenTime => ScoringType::ByOpenClose,
        ScoringStyle::ScoreThenTime => ScoringType::ByPoints,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_styles_share_one_shape() {
        let by_time: Vec<_> = ScoringStyle::ALL
            .into_iter()
            .filter(|style| translate_config_scoring(*style) == ScoringType::ByTime)
            .collect();
        assert_eq!(by_time.len(), 4);
        assert_eq!(
            translate_config_scoring(ScoringStyle::OcScoreThenTime),
            ScoringType::ByOpenClose
        );
        assert_eq!(translate_config_scoring(ScoringStyle::ScoreThenTime), ScoringType::ByPoints);
    }
}
