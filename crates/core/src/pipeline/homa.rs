use crate::catalog::rules::HomaIrBand;
use crate::domain::marker::MarkerId;
use crate::domain::recommendation::HomaIrAssessment;
use crate::domain::request::BloodTestResult;
use crate::error::PipelineError;

const HOMA_IR_DIVISOR: f64 = 405.0;

pub fn homa_ir(glucose_mg_dl: f64, insulin_uiu_ml: f64) -> Result<f64, PipelineError> {
    for (marker, value) in [(MarkerId::Glucose, glucose_mg_dl), (MarkerId::Insulin, insulin_uiu_ml)] {
        if !value.is_finite() || value < 0.0 {
            return Err(PipelineError::invalid_value(
                marker,
                format!("{value} is not a non-negative finite number"),
            ));
        }
    }
    Ok(glucose_mg_dl * insulin_uiu_ml / HOMA_IR_DIVISOR)
}

pub fn interpret(bands: &[HomaIrBand], value: f64) -> Option<&str> {
    bands
        .iter()
        .find(|b| b.below.map_or(true, |below| value < below))
        .map(|b| b.label.as_str())
}

pub fn assess(bands: &[HomaIrBand], results: &[BloodTestResult]) -> Option<HomaIrAssessment> {
    let first = |marker: MarkerId| results.iter().find(|r| r.marker_id == marker).map(|r| r.value);
    let (glucose, insulin) = (first(MarkerId::Glucose)?, first(MarkerId::Insulin)?);

    let value = match homa_ir(glucose, insulin) {
        Ok(v) => v,
        Err(err) => {
            tracing::warn!(error = %err, "skipping HOMA-IR");
            return None;
        }
    };
    let band = interpret(bands, value)?.to_string();
    tracing::debug!(value, %band, "HOMA-IR");
    Some(HomaIrAssessment { value, band })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn glucose_95_insulin_10_is_mild_resistance() {
        let catalog = Catalog::embedded().unwrap();
        let value = homa_ir(95.0, 10.0).unwrap();
        assert!((value - 2.3457).abs() < 1e-3);
        assert_eq!(
            interpret(&catalog.rules().homa_ir_bands, value),
            Some("resistencia a la insulina leve a moderada")
        );
    }

    #[test]
    fn bands_are_half_open_and_last_is_unbounded() {
        let catalog = Catalog::embedded().unwrap();
        let bands = &catalog.rules().homa_ir_bands;
        assert_eq!(interpret(bands, 0.5), Some("sensibilidad óptima a la insulina"));
        assert_eq!(interpret(bands, 1.0), Some("sensibilidad normal a la insulina"));
        assert_eq!(interpret(bands, 4.0), Some("resistencia a la insulina significativa"));
        assert_eq!(interpret(bands, 40.0), Some("resistencia a la insulina significativa"));
    }

    #[test]
    fn rejects_negative_inputs() {
        assert!(matches!(
            homa_ir(-1.0, 10.0),
            Err(PipelineError::InvalidMarkerValue { marker: MarkerId::Glucose, .. })
        ));
        assert!(homa_ir(90.0, f64::NAN).is_err());
    }

    #[test]
    fn assessment_needs_both_markers() {
        let catalog = Catalog::embedded().unwrap();
        let result = |marker_id, value| BloodTestResult {
            marker_id,
            value,
            unit: String::new(),
            date: chrono::NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            time_of_day: None,
        };
        let bands = &catalog.rules().homa_ir_bands;

        assert!(assess(bands, &[result(MarkerId::Glucose, 95.0)]).is_none());
        let both = assess(
            bands,
            &[result(MarkerId::Insulin, 10.0), result(MarkerId::Glucose, 95.0)],
        )
        .unwrap();
        assert_eq!(both.band, "resistencia a la insulina leve a moderada");
    }
}
