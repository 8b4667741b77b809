use crate::catalog::Catalog;
use crate::domain::marker::{MarkerId, MarkerModifiers, MarkerRange};
use crate::error::PipelineError;

pub const UNKNOWN_STATUS: &str = "Desconocido";

/// A valid value that no range covers is a catalog bug, reported as [`PipelineError::CatalogGap`].
pub fn classify<'c>(
    catalog: &'c Catalog,
    marker: MarkerId,
    value: f64,
    modifiers: &MarkerModifiers,
) -> Result<&'c MarkerRange, PipelineError> {
    let def = catalog
        .marker(marker)
        .ok_or(PipelineError::UnknownMarker(marker))?;

    if !value.is_finite() {
        return Err(PipelineError::invalid_value(
            marker,
            format!("{value} is not a finite number"),
        ));
    }
    if !def.domain.contains(value) {
        return Err(PipelineError::invalid_value(
            marker,
            format!(
                "{value} {} is outside the plausible range [{}, {})",
                def.unit, def.domain.min, def.domain.max
            ),
        ));
    }

    def.ranges_for(modifiers)
        .iter()
        .find(|r| r.contains(value))
        .ok_or(PipelineError::CatalogGap { marker, value })
}
