//! A bounded, ordered set of equations plotted together.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::intersection::intersect_all;
use super::sampler::plot_equation;
use super::types::{Curve, CurveId, Domain, IntersectionPoint};
use crate::config::PlotSettings;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("At most {max} equations can be plotted together")]
    TooManyEquations { max: usize },
    #[error("Equation {0} not found")]
    UnknownSlot(CurveId),
}

/// One equation input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquationSlot {
    pub id: CurveId,
    pub equation: String,
}

/// Curves of every slot plus the intersections between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plot {
    pub domain: Domain,
    pub curves: Vec<Curve>,
    pub intersections: Vec<IntersectionPoint>,
}

/// Container for the equations on screen. Owns no derived state: every
/// `plot` call resamples from the text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquationSet {
    slots: Vec<EquationSlot>,
    #[serde(skip)]
    settings: PlotSettings,
}

impl EquationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: PlotSettings) -> Self {
        Self {
            slots: Vec::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &PlotSettings {
        &self.settings
    }

    /// Replace the settings, e.g. after deserialization
    pub fn set_settings(&mut self, settings: PlotSettings) {
        self.settings = settings;
    }

    pub fn slots(&self) -> &[EquationSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.settings.max_equations
    }

    pub fn get(&self, id: CurveId) -> Option<&EquationSlot> {
        self.slots.iter().find(|s| s.id == id)
    }

    /// Append an equation, returning its new slot id
    pub fn add(&mut self, equation: &str) -> Result<CurveId, SceneError> {
        if self.is_full() {
            return Err(SceneError::TooManyEquations {
                max: self.settings.max_equations,
            });
        }
        let id = CurveId::new();
        self.slots.push(EquationSlot {
            id,
            equation: equation.to_string(),
        });
        Ok(id)
    }

    /// Replace the text of an existing slot. The id is kept.
    pub fn update(&mut self, id: CurveId, equation: &str) -> Result<(), SceneError> {
        let slot = self
            .slots
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(SceneError::UnknownSlot(id))?;
        slot.equation = equation.to_string();
        Ok(())
    }

    pub fn remove(&mut self, id: CurveId) -> Option<EquationSlot> {
        let index = self.slots.iter().position(|s| s.id == id)?;
        Some(self.slots.remove(index))
    }

    /// Move a slot to a new position (clamped to the end)
    pub fn reorder(&mut self, id: CurveId, new_index: usize) -> Result<(), SceneError> {
        let slot = self.remove(id).ok_or(SceneError::UnknownSlot(id))?;
        let insert_at = new_index.min(self.slots.len());
        self.slots.insert(insert_at, slot);
        Ok(())
    }

    /// Replace all slots at once, e.g. when loading a saved set
    pub fn replace_all<S: AsRef<str>>(&mut self, equations: &[S]) -> Result<Vec<CurveId>, SceneError> {
        if equations.len() > self.settings.max_equations {
            return Err(SceneError::TooManyEquations {
                max: self.settings.max_equations,
            });
        }
        self.slots.clear();
        equations.iter().map(|e| self.add(e.as_ref())).collect()
    }

    /// Sample every slot over `domain` and intersect every valid pair.
    pub fn plot(&self, domain: &Domain) -> Plot {
        let curves: Vec<Curve> = self
            .slots
            .iter()
            .map(|slot| plot_equation(slot.id, &slot.equation, domain, &self.settings))
            .collect();
        let intersections = intersect_all(&curves, self.settings.dedup_tolerance);
        debug!(
            "Plotted {} curves with {} intersections",
            curves.len(),
            intersections.len()
        );
        Plot {
            domain: *domain,
            curves,
            intersections,
        }
    }
}

/// Plot a list of equations in one call.
pub fn plot_equations<S: AsRef<str>>(
    equations: &[S],
    domain: &Domain,
    settings: &PlotSettings,
) -> Result<Plot, SceneError> {
    let mut set = EquationSet::with_settings(settings.clone());
    set.replace_all(equations)?;
    Ok(set.plot(domain))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equation::INVALID_SYNTAX;

    #[test]
    fn test_add_is_capped() {
        let mut set = EquationSet::new();
        set.add("x").unwrap();
        set.add("2x").unwrap();
        set.add("3x").unwrap();
        assert!(set.is_full());
        assert_eq!(set.add("4x"), Err(SceneError::TooManyEquations { max: 3 }));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_update_keeps_id() {
        let mut set = EquationSet::new();
        let id = set.add("x").unwrap();
        set.update(id, "x^2").unwrap();
        assert_eq!(set.get(id).unwrap().equation, "x^2");
        assert_eq!(set.slots()[0].id, id);
    }

    #[test]
    fn test_update_unknown_slot() {
        let mut set = EquationSet::new();
        let id = CurveId::new();
        assert_eq!(set.update(id, "x"), Err(SceneError::UnknownSlot(id)));
    }

    #[test]
    fn test_remove_and_reorder() {
        let mut set = EquationSet::new();
        let a = set.add("a").unwrap();
        let b = set.add("b").unwrap();
        let c = set.add("c").unwrap();

        set.reorder(a, 10).unwrap();
        let order: Vec<_> = set.slots().iter().map(|s| s.id).collect();
        assert_eq!(order, vec![b, c, a]);

        assert!(set.remove(c).is_some());
        assert!(set.remove(c).is_none());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_plot_skips_failed_curves_in_intersections() {
        let mut set = EquationSet::new();
        set.add("y = 2x + 3").unwrap();
        set.add("???").unwrap();
        set.add("y = -x + 6").unwrap();

        let plot = set.plot(&Domain::default());
        assert_eq!(plot.curves.len(), 3);
        assert!(plot.curves[1].failed);
        assert_eq!(plot.curves[1].failure_reason.as_deref(), Some(INVALID_SYNTAX));
        assert!(!plot.intersections.is_empty());
        let failed_id = plot.curves[1].id;
        assert!(plot
            .intersections
            .iter()
            .all(|ip| ip.curves.0 != failed_id && ip.curves.1 != failed_id));
    }

    #[test]
    fn test_plot_equations_rejects_too_many() {
        let result = plot_equations(&["x", "x", "x", "x"], &Domain::default(), &PlotSettings::default());
        assert!(matches!(result, Err(SceneError::TooManyEquations { .. })));
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut set = EquationSet::new();
        set.add("x^2").unwrap();
        set.add("x + y = 4").unwrap();

        let json = serde_json::to_string(&set).unwrap();
        let restored: EquationSet = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.slots(), set.slots());
    }
}
