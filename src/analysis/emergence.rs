//! Causal emergence across scales.
//!
//! An emergence event is a (sweep point, block size) pair where the macro
//! description carries more effective information than the micro one.

use serde::{Deserialize, Serialize};

use super::threshold::check_aligned;
use crate::error::Result;

/// Micro EI at or below this is treated as carrying no information
pub const EI_FLOOR: f64 = 1e-12;

/// EI(macro) / EI(micro), with 0.0 where micro EI is negligible
pub fn ei_ratio(ei_micro: &[f64], ei_macro: &[f64]) -> Result<Vec<f64>> {
    check_aligned(ei_micro, ei_macro)?;
    Ok(ei_micro
        .iter()
        .zip(ei_macro)
        .map(|(&micro, &macro_ei)| if micro > EI_FLOOR { macro_ei / micro } else { 0.0 })
        .collect())
}

/// One sweep point where EI(macro) > EI(micro)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmergenceEvent {
    pub index: usize,
    pub parameter: f64,
    pub block_size: usize,
    pub ei_micro: f64,
    pub ei_macro: f64,
}

/// All causal-emergence events of a sweep
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CausalEmergence {
    /// Number of events
    pub count: usize,
    /// Events ordered by sweep index, then block size
    pub events: Vec<EmergenceEvent>,
}

impl CausalEmergence {
    pub fn detected(&self) -> bool {
        self.count > 0
    }

    /// Distinct sweep indices with at least one event
    pub fn points(&self) -> Vec<usize> {
        let mut points: Vec<usize> = self.events.iter().map(|e| e.index).collect();
        points.dedup();
        points
    }
}

/// Collect every (point, block size) with EI(macro) > EI(micro)
///
/// `scales` yields (block size, EI micro, EI macro), each series aligned
/// with `parameters`.
pub fn causal_emergence_events<'a>(
    parameters: &[f64],
    scales: impl IntoIterator<Item = (usize, &'a [f64], &'a [f64])>,
) -> Result<CausalEmergence> {
    let mut events = Vec::new();

    for (block_size, ei_micro, ei_macro) in scales {
        check_aligned(parameters, ei_micro)?;
        check_aligned(parameters, ei_macro)?;

        for (index, ((&parameter, &micro), &macro_ei)) in
            parameters.iter().zip(ei_micro).zip(ei_macro).enumerate()
        {
            if macro_ei > micro {
                events.push(EmergenceEvent {
                    index,
                    parameter,
                    block_size,
                    ei_micro: micro,
                    ei_macro: macro_ei,
                });
            }
        }
    }

    events.sort_by_key(|e| (e.index, e.block_size));
    Ok(CausalEmergence {
        count: events.len(),
        events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_guards_zero_micro() {
        let ratio = ei_ratio(&[0.5, 0.0, 1.0], &[1.0, 0.3, 0.5]).unwrap();
        assert_eq!(ratio, vec![2.0, 0.0, 0.5]);
        assert!(ei_ratio(&[1.0], &[]).is_err());
    }

    #[test]
    fn test_events_across_scales() {
        let params = [1.0, 2.0, 3.0];
        let micro_2 = [0.5, 0.5, 0.5];
        let macro_2 = [0.4, 0.6, 0.5];
        let micro_4 = [0.5, 0.5, 0.1];
        let macro_4 = [0.7, 0.1, 0.2];

        let ce = causal_emergence_events(
            &params,
            [(2, &micro_2[..], &macro_2[..]), (4, &micro_4[..], &macro_4[..])],
        )
        .unwrap();

        assert!(ce.detected());
        assert_eq!(ce.count, 3);
        let keys: Vec<(usize, usize)> = ce.events.iter().map(|e| (e.index, e.block_size)).collect();
        assert_eq!(keys, vec![(0, 4), (1, 2), (2, 4)]);
        assert_eq!(ce.points(), vec![0, 1, 2]);
    }

    #[test]
    fn test_equal_ei_is_not_emergence() {
        let ce = causal_emergence_events(&[1.0, 2.0], [(2, &[0.0, 0.3][..], &[0.0, 0.3][..])]).unwrap();
        assert_eq!(ce.count, 0);
        assert!(ce.events.is_empty());
    }
}
