use crate::config::seconds_to_samples;
use crate::error::{QrsError, Result};

/// Half-width of the default search window
pub const DEFAULT_SEARCH_RADIUS_SECONDS: f64 = 0.075;

/// Refine candidates with the default ±75 ms search window
pub fn refine(signal: &[f64], sample_rate: f64, candidates: &[usize]) -> Result<Vec<usize>> {
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(QrsError::InvalidParameter(format!(
            "sampling rate must be positive, got {}",
            sample_rate
        )));
    }
    localize(
        signal,
        candidates,
        seconds_to_samples(DEFAULT_SEARCH_RADIUS_SECONDS, sample_rate),
    )
}

/// Snap approximate beat positions to the R-peak in the original signal
///
/// Each candidate is searched within `radius` samples on either side,
/// clipped to the signal. Inside the window the baseline is the mean of
/// the two endpoint samples and the chosen index is the one deviating most
/// from it, so inverted complexes are found as well as upright ones. Ties
/// go to the earliest index. The result has one entry per candidate, in
/// candidate order.
///
/// # Errors
/// Returns `QrsError::InvalidParameter` if `signal` is empty or a
/// candidate lies outside it.
pub fn localize(signal: &[f64], candidates: &[usize], radius: usize) -> Result<Vec<usize>> {
    Ok(localize_with_deviation(signal, candidates, radius)?
        .into_iter()
        .map(|(index, _)| index)
        .collect())
}

/// Like [`localize`], also returning how far each pick deviates from its
/// window baseline
pub fn localize_with_deviation(
    signal: &[f64],
    candidates: &[usize],
    radius: usize,
) -> Result<Vec<(usize, f64)>> {
    if signal.is_empty() {
        return Err(QrsError::InvalidParameter(
            "cannot localise peaks in an empty signal".to_string(),
        ));
    }

    candidates
        .iter()
        .map(|&candidate| {
            if candidate >= signal.len() {
                return Err(QrsError::InvalidParameter(format!(
                    "candidate index {} outside signal of {} samples",
                    candidate,
                    signal.len()
                )));
            }
            Ok(extremum_near(signal, candidate, radius))
        })
        .collect()
}

/// Keep picks whose deviation exceeds `ratio` times the strongest one
///
/// A candidate whose window lies on flat baseline deviates by zero and
/// snaps to an arbitrary sample. Zero-phase filtering leaks a little slope
/// energy ahead of the first complex, and with zero-initialised estimates
/// that energy is accepted as a beat.
pub fn drop_negligible(picks: &[(usize, f64)], ratio: f64) -> Vec<usize> {
    let strongest = picks.iter().fold(0.0_f64, |acc, &(_, d)| acc.max(d));
    let floor = ratio * strongest;

    picks
        .iter()
        .filter_map(|&(index, deviation)| {
            if deviation > floor {
                Some(index)
            } else {
                log::trace!(
                    "Dropping refined peak {} (deviation {:.3e}, floor {:.3e})",
                    index,
                    deviation,
                    floor
                );
                None
            }
        })
        .collect()
}

/// Drop entries that repeat or fall behind their predecessor
///
/// Two candidates can snap to the same extremum when their search windows
/// overlap.
pub fn strictly_increasing(indices: &[usize]) -> Vec<usize> {
    let mut kept: Vec<usize> = Vec::with_capacity(indices.len());
    for &index in indices {
        match kept.last() {
            Some(&last) if index <= last => {
                log::trace!("Dropping refined peak {} (previous {})", index, last);
            }
            _ => kept.push(index),
        }
    }
    kept
}

fn extremum_near(signal: &[f64], candidate: usize, radius: usize) -> (usize, f64) {
    let start = candidate.saturating_sub(radius);
    let end = candidate.saturating_add(radius).min(signal.len() - 1);
    let baseline = 0.5 * (signal[start] + signal[end]);

    let mut best = start;
    let mut best_deviation = f64::NEG_INFINITY;
    for (i, &value) in signal.iter().enumerate().take(end + 1).skip(start) {
        let deviation = (value - baseline).abs();
        if deviation > best_deviation {
            best = i;
            best_deviation = deviation;
        }
    }
    (best, best_deviation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulse(len: usize, centre: usize, height: f64) -> Vec<f64> {
        (0..len)
            .map(|i| {
                let d = i as f64 - centre as f64;
                height * (-d * d / 8.0).exp()
            })
            .collect()
    }

    #[test]
    fn test_snaps_to_peak() {
        let signal = pulse(200, 100, 1.0);
        assert_eq!(localize(&signal, &[93], 15).unwrap(), vec![100]);
        assert_eq!(localize(&signal, &[108], 15).unwrap(), vec![100]);
    }

    #[test]
    fn test_finds_inverted_peak() {
        let signal = pulse(200, 60, -2.0);
        assert_eq!(localize(&signal, &[55], 10).unwrap(), vec![60]);
    }

    #[test]
    fn test_baseline_offset_ignored() {
        let signal: Vec<f64> = pulse(200, 120, 1.0).iter().map(|v| v + 50.0).collect();
        assert_eq!(localize(&signal, &[125], 10).unwrap(), vec![120]);
    }

    #[test]
    fn test_window_clipped_at_edges() {
        let signal = pulse(50, 2, 1.0);
        assert_eq!(localize(&signal, &[0], 10).unwrap(), vec![2]);

        let signal = pulse(50, 48, 1.0);
        assert_eq!(localize(&signal, &[49], 10).unwrap(), vec![48]);
    }

    #[test]
    fn test_overlapping_windows_snap_to_same_peak() {
        let signal = pulse(200, 100, 1.0);
        let refined = localize(&signal, &[95, 104], 15).unwrap();
        assert_eq!(refined, vec![100, 100]);
        assert_eq!(strictly_increasing(&refined), vec![100]);
    }

    #[test]
    fn test_strictly_increasing_drops_regressions() {
        assert_eq!(strictly_increasing(&[3, 7, 7, 5, 9]), vec![3, 7, 9]);
        assert!(strictly_increasing(&[]).is_empty());
    }

    #[test]
    fn test_refine_uses_default_radius() {
        // 15 samples at 200 Hz
        let signal = pulse(400, 200, 1.0);
        assert_eq!(refine(&signal, 200.0, &[186]).unwrap(), vec![200]);
        assert_eq!(refine(&signal, 200.0, &[214]).unwrap(), vec![200]);
        assert!(refine(&signal, 0.0, &[10]).is_err());
    }

    #[test]
    fn test_zero_radius_keeps_candidate() {
        let signal = pulse(200, 100, 1.0);
        assert_eq!(localize(&signal, &[40, 90], 0).unwrap(), vec![40, 90]);
    }

    #[test]
    fn test_huge_radius_spans_whole_signal() {
        let signal = pulse(200, 70, 1.0);
        assert_eq!(localize(&signal, &[5, 190], usize::MAX).unwrap(), vec![70, 70]);
    }

    #[test]
    fn test_deviation_reported_per_pick() {
        let signal = pulse(400, 300, 2.0);
        let picks = localize_with_deviation(&signal, &[40, 295], 20).unwrap();

        assert_eq!(picks[0].1, 0.0);
        assert_eq!(picks[1].0, 300);
        assert!(picks[1].1 > 1.9);
    }

    #[test]
    fn test_drop_negligible_removes_flat_picks() {
        let picks = [(40, 0.0), (300, 2.0), (520, 0.3), (700, 1e-4)];
        assert_eq!(drop_negligible(&picks, 0.05), vec![300, 520]);
        assert_eq!(drop_negligible(&picks, 0.0), vec![300, 520, 700]);
        assert!(drop_negligible(&[(3, 0.0)], 0.05).is_empty());
        assert!(drop_negligible(&[], 0.05).is_empty());
    }

    #[test]
    fn test_empty_candidates() {
        assert!(localize(&[1.0, 2.0], &[], 5).unwrap().is_empty());
    }

    #[test]
    fn test_out_of_range_candidate_rejected() {
        assert!(matches!(
            localize(&[0.0; 10], &[10], 3),
            Err(QrsError::InvalidParameter(_))
        ));
    }
}
