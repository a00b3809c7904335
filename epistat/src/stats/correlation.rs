//! Pearson correlation over pairwise-complete observations.

use serde::{Deserialize, Serialize};

/// A single correlation estimate and the number of complete pairs behind it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub r: f64,
    pub n: usize,
}

/// Pearson correlation coefficient between two optional-valued series.
///
/// Rows missing either value are excluded from this correlation only
/// (pairwise-complete observations). Returns `None` when fewer than two
/// complete pairs remain or either series has zero variance.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<Correlation> {
    debug_assert_eq!(xs.len(), ys.len());
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys.iter())
        .filter_map(|(x, y)| x.zip(*y))
        .collect();
    let n = pairs.len();
    if n < 2 {
        return None;
    }

    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n as f64;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n as f64;

    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some(Correlation {
        r: sxy / (sxx * syy).sqrt(),
        n,
    })
}
