//! Small descriptive statistics over monthly samples

/// Arithmetic mean, 0 for an empty slice
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Population standard deviation (divides by N, not N - 1)
pub fn population_std_dev(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let avg = mean(samples);
    let variance =
        samples.iter().map(|s| (s - avg).powi(2)).sum::<f64>() / samples.len() as f64;
    variance.sqrt()
}

/// Coefficient of variation, `None` when the mean is zero
pub fn coefficient_of_variation(samples: &[f64]) -> Option<f64> {
    let avg = mean(samples);
    if avg == 0.0 {
        return None;
    }
    Some(population_std_dev(samples) / avg)
}

pub fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}
