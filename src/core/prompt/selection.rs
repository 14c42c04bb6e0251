use rand::Rng;

/// One vocabulary entry with its relative selection weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedOption {
    pub value: &'static str,
    pub weight: f64,
}

impl WeightedOption {
    pub const fn new(value: &'static str, weight: f64) -> Self {
        Self { value, weight }
    }

    /// Entry with the default weight of 1.0.
    pub const fn unit(value: &'static str) -> Self {
        Self::new(value, 1.0)
    }

    /// Negative and NaN weights count as zero.
    fn effective_weight(&self) -> f64 {
        if self.weight.is_finite() && self.weight > 0.0 {
            self.weight
        } else {
            0.0
        }
    }
}

/// Pick one value with probability proportional to its weight.
///
/// A pool whose effective weights sum to zero is sampled uniformly. Returns
/// `None` only for an empty pool.
pub fn weighted_choice<R: Rng + ?Sized>(
    rng: &mut R,
    options: &[WeightedOption],
) -> Option<&'static str> {
    weighted_index(rng, options).map(|idx| options[idx].value)
}

fn weighted_index<R: Rng + ?Sized>(rng: &mut R, options: &[WeightedOption]) -> Option<usize> {
    if options.is_empty() {
        return None;
    }

    let total: f64 = options.iter().map(WeightedOption::effective_weight).sum();
    if total <= 0.0 {
        return Some(rng.random_range(0..options.len()));
    }

    let mut remaining = rng.random::<f64>() * total;
    for (idx, option) in options.iter().enumerate() {
        let weight = option.effective_weight();
        if weight <= 0.0 {
            continue;
        }
        if remaining < weight {
            return Some(idx);
        }
        remaining -= weight;
    }

    // Floating point drift can leave a sliver past the last bucket.
    options.iter().rposition(|option| option.effective_weight() > 0.0)
}

/// Draw up to `k` distinct values without replacement.
///
/// `k` is clipped to the pool size; each draw is a weighted choice over what
/// is left, so earlier picks never repeat.
pub fn weighted_sample<R: Rng + ?Sized>(
    rng: &mut R,
    options: &[WeightedOption],
    k: usize,
) -> Vec<&'static str> {
    let mut pool = options.to_vec();
    let k = k.min(pool.len());
    let mut picked = Vec::with_capacity(k);

    for _ in 0..k {
        let Some(idx) = weighted_index(rng, &pool) else {
            break;
        };
        let chosen = pool[idx].value;
        picked.push(chosen);
        pool.retain(|option| option.value != chosen);
    }

    picked
}
