//! Data-to-pixel scales and tick generation.

/// Linear mapping from a data interval onto a pixel interval.
#[derive(Debug, Clone, Copy)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    /// Round-number ticks inside the domain, aiming for about `target` of them.
    pub fn ticks(&self, target: usize) -> Vec<f64> {
        let (lo, hi) = (self.domain.0.min(self.domain.1), self.domain.0.max(self.domain.1));
        let step = nice_step((hi - lo) / target.max(1) as f64);
        if step <= 0.0 || !step.is_finite() {
            return vec![lo];
        }
        let mut ticks = Vec::new();
        let mut tick = (lo / step).ceil() * step;
        while tick <= hi + step * 1e-9 {
            // avoid -0 and accumulated float noise in labels
            ticks.push((tick / step).round() * step + 0.0);
            tick += step;
        }
        ticks
    }
}

/// Base-10 logarithmic mapping. The domain must be strictly positive.
#[derive(Debug, Clone, Copy)]
pub struct LogScale {
    inner: LinearScale,
    domain: (f64, f64),
}

impl LogScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        let lo = domain.0.max(f64::MIN_POSITIVE);
        let hi = domain.1.max(lo);
        Self {
            inner: LinearScale::new((lo.log10(), hi.log10()), range),
            domain: (lo, hi),
        }
    }

    pub fn map(&self, value: f64) -> f64 {
        self.inner.map(value.max(f64::MIN_POSITIVE).log10())
    }

    /// Powers of ten inside the domain.
    pub fn ticks(&self) -> Vec<f64> {
        let first = self.domain.0.log10().ceil() as i32;
        let last = self.domain.1.log10().floor() as i32;
        (first..=last).map(|exp| 10f64.powi(exp)).collect()
    }
}

/// Rounds a raw step up to 1, 2, 5 or 10 times a power of ten.
pub fn nice_step(raw: f64) -> f64 {
    if raw <= 0.0 || !raw.is_finite() {
        return 0.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let residual = raw / magnitude;
    let nice = if residual <= 1.0 {
        1.0
    } else if residual <= 2.0 {
        2.0
    } else if residual <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Plain, non-scientific tick text: integers without a fractional part.
pub fn format_tick(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        let text = format!("{value:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
