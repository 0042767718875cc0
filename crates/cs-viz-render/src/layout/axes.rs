/// Axis configuration with tick generation and data→pixel mapping.
#[derive(Debug, Clone)]
pub struct Axis {
    pub min: f64,
    pub max: f64,
    pub log: bool,
    pub label: String,
    pub tick_positions: Vec<f64>,
    pub tick_labels: Vec<String>,
    pub minor_ticks: Vec<f64>,
}

impl Axis {
    /// Linear axis over exactly `[min, max]` with "nice number" ticks inside it.
    pub fn linear(min: f64, max: f64, target_ticks: usize) -> Self {
        let (lo, hi) = if max > min { (min, max) } else { (min - 1.0, min + 1.0) };
        let step = nice_step((hi - lo) / (target_ticks.max(2) - 1) as f64);
        let eps = step * 1e-6;

        let first = (lo / step - 1e-9).ceil() as i64;
        let last = (hi / step + 1e-9).floor() as i64;
        let mut ticks = Vec::new();
        let mut labels = Vec::new();
        for k in first..=last {
            let v = k as f64 * step;
            ticks.push(v);
            labels.push(format_tick(v, step));
        }

        // Minor ticks: 5 subdivisions per major
        let minor_step = step / 5.0;
        let minor = ((lo / minor_step - 1e-9).ceil() as i64..=(hi / minor_step + 1e-9).floor() as i64)
            .filter(|k| k % 5 != 0)
            .map(|k| k as f64 * minor_step)
            .filter(|v| *v >= lo - eps && *v <= hi + eps)
            .collect();

        Self {
            min: lo,
            max: hi,
            log: false,
            label: String::new(),
            tick_positions: ticks,
            tick_labels: labels,
            minor_ticks: minor,
        }
    }

    /// Logarithmic axis over exactly `[min, max]`, labelled at each decade.
    pub fn log(min: f64, max: f64) -> Self {
        let min = min.max(1e-20);
        let max = if max > min { max } else { min * 10.0 };
        let lo_exp = min.log10().ceil() as i32;
        let hi_exp = max.log10().floor() as i32;

        let mut ticks = Vec::new();
        let mut labels = Vec::new();
        let mut minor = Vec::new();
        for exp in (lo_exp - 1)..=hi_exp {
            let v = 10.0_f64.powi(exp);
            if exp >= lo_exp {
                ticks.push(v);
                labels.push(format!("10{}", superscript(exp)));
            }
            // Minor ticks at 2..9
            for m in 2..=9 {
                let mv = m as f64 * v;
                if mv > min && mv < max {
                    minor.push(mv);
                }
            }
        }

        Self {
            min,
            max,
            log: true,
            label: String::new(),
            tick_positions: ticks,
            tick_labels: labels,
            minor_ticks: minor,
        }
    }

    /// Logarithmic axis from `floor` up to the decade above `data_max`.
    pub fn auto_log(floor: f64, data_max: f64) -> Self {
        let top_exp = data_max.max(floor).max(1e-20).log10().ceil() as i32;
        let top = 10.0_f64.powi(top_exp);
        Self::log(floor, if top > floor { top } else { floor * 10.0 })
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Map a data value to pixel coordinate.
    pub fn data_to_pixel(&self, value: f64, px_min: f64, px_max: f64) -> f64 {
        let frac = if self.log {
            let log_val = value.max(1e-20).ln();
            let log_min = self.min.max(1e-20).ln();
            let log_max = self.max.max(1e-20).ln();
            (log_val - log_min) / (log_max - log_min)
        } else {
            (value - self.min) / (self.max - self.min)
        };
        px_min + frac * (px_max - px_min)
    }
}

fn nice_step(rough: f64) -> f64 {
    let exp = rough.abs().log10().floor();
    let frac = rough / 10.0_f64.powf(exp);
    let nice_frac = if frac <= 1.5 {
        1.0
    } else if frac <= 3.5 {
        2.0
    } else if frac <= 7.5 {
        5.0
    } else {
        10.0
    };
    nice_frac * 10.0_f64.powf(exp)
}

fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 { 0 } else { (-step.log10().floor()) as usize };
    // Avoid "-0"
    let v = if value.abs() < step * 0.01 { 0.0 } else { value };
    if decimals == 0 { format!("{}", v.round() as i64) } else { format!("{v:.decimals$}") }
}

fn superscript(n: i32) -> String {
    n.to_string()
        .chars()
        .map(|c| match c {
            '-' => '\u{207B}',
            '0' => '\u{2070}',
            '1' => '\u{00B9}',
            '2' => '\u{00B2}',
            '3' => '\u{00B3}',
            '4' => '\u{2074}',
            '5' => '\u{2075}',
            '6' => '\u{2076}',
            '7' => '\u{2077}',
            '8' => '\u{2078}',
            '9' => '\u{2079}',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_keeps_limits() {
        let ax = Axis::linear(-0.1, 0.1, 5);
        assert_eq!((ax.min, ax.max), (-0.1, 0.1));
        assert_eq!(ax.tick_labels, vec!["-0.10", "-0.05", "0.00", "0.05", "0.10"]);
        assert!(ax.minor_ticks.iter().all(|v| *v > -0.1 - 1e-12 && *v < 0.1 + 1e-12));
    }

    #[test]
    fn linear_energy_axis() {
        let ax = Axis::linear(0.0, 110.0, 6);
        assert_eq!(ax.tick_labels.first().map(String::as_str), Some("0"));
        assert_eq!(ax.tick_labels.last().map(String::as_str), Some("100"));
    }

    #[test]
    fn data_to_pixel_linear() {
        let ax = Axis::linear(0.0, 100.0, 5);
        let px = ax.data_to_pixel(50.0, 0.0, 500.0);
        assert!((px - 250.0).abs() < 1e-9);
    }

    #[test]
    fn log_mapping_is_decade_uniform() {
        let ax = Axis::log(1e-4, 1.0);
        assert!(ax.log);
        assert_eq!(ax.tick_positions.len(), 5);
        // Inverted pixel range, as used for y axes.
        let y = |v: f64| ax.data_to_pixel(v, 400.0, 0.0);
        assert!((y(1e-4) - 400.0).abs() < 1e-9);
        assert!((y(1.0) - 0.0).abs() < 1e-9);
        assert!((y(1e-2) - 200.0).abs() < 1e-9);
        assert!((y(1e-3) - y(1e-2) - 100.0).abs() < 1e-9);
        // Zero sits at the floor edge rather than producing NaN.
        assert!(y(0.0).is_finite());
    }

    #[test]
    fn auto_log_rounds_up_to_decade() {
        let ax = Axis::auto_log(1e-4, 0.37);
        assert_eq!(ax.min, 1e-4);
        assert!((ax.max - 1.0).abs() < 1e-12);
        assert_eq!(ax.tick_labels.last().map(String::as_str), Some("10\u{2070}"));
    }

    #[test]
    fn nice_step_values() {
        assert!((nice_step(3.2) - 2.0).abs() < 1e-9);
        assert!((nice_step(0.7) - 0.5).abs() < 1e-9);
        assert!((nice_step(15.0) - 10.0).abs() < 1e-9);
        assert!((nice_step(4.5) - 5.0).abs() < 1e-9);
    }
}
