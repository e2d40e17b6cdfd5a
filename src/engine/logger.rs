use std::collections::HashMap;
use std::io::Write;

/// Records time series and mode-trace log entries (`spec.md` §4.5):
/// non-lossy — every step's outputs for every declared output are kept.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    series: HashMap<String, Vec<(f64, f64)>>,
    series_order: Vec<String>,
    mode_trace: Vec<(f64, String)>,
}

impl Logger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_value(&mut self, t: f64, name: &str, value: f64) {
        if !self.series.contains_key(name) {
            self.series_order.push(name.to_string());
            self.series.insert(name.to_string(), Vec::new());
        }
        self.series.get_mut(name).unwrap().push((t, value));
    }

    pub fn log_mode(&mut self, t: f64, mode: &str) {
        self.mode_trace.push((t, mode.to_string()));
    }

    pub fn time_series(&self, name: &str) -> &[(f64, f64)] {
        self.series.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn series_names(&self) -> &[String] {
        &self.series_order
    }

    pub fn mode_trace(&self) -> &[(f64, String)] {
        &self.mode_trace
    }

    /// Write both channels to one CSV stream: the time-series rows first,
    /// then the mode-trace rows, each section introduced by its own
    /// header. Uses only `std::io::Write` — no plotting or CSV crate is
    /// pulled in for this.
    pub fn write_csv<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        writeln!(w, "time,series,value")?;
        for name in &self.series_order {
            for (t, value) in &self.series[name] {
                writeln!(w, "{t},{name},{value}")?;
            }
        }
        writeln!(w, "time,mode")?;
        for (t, mode) in &self.mode_trace {
            writeln!(w, "{t},{mode}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_first_seen_series_order() {
        let mut logger = Logger::new();
        logger.log_value(0.0, "b", 1.0);
        logger.log_value(0.0, "a", 2.0);
        logger.log_value(0.1, "b", 1.5);
        assert_eq!(logger.series_names(), &["b".to_string(), "a".to_string()]);
        assert_eq!(logger.time_series("b"), &[(0.0, 1.0), (0.1, 1.5)]);
    }

    #[test]
    fn write_csv_includes_both_channels() {
        let mut logger = Logger::new();
        logger.log_value(0.0, "h", 10.0);
        logger.log_mode(0.0, "FlyingBall");
        let mut buf = Vec::new();
        logger.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("0,h,10"));
        assert!(text.contains("0,FlyingBall"));
    }
}
