use super::{BeatOutput, Formatter};

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, output: &BeatOutput) -> String {
        let rr = output
            .rr_secs
            .map_or("-".to_string(), |rr| format!("{:.3} s", rr));
        if self.verbose {
            let bpm = output
                .heart_rate_bpm()
                .map_or("-".to_string(), |hr| format!("{:.1} bpm", hr));
            format!(
                "Beat at {:>9.3} s (sample {:>8}) RR: {:>8} [{}]",
                output.time_secs, output.index, rr, bpm
            )
        } else {
            format!("Beat at {:>9.3} s  RR: {}", output.time_secs, rr)
        }
    }
}
