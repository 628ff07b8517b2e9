use super::{BeatOutput, Formatter};

pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format(&self, output: &BeatOutput) -> String {
        let rr = output
            .rr_secs
            .map_or(String::new(), |rr| format!("{:.3}", rr));
        format!("{},{:.3},{}", output.index, output.time_secs, rr)
    }

    fn header(&self) -> Option<&'static str> {
        Some("index,time_secs,rr_secs")
    }
}
