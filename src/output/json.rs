use super::{BeatOutput, Formatter};

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, output: &BeatOutput) -> String {
        // Plain numbers and options always serialise
        serde_json::to_string(output).unwrap_or_default()
    }
}
