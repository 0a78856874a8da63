//! JSON report output

use crate::report::{NamedMatrix, NamedSeries, Report, Summary, Window};
use crate::selection::SelectionState;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct Document<'a> {
    generated: &'a DateTime<Local>,
    window: &'a Window,
    summary: Summary,
    selection: &'a SelectionState,
    series: &'a [NamedSeries],
    matrices: &'a [NamedMatrix],
}

pub fn write<W: Write>(writer: &mut W, report: &Report) -> serde_json::Result<()> {
    let document = Document {
        generated: &report.generated,
        window: &report.window,
        summary: report.summary(),
        selection: report.selection.state(),
        series: &report.series,
        matrices: &report.matrices,
    };
    serde_json::to_writer_pretty(writer, &document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_report;
    use crate::selection::ViewType;

    fn render(report: &Report) -> serde_json::Value {
        let mut out = Vec::new();
        write(&mut out, report).unwrap();
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn test_series_arrays_are_parallel() {
        let value = render(&sample_report());
        let series = &value["series"][0];

        assert_eq!(series["name"], "feedback");
        assert_eq!(series["view"], "peerFeedback");
        assert_eq!(series["scale"], "sentiment");
        for field in ["labels", "values", "keys", "colors", "categories"] {
            assert_eq!(series[field].as_array().unwrap().len(), 4, "{}", field);
        }
        assert_eq!(series["values"][0], serde_json::Value::Null);
        assert_eq!(series["keys"][1], "fb-1");
        assert_eq!(series["categories"][2], "Negative");
    }

    #[test]
    fn test_selection_state_included() {
        let mut report = sample_report();
        report.selection.report_click(Some("fb-2"), ViewType::PeerFeedback);

        let value = render(&report);
        assert_eq!(value["selection"]["highlighted"]["key"], "fb-2");
        assert_eq!(value["selection"]["hovered"], serde_json::Value::Null);
        assert_eq!(value["summary"]["populated"], 2);
    }
}
