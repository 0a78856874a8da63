//! HTML report generation
//!
//! One self-contained page: summary stats, then a card per series (one row
//! per calendar day) and a card per category matrix. Every series row is
//! styled through the [`SelectionCoordinator`](crate::selection::SelectionCoordinator)
//! so the page shows the highlight and hover the report was built with.

use crate::classify::{classify_to_color, Category};
use crate::report::{NamedMatrix, NamedSeries, Report, Summary};
use crate::selection::SelectionCoordinator;
use std::io::{self, Write};

pub fn write<W: Write>(writer: &mut W, report: &Report) -> io::Result<()> {
    let summary = report.summary();

    let series_cards: String = report
        .series
        .iter()
        .map(|s| series_card(s, &report.selection))
        .collect();
    let matrix_cards: String = report.matrices.iter().map(matrix_card).collect();

    write!(writer, r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Pulsegrid Report</title>
    <style>
        :root {{
            --bg: #0d1117;
            --card: #161b22;
            --border: #30363d;
            --text: #e6edf3;
            --dim: #7d8590;
            --accent: #58a6ff;
        }}
        * {{ box-sizing: border-box; margin: 0; padding: 0; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif;
            background: var(--bg);
            color: var(--text);
            line-height: 1.5;
        }}
        .container {{ max-width: 1200px; margin: 0 auto; padding: 2rem; }}

        /* Header */
        .header {{
            display: flex;
            align-items: baseline;
            gap: 1rem;
            margin-bottom: 2rem;
            padding-bottom: 1rem;
            border-bottom: 1px solid var(--border);
        }}
        .logo {{ font-size: 2.25rem; font-weight: 800; color: var(--accent); }}
        .subtitle {{ color: var(--dim); font-size: 1rem; }}

        /* Stats Row */
        .stats {{
            display: grid;
            grid-template-columns: repeat(4, 1fr);
            gap: 1rem;
            margin-bottom: 2rem;
        }}
        .stat {{
            background: var(--card);
            border: 1px solid var(--border);
            border-radius: 12px;
            padding: 1.5rem;
            text-align: center;
        }}
        .stat-value {{ font-size: 2.5rem; font-weight: 700; line-height: 1; }}
        .stat-label {{ color: var(--dim); font-size: 0.875rem; text-transform: uppercase; letter-spacing: 0.05em; margin-top: 0.5rem; }}

        /* Cards */
        .card {{
            background: var(--card);
            border: 1px solid var(--border);
            border-radius: 12px;
            padding: 1.5rem;
            margin-bottom: 1.5rem;
        }}
        .card-title {{ font-size: 1rem; font-weight: 600; margin-bottom: 1rem; color: var(--dim); }}
        .tiers {{ display: flex; flex-wrap: wrap; gap: 1rem; margin-bottom: 2rem; }}
        .tier {{ font-size: 0.875rem; color: var(--dim); }}

        /* Table */
        table {{ width: 100%; border-collapse: collapse; }}
        th, td {{ padding: 0.5rem 0.75rem; text-align: left; }}
        th {{
            background: rgba(255,255,255,0.03);
            font-weight: 600;
            font-size: 0.75rem;
            text-transform: uppercase;
            letter-spacing: 0.05em;
            color: var(--dim);
            border-bottom: 1px solid var(--border);
        }}
        td {{ border-bottom: 1px solid var(--border); }}
        tr:last-child td {{ border-bottom: none; }}
        tr.gap td {{ color: var(--dim); }}
        .mono {{ font-family: 'SF Mono', 'Fira Code', monospace; font-size: 0.875rem; }}
        .dot {{ display: inline-block; border-radius: 50%; border-style: solid; vertical-align: middle; }}
        .num {{ text-align: right; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <div class="logo">Pulsegrid</div>
            <div class="subtitle">{start} to {end} &middot; generated {generated}</div>
        </div>

        <div class="stats">
            <div class="stat"><div class="stat-value">{series}</div><div class="stat-label">Series</div></div>
            <div class="stat"><div class="stat-value">{days}</div><div class="stat-label">Days</div></div>
            <div class="stat"><div class="stat-value">{populated}</div><div class="stat-label">With Data</div></div>
            <div class="stat"><div class="stat-value">{gaps}</div><div class="stat-label">Gaps</div></div>
        </div>

        <div class="tiers">{tiers}</div>

        {series_cards}
        {matrix_cards}
    </div>
</body>
</html>
"#,
        start = report.window.start,
        end = report.window.end,
        generated = report.generated.format("%Y-%m-%d %H:%M"),
        series = summary.series,
        days = summary.days,
        populated = summary.populated,
        gaps = summary.gaps,
        tiers = tier_list(&summary),
        series_cards = series_cards,
        matrix_cards = matrix_cards,
    )?;

    Ok(())
}

fn tier_list(summary: &Summary) -> String {
    summary
        .tiers
        .iter()
        .map(|(label, n)| format!(r#"<span class="tier">{}: {}</span>"#, html_escape(label), n))
        .collect()
}

fn series_card(named: &NamedSeries, selection: &SelectionCoordinator) -> String {
    let series = &named.series;
    let rows: String = (0..series.len())
        .map(|i| {
            let key = series.key_at(i);
            let style = selection.style_for(i, key, named.view, &series.colors[i]);
            let value = series.values[i]
                .map(|v| format!("{:.2}", v))
                .unwrap_or_else(|| "&ndash;".to_string());
            let category = named.categories[i].map(|c| c.label()).unwrap_or("");
            format!(
                r#"<tr class="{class}" data-index="{i}"><td class="mono">{date}</td><td><span class="dot" style="width:{d}px;height:{d}px;background:{fill};border-width:{bw}px;border-color:{border}"></span></td><td class="num mono">{value}</td><td>{category}</td><td class="mono">{key}</td></tr>"#,
                class = if key.is_some() { "day" } else { "day gap" },
                i = i,
                date = series.labels[i],
                d = style.radius * 2.0,
                fill = html_escape(style.fill_color.as_str()),
                bw = html_escape(&style.border_width.to_string()),
                border = html_escape(style.border_color.as_str()),
                value = value,
                category = html_escape(category),
                key = html_escape(key.unwrap_or("")),
            )
        })
        .collect();

    format!(
        r#"<div class="card"><div class="card-title">{name} &middot; {view}{scale}</div><table><thead><tr><th>Date</th><th></th><th class="num">Value</th><th>Category</th><th>Key</th></tr></thead><tbody>{rows}</tbody></table></div>"#,
        name = html_escape(&named.name),
        view = named.view,
        scale = named.scale.map(|s| format!(" &middot; {}", s)).unwrap_or_default(),
        rows = rows,
    )
}

fn matrix_card(named: &NamedMatrix) -> String {
    let matrix = &named.matrix;
    let header: String = matrix
        .categories
        .iter()
        .map(|&c| category_header(c))
        .collect();

    let rows: String = matrix
        .row_labels
        .iter()
        .enumerate()
        .map(|(r, label)| {
            let cells: String = matrix.counts[r]
                .iter()
                .map(|n| format!(r#"<td class="num mono">{}</td>"#, n))
                .collect();
            let weighted = matrix
                .weighted_grade_score(r)
                .map(|s| format!("{:.1}", s))
                .unwrap_or_default();
            format!(
                r#"<tr><td>{}</td>{}<td class="num mono">{}</td><td class="num mono">{}</td></tr>"#,
                html_escape(label),
                cells,
                matrix.row_total(r),
                weighted
            )
        })
        .collect();

    format!(
        r#"<div class="card"><div class="card-title">{name}</div><table><thead><tr><th></th>{header}<th class="num">Total</th><th class="num">Avg</th></tr></thead><tbody>{rows}</tbody></table></div>"#,
        name = html_escape(&named.name),
        header = header,
        rows = rows,
    )
}

fn category_header(category: Category) -> String {
    format!(
        r#"<th class="num"><span class="dot" style="width:10px;height:10px;border-width:0;background:{}"></span> {}</th>"#,
        classify_to_color(category),
        html_escape(category.label())
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_by_dimension;
    use crate::classify::{palette, Classifier, Scale};
    use crate::record::MetricRecord;
    use crate::report::tests::sample_report;
    use crate::classify::Color;
    use crate::selection::{StyleConfig, ViewType};
    use chrono::NaiveDate;

    fn render(report: &Report) -> String {
        let mut out = Vec::new();
        write(&mut out, report).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_one_row_per_day() {
        let html = render(&sample_report());
        assert_eq!(html.matches(r#"<tr class="day"#).count(), 4);
        assert_eq!(html.matches(r#"<tr class="day gap""#).count(), 2);
    }

    #[test]
    fn test_gap_rows_use_no_data_color() {
        let html = render(&sample_report());
        let first_row = html.split(r#"data-index="0""#).nth(1).unwrap();
        let first_row = &first_row[..first_row.find("</tr>").unwrap()];
        assert!(first_row.contains(&format!("background:{}", palette::NO_DATA)));
    }

    #[test]
    fn test_highlighted_row_uses_highlight_style() {
        let mut report = sample_report();
        report.selection.report_click(Some("fb-1"), ViewType::PeerFeedback);
        let html = render(&report);

        let row = html.split(r#"data-index="1""#).nth(1).unwrap();
        let row = &row[..row.find("</tr>").unwrap()];
        assert!(row.contains("width:20px"));
        assert!(row.contains(&format!("border-color:{}", palette::BORDER_HIGHLIGHTED)));
    }

    #[test]
    fn test_style_colors_are_escaped() {
        let style = StyleConfig {
            highlight_fill: Some(Color::from("red\" onmouseover=\"x")),
            highlight_border_color: Color::from("#000\"><script>"),
            ..StyleConfig::default()
        };
        let mut selection = SelectionCoordinator::new(style);
        selection.report_click(Some("fb-1"), ViewType::PeerFeedback);
        let html = render(&sample_report().with_selection(selection));

        assert!(html.contains("background:red&quot; onmouseover=&quot;x"));
        assert!(html.contains("border-color:#000&quot;&gt;&lt;script&gt;"));
        assert!(!html.contains(r#"onmouseover="x""#));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_matrix_rendered_and_escaped() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let records = vec![
            MetricRecord::new(day, "a", Some(0.95)).with_dimension("Parse <json>"),
            MetricRecord::new(day, "b", Some(0.72)).with_dimension("Parse <json>"),
        ];
        let matrix = aggregate_by_dimension(&records, Scale::LetterGrade, &Classifier::default());
        let report = sample_report().with_matrix("Grades by task", matrix);
        let html = render(&report);

        assert!(html.contains("Grades by task"));
        assert!(html.contains("Parse &lt;json&gt;"));
        assert!(!html.contains("Parse <json>"));
        assert!(html.contains("Document Access Error"));
    }
}
