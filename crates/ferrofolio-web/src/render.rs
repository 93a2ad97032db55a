//! Server-side HTML for the dashboard page.
//!
//! Charts are inline SVG so the page has no script or asset dependencies.

use ferrofolio_core::Category;

use crate::dashboard::{Dashboard, RecordView};

const PROFIT_COLOR: &str = "#00CC96";
const LOSS_COLOR: &str = "#EF553B";
const PALETTE: [&str; 3] = ["#66C5CC", "#F6CF71", "#DCB0F2"];

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 2rem; background: #121212; color: #eee; }
h1 { margin-bottom: 0; }
.caption { color: #999; margin-top: .25rem; }
.cards { display: grid; grid-template-columns: repeat(4, 1fr); gap: 1rem; margin: 1.5rem 0; }
.card { background: #1e1e1e; border: 1px solid #333; border-radius: 10px; padding: 1rem; }
.card .label { color: #aaa; font-size: .85rem; }
.card .value { font-size: 1.5rem; color: #4CAF50; }
.card .delta.loss { color: #EF553B; }
.charts { display: grid; grid-template-columns: 1fr 1fr; gap: 1rem; }
.warnings { background: #3a2f00; border: 1px solid #806600; padding: .75rem; border-radius: 8px; }
table { border-collapse: collapse; width: 100%; margin-top: 1rem; }
th, td { padding: .4rem .6rem; border-bottom: 1px solid #333; text-align: right; }
th:first-child, td:first-child { text-align: left; }
.progress { background: #333; border-radius: 4px; height: .6rem; width: 8rem; display: inline-block; }
.progress > div { background: #66C5CC; height: 100%; border-radius: 4px; }
.suggestion { background: #10263a; border-left: 4px solid #66C5CC; padding: .5rem .75rem; margin: .5rem 0; }
.balanced { background: #10301f; border-left: 4px solid #00CC96; padding: .5rem .75rem; }
"#;

/// Escape text for HTML element and attribute content.
pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Two decimals with thousands separators, e.g. `-1,234.50`.
pub fn amount(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (integer, fraction) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}

fn money(currency: &str, value: f64) -> String {
    format!("{} {}", escape(currency), amount(value))
}

pub fn dashboard_page(dashboard: &Dashboard) -> String {
    let mut page = String::with_capacity(16 * 1024);
    page.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    page.push_str("<title>Ferrofolio</title>\n");
    page.push_str(&format!("<style>{STYLE}</style>\n</head>\n<body>\n"));
    page.push_str("<h1>Portfolio Dashboard</h1>\n");
    page.push_str(&format!(
        "<p class=\"caption\">Prices as of {}{}</p>\n",
        escape(&dashboard.as_of.format_rfc3339()),
        if dashboard.cache_hit { " (cached)" } else { "" }
    ));

    page.push_str(&warnings_banner(&dashboard.warnings));
    page.push_str(&kpi_cards(dashboard));

    page.push_str("<section class=\"charts\">\n");
    page.push_str(&format!(
        "<div><h2>Current Allocation</h2>{}</div>\n",
        allocation_donut(dashboard)
    ));
    page.push_str(&format!(
        "<div><h2>Return by Asset</h2>{}</div>\n",
        return_bars(dashboard)
    ));
    page.push_str("</section>\n");

    page.push_str(&detail_table(dashboard));
    page.push_str(&contribution_panel(dashboard));
    page.push_str("</body>\n</html>\n");
    page
}

fn warnings_banner(warnings: &[String]) -> String {
    if warnings.is_empty() {
        return String::new();
    }
    let items: String = warnings
        .iter()
        .map(|warning| format!("<li>{}</li>", escape(warning)))
        .collect();
    format!("<div class=\"warnings\"><strong>Market data incomplete</strong><ul>{items}</ul></div>\n")
}

fn kpi_cards(dashboard: &Dashboard) -> String {
    let currency = &dashboard.reporting_currency;
    let totals = &dashboard.totals;
    let delta_class = if totals.total_profit >= 0.0 {
        "delta"
    } else {
        "delta loss"
    };

    let mut cards = String::from("<section class=\"cards\">\n");
    cards.push_str(&card(
        "Total Value",
        &money(currency, totals.total_value),
        None,
    ));
    cards.push_str(&card(
        "Portfolio Return",
        &format!("{:.2}%", totals.total_return_pct),
        Some((delta_class, money(currency, totals.total_profit))),
    ));
    cards.push_str(&card(
        "Exchange Rate",
        &format!("{} {:.2}", escape(currency), dashboard.exchange_rate),
        dashboard
            .exchange_rate_is_fallback
            .then(|| ("delta loss", String::from("fallback"))),
    ));
    cards.push_str(&card(
        &dashboard.fixed_income_label,
        &money(currency, dashboard.fixed_income_amount),
        None,
    ));
    cards.push_str("</section>\n");
    cards
}

fn card(label: &str, value: &str, delta: Option<(&str, String)>) -> String {
    let delta = delta
        .map(|(class, text)| format!("<div class=\"{class}\">{text}</div>"))
        .unwrap_or_default();
    format!(
        "<div class=\"card\"><div class=\"label\">{}</div><div class=\"value\">{value}</div>{delta}</div>\n",
        escape(label)
    )
}

fn category_color(category: Category) -> &'static str {
    match category {
        Category::Domestic => PALETTE[0],
        Category::Foreign => PALETTE[1],
        Category::Cash => PALETTE[2],
    }
}

/// Donut of value per category, drawn as dashed circle strokes on a
/// circumference of 100 so dash lengths are percentages.
pub fn allocation_donut(dashboard: &Dashboard) -> String {
    if dashboard.totals.total_value <= 0.0 {
        return String::from("<p>No valued positions.</p>");
    }

    let mut svg = String::from(
        "<svg viewBox=\"0 0 42 42\" width=\"280\" height=\"280\" role=\"img\" aria-label=\"allocation by category\">",
    );
    let mut legend = String::from("<ul>");
    let mut offset = 0.0;
    for slice in &dashboard.allocation {
        let pct = slice.weight * 100.0;
        let color = category_color(slice.category);
        svg.push_str(&format!(
            "<circle cx=\"21\" cy=\"21\" r=\"15.91549\" fill=\"none\" stroke=\"{color}\" stroke-width=\"6\" stroke-dasharray=\"{pct:.3} {:.3}\" stroke-dashoffset=\"{:.3}\"/>",
            100.0 - pct,
            25.0 - offset
        ));
        legend.push_str(&format!(
            "<li><span style=\"color:{color}\">&#9632;</span> {} {pct:.1}%</li>",
            slice.category.label()
        ));
        offset += pct;
    }
    svg.push_str("</svg>");
    legend.push_str("</ul>");
    svg + &legend
}

/// Vertical bars of return % per market asset; cash is not plotted.
pub fn return_bars(dashboard: &Dashboard) -> String {
    let views: Vec<&RecordView> = dashboard.market_records().collect();
    if views.is_empty() {
        return String::from("<p>No priced assets.</p>");
    }

    const WIDTH: f64 = 480.0;
    const HEIGHT: f64 = 260.0;
    const PLOT: f64 = 200.0;
    let max_abs = views
        .iter()
        .map(|view| view.record.return_pct.abs())
        .fold(1.0_f64, f64::max);
    let zero_y = 20.0 + PLOT / 2.0;
    let slot = WIDTH / views.len() as f64;
    let bar_width = slot * 0.6;

    let mut svg = format!(
        "<svg viewBox=\"0 0 {WIDTH} {HEIGHT}\" width=\"100%\" role=\"img\" aria-label=\"return by asset\">"
    );
    svg.push_str(&format!(
        "<line x1=\"0\" y1=\"{zero_y}\" x2=\"{WIDTH}\" y2=\"{zero_y}\" stroke=\"#666\"/>"
    ));
    for (index, view) in views.iter().enumerate() {
        let record = &view.record;
        let height = record.return_pct.abs() / max_abs * (PLOT / 2.0);
        let x = index as f64 * slot + (slot - bar_width) / 2.0;
        let y = if record.return_pct >= 0.0 {
            zero_y - height
        } else {
            zero_y
        };
        let color = if record.is_profitable() {
            PROFIT_COLOR
        } else {
            LOSS_COLOR
        };
        let label_y = if record.return_pct >= 0.0 {
            y - 4.0
        } else {
            y + height + 12.0
        };
        let center = x + bar_width / 2.0;
        svg.push_str(&format!(
            "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{bar_width:.2}\" height=\"{height:.2}\" fill=\"{color}\"/>"
        ));
        svg.push_str(&format!(
            "<text x=\"{center:.2}\" y=\"{label_y:.2}\" font-size=\"10\" fill=\"#eee\" text-anchor=\"middle\">{:.1}</text>",
            record.return_pct
        ));
        svg.push_str(&format!(
            "<text x=\"{center:.2}\" y=\"{:.2}\" font-size=\"9\" fill=\"#aaa\" text-anchor=\"middle\">{}</text>",
            HEIGHT - 8.0,
            escape(&record.symbol)
        ));
    }
    svg.push_str("</svg>");
    svg
}

fn detail_table(dashboard: &Dashboard) -> String {
    let currency = &dashboard.reporting_currency;
    let mut table = String::from(
        "<section><h2>Assets</h2><table><thead><tr><th>Asset</th><th>Category</th><th>Value</th><th>Profit</th><th>Return</th><th>Weight</th><th>Target</th></tr></thead><tbody>\n",
    );
    for view in &dashboard.records {
        let record = &view.record;
        table.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.2}%</td><td>{:.1}%</td><td><div class=\"progress\"><div style=\"width:{:.1}%\"></div></div> {:.1}%</td></tr>\n",
            escape(&record.symbol),
            record.category.label(),
            money(currency, record.total_value),
            money(currency, record.profit),
            record.return_pct,
            view.current_weight * 100.0,
            view.target_progress() * 100.0,
            record.target_allocation * 100.0,
        ));
    }
    table.push_str("</tbody></table></section>\n");
    table
}

fn contribution_panel(dashboard: &Dashboard) -> String {
    let currency = &dashboard.reporting_currency;
    let mut panel = String::from("<section><h2>Contribution Assistant</h2>\n");
    panel.push_str(&format!(
        "<form method=\"get\" action=\"/\"><label>Amount available ({}) <input type=\"number\" name=\"contribution\" min=\"0\" step=\"100\" value=\"{:.2}\"></label> <button type=\"submit\">Suggest</button> <a href=\"/?refresh=true&amp;contribution={:.2}\">Refresh prices</a></form>\n",
        escape(currency),
        dashboard.contribution,
        dashboard.contribution
    ));

    if dashboard.is_balanced() {
        panel.push_str("<p class=\"balanced\">Portfolio balanced: no position is below its target.</p>\n");
    } else {
        for suggestion in &dashboard.suggestions {
            panel.push_str(&format!(
                "<p class=\"suggestion\">Priority {}: buy <strong>{}</strong> (allocate {})</p>\n",
                suggestion.priority,
                escape(&suggestion.symbol),
                money(currency, suggestion.shortfall)
            ));
        }
    }
    panel.push_str("</section>\n");
    panel
}
