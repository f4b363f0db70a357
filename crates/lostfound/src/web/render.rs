//! Server-side HTML for the public page, the login form and the dashboard.

use std::fmt::Write as _;

use crate::report::{Metrics, Report, WorkflowStage};
use crate::session::Flash;
use crate::workflow::{Dashboard, PublicPage};

use super::{ADMIN_PATH, LOGIN_PATH, LOGOUT_PATH, SCRIPT_PATH};

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:0;background:#f4f6f9;color:#1d2733}\
header{background:#0b3d91;color:#fff;padding:1rem 2rem;display:flex;justify-content:space-between;align-items:center}\
header a{color:#fff}\
main{max-width:960px;margin:0 auto;padding:1.5rem}\
section{background:#fff;border-radius:8px;padding:1rem 1.5rem;margin-bottom:1.5rem}\
.flash{padding:.75rem 1rem;border-radius:6px;margin-bottom:1rem}\
.flash.success{background:#e3f6e8;color:#17602d}\
.flash.error{background:#fde8e8;color:#8a1c1c}\
.metrics{display:grid;grid-template-columns:repeat(4,1fr);gap:1rem}\
.metric{text-align:center}.metric strong{display:block;font-size:1.8rem}\
.pipeline{display:flex;gap:.5rem;list-style:none;padding:0}\
.pipeline li{flex:1;padding:.5rem;border-radius:6px;background:#e5e9f0;text-align:center}\
.pipeline li.done{background:#0b3d91;color:#fff}\
table{width:100%;border-collapse:collapse}th,td{text-align:left;padding:.4rem;border-bottom:1px solid #e5e9f0}\
.modal{display:none;position:fixed;inset:0;background:rgba(0,0,0,.45)}\
.modal.open{display:flex;align-items:center;justify-content:center}\
.modal-body{background:#fff;border-radius:8px;padding:1.5rem;min-width:320px}\
label{display:block;margin:.5rem 0}input,textarea{width:100%}";

/// Escape text for use in HTML element content and quoted attributes.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, nav: &str, body: &str) -> String {
    format!(
        "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\">\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
<title>{title}</title><style>{STYLE}</style></head><body>\
<header><h1>Airport Lost &amp; Found</h1><nav>{nav}</nav></header>\
<main>{body}</main>\
<script src=\"{SCRIPT_PATH}\"></script></body></html>",
        title = escape_html(title),
    )
}

fn flashes_html(flashes: &[Flash]) -> String {
    flashes.iter().fold(String::new(), |mut out, flash| {
        let _ = write!(
            out,
            "<div class=\"flash {}\" role=\"status\">{}</div>",
            flash.level.as_str(),
            escape_html(&flash.message)
        );
        out
    })
}

fn metrics_html(metrics: &Metrics) -> String {
    format!(
        "<section class=\"metrics\">\
<div class=\"metric\"><strong>{}</strong>Total reports</div>\
<div class=\"metric\"><strong>{}</strong>Found</div>\
<div class=\"metric\"><strong>{}</strong>Open cases</div>\
<div class=\"metric\"><strong>{}</strong>Claimed</div>\
</section>",
        metrics.total, metrics.found, metrics.open_cases, metrics.claimed
    )
}

fn pipeline_html(stage: WorkflowStage) -> String {
    let steps = [
        WorkflowStage::Reported,
        WorkflowStage::Found,
        WorkflowStage::Claimed,
    ];
    let items = steps.iter().fold(String::new(), |mut out, step| {
        let class = if *step <= stage { " class=\"done\"" } else { "" };
        let _ = write!(out, "<li{class}>{}. {}</li>", step.number(), step.label());
        out
    });
    format!(
        "<ol class=\"pipeline\" data-stage=\"{}\">{items}</ol>",
        stage.number()
    )
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn search_result_html(report: &Report) -> String {
    format!(
        "<section id=\"search-result\"><h2>Report {id}</h2>\
<dl><dt>Passenger</dt><dd>{name}</dd><dt>Item</dt><dd>{item}</dd>\
<dt>Description</dt><dd>{description}</dd>\
<dt>Found</dt><dd>{found}</dd><dt>Claimed</dt><dd>{claimed}</dd>\
<dt>Reported at</dt><dd>{created} UTC</dd></dl>{pipeline}</section>",
        id = escape_html(&report.tracking_id),
        name = escape_html(&report.passenger_name),
        item = escape_html(&report.item_name),
        description = escape_html(&report.description),
        found = yes_no(report.found_status),
        claimed = yes_no(report.claim_status),
        created = report.created_at_display(),
        pipeline = pipeline_html(report.stage()),
    )
}

fn recent_html(reports: &[Report]) -> String {
    if reports.is_empty() {
        return "<section><h2>Recent reports</h2><p>No reports yet.</p></section>".to_string();
    }
    let rows = reports.iter().fold(String::new(), |mut out, report| {
        let _ = write!(
            out,
            "<tr><td><code>{}</code></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&report.tracking_id),
            escape_html(&report.passenger_name),
            escape_html(&report.item_name),
            report.stage(),
            report.created_at_display(),
        );
        out
    });
    format!(
        "<section><h2>Recent reports</h2><table><thead><tr><th>Tracking ID</th>\
<th>Passenger</th><th>Item</th><th>Stage</th><th>Reported</th></tr></thead>\
<tbody>{rows}</tbody></table></section>"
    )
}

/// The public home page.
#[must_use]
pub fn home(page: &PublicPage, is_admin: bool) -> String {
    let nav = if is_admin {
        format!("<a href=\"{ADMIN_PATH}\">Dashboard</a> | <a href=\"{LOGOUT_PATH}\">Log out</a>")
    } else {
        format!("<a href=\"{LOGIN_PATH}\">Staff login</a>")
    };

    let mut body = flashes_html(&page.flashes);
    body.push_str(&metrics_html(&page.metrics));

    if let Some(tracking_id) = &page.latest_tracking_id {
        let _ = write!(
            body,
            "<section id=\"latest-tracking-id\"><h2>Your tracking ID</h2>\
<p><code>{}</code></p><p>Keep it to check on your report.</p></section>",
            escape_html(tracking_id)
        );
    }

    body.push_str(
        "<section><h2>Lost something?</h2>\
<button type=\"button\" id=\"openReportModal\">Report a lost item</button>\
<form method=\"post\" action=\"/\"><input type=\"hidden\" name=\"action\" value=\"track\">\
<label>Tracking ID <input name=\"tracking_id\" placeholder=\"LF-YYMMDD-XXXXXX\"></label>\
<button type=\"submit\">Track</button></form></section>",
    );

    if let Some(report) = &page.search_result {
        body.push_str(&search_result_html(report));
    }

    body.push_str(&recent_html(&page.recent));

    body.push_str(
        "<div class=\"modal\" id=\"reportModal\" aria-hidden=\"true\"><div class=\"modal-body\">\
<h2>Report a lost item</h2>\
<form method=\"post\" action=\"/\"><input type=\"hidden\" name=\"action\" value=\"report\">\
<label>Your name <input name=\"passenger_name\" required></label>\
<label>Item <input name=\"item_name\" required></label>\
<label>Description <textarea name=\"description\" rows=\"3\" required></textarea></label>\
<button type=\"submit\">Submit report</button>\
<button type=\"button\" id=\"closeReportModal\">Cancel</button>\
</form></div></div>",
    );

    layout("Lost & Found", &nav, &body)
}

/// The admin login form.
#[must_use]
pub fn login(flashes: &[Flash]) -> String {
    let body = format!(
        "{}<section><h2>Staff login</h2>\
<form method=\"post\" action=\"{LOGIN_PATH}\">\
<label>Password <input type=\"password\" name=\"password\" autofocus></label>\
<button type=\"submit\">Log in</button></form></section>",
        flashes_html(flashes)
    );
    layout("Staff login", "<a href=\"/\">Home</a>", &body)
}

fn checkbox(name: &str, checked: bool) -> String {
    let checked = if checked { " checked" } else { "" };
    format!("<input type=\"checkbox\" name=\"{name}\" value=\"1\"{checked}>")
}

/// The admin dashboard.
#[must_use]
pub fn dashboard(dashboard: &Dashboard, flashes: &[Flash]) -> String {
    let rows = dashboard
        .reports
        .iter()
        .fold(String::new(), |mut out, report| {
            let id = escape_html(&report.tracking_id);
            let _ = write!(
                out,
                "<tr data-tracking-id=\"{id}\" data-stage=\"{stage_number}\"><td><code>{id}</code></td>\
<td>{name}</td><td>{item}</td><td>{description}</td><td>{created}</td>\
<td>Stage {stage_number}: {stage}</td>\
<td><form method=\"post\" action=\"{ADMIN_PATH}/update/{id}\">\
<label>{found} Found</label><label>{claimed} Claimed</label>\
<button type=\"submit\">Save</button></form></td></tr>",
                name = escape_html(&report.passenger_name),
                item = escape_html(&report.item_name),
                description = escape_html(&report.description),
                created = report.created_at_display(),
                stage_number = report.stage().number(),
                stage = report.stage(),
                found = checkbox("found_status", report.found_status),
                claimed = checkbox("claim_status", report.claim_status),
            );
            out
        });

    let table = if dashboard.reports.is_empty() {
        "<p>No reports yet.</p>".to_string()
    } else {
        format!(
            "<table><thead><tr><th>Tracking ID</th><th>Passenger</th><th>Item</th>\
<th>Description</th><th>Reported</th><th>Stage</th><th>Update</th></tr></thead>\
<tbody>{rows}</tbody></table>"
        )
    };

    let body = format!(
        "{}{}<section><h2>All reports</h2>{table}</section>",
        flashes_html(flashes),
        metrics_html(&dashboard.metrics),
    );
    layout(
        "Admin dashboard",
        &format!("<a href=\"/\">Home</a> | <a href=\"{LOGOUT_PATH}\">Log out</a>"),
        &body,
    )
}

/// Generic failure page.
#[must_use]
pub fn error_page(message: &str) -> String {
    layout(
        "Error",
        "<a href=\"/\">Home</a>",
        &format!("<section><h2>{}</h2></section>", escape_html(message)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn report(found_status: bool, claim_status: bool) -> Report {
        Report {
            tracking_id: "LF-240101-ABC123".to_string(),
            passenger_name: "Jane <script>".to_string(),
            item_name: "Backpack".to_string(),
            description: "Blue & \"big\"".to_string(),
            found_status,
            claim_status,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
        }
    }

    fn page() -> PublicPage {
        PublicPage {
            metrics: Metrics::from_counts(3, 2, 1),
            recent: vec![report(false, false)],
            search_result: None,
            latest_tracking_id: None,
            flashes: Vec::new(),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<a href=\"x\">Tom & Jerry's</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#x27;s&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_home_escapes_user_content() {
        let html = home(&page(), false);
        assert!(html.contains("Jane &lt;script&gt;"));
        assert!(!html.contains("Jane <script>"));
    }

    #[test]
    fn test_home_metrics() {
        let html = home(&page(), false);
        assert!(html.contains("<strong>3</strong>Total reports"));
        assert!(html.contains("<strong>2</strong>Open cases"));
    }

    #[test]
    fn test_home_nav_depends_on_session() {
        assert!(home(&page(), false).contains("Staff login"));
        assert!(home(&page(), true).contains("Dashboard"));
    }

    #[test]
    fn test_home_latest_and_search_result() {
        let mut page = page();
        page.latest_tracking_id = Some("LF-240101-NEW000".to_string());
        page.search_result = Some(report(true, false));
        page.flashes = vec![Flash::success("Report submitted successfully.")];

        let html = home(&page, false);
        assert!(html.contains("LF-240101-NEW000"));
        assert!(html.contains("id=\"search-result\""));
        assert!(html.contains("Blue &amp; &quot;big&quot;"));
        assert!(html.contains("data-stage=\"2\""));
        assert!(html.contains("class=\"flash success\""));
    }

    #[test]
    fn test_home_empty_recent() {
        let mut page = page();
        page.recent.clear();
        assert!(home(&page, false).contains("No reports yet."));
    }

    #[test]
    fn test_pipeline_marks_completed_steps() {
        let html = pipeline_html(WorkflowStage::Found);
        assert_eq!(html.matches("class=\"done\"").count(), 2);

        let html = pipeline_html(WorkflowStage::Claimed);
        assert_eq!(html.matches("class=\"done\"").count(), 3);
    }

    #[test]
    fn test_dashboard_rows() {
        let dashboard_data = Dashboard {
            metrics: Metrics::from_counts(1, 1, 1),
            reports: vec![report(true, true)],
        };
        let html = dashboard(&dashboard_data, &[Flash::error("nope")]);
        assert!(html.contains("action=\"/admin/update/LF-240101-ABC123\""));
        assert!(html.contains("Stage 3: Claimed"));
        assert!(html.contains("name=\"found_status\" value=\"1\" checked"));
        assert!(html.contains("name=\"claim_status\" value=\"1\" checked"));
        assert!(html.contains("class=\"flash error\""));
    }

    #[test]
    fn test_login_form() {
        let html = login(&[]);
        assert!(html.contains("name=\"password\""));
        assert!(html.contains("action=\"/admin/login\""));
    }

    #[test]
    fn test_error_page() {
        let html = error_page("Something <broke>");
        assert!(html.contains("Something &lt;broke&gt;"));
    }
}
