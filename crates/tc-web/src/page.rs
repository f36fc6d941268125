use crate::controller::MainView;
use crate::flash::Flash;

const SCRIPT: &str = r#"
for (const form of document.querySelectorAll("form[data-async]")) {
  form.addEventListener("submit", async (event) => {
    event.preventDefault();
    const response = await fetch(form.action, {
      method: "POST",
      body: new URLSearchParams(new FormData(form)),
    });
    const text = await response.text();
    const status = document.getElementById("status");
    if (response.ok) {
      document.getElementById("settings").textContent = text;
      status.textContent = response.headers.get("x-flash") || "";
    } else {
      status.textContent = text;
    }
  });
}
"#;

/// Render the main page: rule form, import box, and live settings
pub fn render(view: &MainView, flashes: &[Flash]) -> Result<String, serde_json::Error> {
    let settings = view.settings.to_pretty_json()?;

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n<title>TC GUI</title>\n</head>\n<body>\n");
    html.push_str("<h1>Traffic control</h1>\n");

    html.push_str("<ul id=\"flashes\">\n");
    for flash in flashes {
        html.push_str(&format!("<li>{}</li>\n", escape(flash.message())));
    }
    html.push_str("</ul>\n<p id=\"status\"></p>\n");

    // Rule form
    html.push_str("<form action=\"/add_rule\" method=\"post\" data-async>\n");
    html.push_str("<select name=\"Interface\">\n");
    for iface in &view.interfaces {
        let iface = escape(iface);
        html.push_str(&format!("<option value=\"{0}\">{0}</option>\n", iface));
    }
    html.push_str("</select>\n");
    html.push_str(concat!(
        "<select name=\"Direction\">",
        "<option value=\"\"></option>",
        "<option value=\"outgoing\">outgoing</option>",
        "<option value=\"incoming\">incoming</option>",
        "</select>\n",
        "<input name=\"Network\" placeholder=\"network\">\n",
        "<select name=\"NetworkType\">",
        "<option value=\"destination\">destination</option>",
        "<option value=\"source\">source</option>",
        "</select>\n",
        "<input name=\"Rate\" placeholder=\"rate\">\n",
    ));
    html.push_str("<select name=\"rate_unit\">\n");
    for unit in &view.units {
        let selected = if *unit == view.standard_unit {
            " selected"
        } else {
            ""
        };
        html.push_str(&format!("<option value=\"{0}\"{1}>{0}</option>\n", unit, selected));
    }
    html.push_str("</select>\n");
    for (name, label) in [
        ("Delay", "delay (ms)"),
        ("DelayVariance", "variance (ms)"),
        ("Loss", "loss %"),
        ("Duplicate", "duplicate %"),
        ("Reorder", "reorder %"),
        ("Corrupt", "corrupt %"),
    ] {
        html.push_str(&format!("<input name=\"{}\" placeholder=\"{}\">\n", name, label));
    }
    html.push_str("<button type=\"submit\">Apply</button>\n</form>\n");

    // Import / clear
    html.push_str("<form action=\"/import_settings\" method=\"post\" data-async>\n");
    html.push_str("<textarea name=\"Settings\" rows=\"8\" cols=\"60\"></textarea>\n");
    html.push_str("<button type=\"submit\">Import</button>\n</form>\n");
    html.push_str("<form action=\"/remove_all\" method=\"post\" data-async>\n");
    html.push_str("<button type=\"submit\">Remove all</button>\n</form>\n");

    html.push_str(&format!("<pre id=\"settings\">{}</pre>\n", escape(&settings)));
    html.push_str(&format!("<script>{}</script>\n", SCRIPT));
    html.push_str("</body>\n</html>\n");

    Ok(html)
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tc_core::{BANDWIDTH_UNITS, RateUnit, Snapshot};

    fn view() -> MainView {
        let mut settings = Snapshot::new();
        settings.insert("eth0", json!({"outgoing": {"note": "<b>"}}));
        MainView {
            units: BANDWIDTH_UNITS.to_vec(),
            standard_unit: RateUnit::Mbps,
            settings,
            interfaces: vec!["eth0".to_string()],
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_render_contains_view() {
        let html = render(&view(), &[Flash::Updated]).unwrap();
        assert!(html.contains("<option value=\"mbps\" selected>mbps</option>"));
        assert!(html.contains("<option value=\"tbps\">tbps</option>"));
        assert!(html.contains("<option value=\"eth0\">eth0</option>"));
        assert!(html.contains("Successfully updated settings"));
        assert!(html.contains("&lt;b&gt;"));
        assert!(!html.contains("\"<b>\""));
    }
}
