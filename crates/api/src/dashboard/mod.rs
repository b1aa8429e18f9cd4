//! Dashboard page served at `/`.
//!
//! A single self-contained page: markup, styles and the polling script are
//! embedded as string constants and stitched together per request.
//!
//! - `html.rs`: page layout (connection card, signal panel, bots, activity log)
//! - `css.rs`: styling
//! - `js.rs`: polling loop and control actions
//!
//! The poll interval and signal defaults come from [`DashboardConfig`] and are
//! injected as a `CONFIG` object ahead of the main script.

mod css;
mod html;
mod js;

use crate::config::DashboardConfig;

/// Render a JSON literal that is safe to embed inside a `<script>` element.
fn js_literal(value: &str) -> String {
    serde_json::Value::from(value)
        .to_string()
        .replace("</", "<\\/")
}

fn config_script(config: &DashboardConfig) -> String {
    format!(
        "const CONFIG = {{\n    pollInterval: {},\n    defaultSymbol: {},\n    defaultTimeframe: {},\n    defaultStrategy: {}\n}};",
        config.poll_interval_ms.max(100),
        js_literal(&config.default_symbol),
        js_literal(&config.default_timeframe),
        js_literal(&config.default_strategy),
    )
}

/// Generate the complete dashboard HTML page
pub fn dashboard_html(config: &DashboardConfig) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Sniper Signals</title>
    <style>
{css}
    </style>
</head>
<body>
{html}
    <script>
{config}
{js}
    </script>
</body>
</html>"#,
        css = css::STYLES,
        html = html::TEMPLATE,
        config = config_script(config),
        js = js::SCRIPT
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_is_injected() {
        let config = DashboardConfig {
            poll_interval_ms: 3500,
            default_symbol: "R_50".to_string(),
            ..Default::default()
        };
        let page = dashboard_html(&config);
        assert!(page.contains("pollInterval: 3500"));
        assert!(page.contains(r#"defaultSymbol: "R_50""#));
        assert!(page.contains(r#"defaultStrategy: "sniper""#));
    }

    #[test]
    fn test_injected_strings_cannot_close_the_script() {
        let config = DashboardConfig {
            default_symbol: "</script><b>".to_string(),
            ..Default::default()
        };
        let page = dashboard_html(&config);
        assert!(!page.contains("</script><b>"));
        assert!(page.contains(r#""<\/script><b>""#));
    }
}
