// In crates/web-server/src/page.rs

use core_types::{Interval, Symbol};

/// Renders the index page: watchlist table, interval/timezone pickers and the chart host.
///
/// Symbols are validated tickers and never contain HTML metacharacters.
pub fn render_index(watchlist: &[Symbol], default_timezone: &str) -> String {
    let rows: String = watchlist
        .iter()
        .map(|symbol| {
            format!(
                "<tr data-symbol=\"{0}\"><td>{0}</td><td class=\"price\">…</td></tr>\n",
                symbol
            )
        })
        .collect();

    let intervals: String = Interval::ALL
        .iter()
        .map(|interval| {
            let selected = if *interval == Interval::default() { " selected" } else { "" };
            format!("<option value=\"{0}\"{1}>{0}</option>", interval, selected)
        })
        .collect();

    let first = watchlist.first().map(Symbol::as_str).unwrap_or("");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>MA Crossover Watchlist</title>
  <link rel="stylesheet" href="/static/style.css">
  <script src="https://cdn.plot.ly/plotly-2.35.2.min.js"></script>
</head>
<body data-default-symbol="{first}" data-default-timezone="{default_timezone}">
  <aside>
    <h2>Watchlist</h2>
    <table id="watchlist-table">
      <thead><tr><th>Symbol</th><th>Price</th></tr></thead>
      <tbody>
{rows}      </tbody>
    </table>
  </aside>
  <main>
    <div class="controls">
      <label>Interval <select id="interval">{intervals}</select></label>
      <label>Timezone <input id="timezone" value="{default_timezone}"></label>
      <button id="refreshBtn">Refresh</button>
      <span>Signal: <strong id="current-signal">-</strong></span>
    </div>
    <div id="chart"></div>
  </main>
  <script src="/static/app.js"></script>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_watchlist_symbol() {
        let watchlist = vec![Symbol::parse("AAPL").unwrap(), Symbol::parse("MSFT").unwrap()];
        let html = render_index(&watchlist, "America/New_York");

        assert!(html.contains("data-symbol=\"AAPL\""));
        assert!(html.contains("data-symbol=\"MSFT\""));
        assert!(html.contains("data-default-symbol=\"AAPL\""));
        assert!(html.contains("<option value=\"1m\" selected>1m</option>"));
        assert!(html.contains("value=\"America/New_York\""));
    }
}
