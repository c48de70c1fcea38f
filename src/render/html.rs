use crate::dashboard::DashboardData;

/// Render a self-contained HTML dashboard (data embedded as JSON).
///
/// The template is filled by plain substitution of `__DATA__`; its JS braces
/// would collide with `format!`.
///
/// The page never recomputes a view: clicks are looked up in
/// `DATA.flow.transitions` and the target view is read from `DATA.flow.views`.
pub fn render_html_report(data: &DashboardData) -> anyhow::Result<String> {
    // `</` inside a JSON string would end the script element early.
    let json = serde_json::to_string(data)?.replace("</", "<\\/");

    const TEMPLATE: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Lobby Flow</title>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 0; }
  header { padding: 12px 16px; border-bottom: 1px solid #ddd; }
  .container { display: flex; height: calc(100vh - 58px); }
  .sidebar { width: 420px; border-right: 1px solid #ddd; padding: 12px; overflow: auto; }
  .main { flex: 1; padding: 12px; overflow: auto; }

  .summary { display: flex; gap: 16px; flex-wrap: wrap; font-size: 14px; color: #333; }
  .pill { padding: 4px 8px; border: 1px solid #ddd; border-radius: 999px; background: #fafafa; }
  .muted { color: #777; font-size: 12px; }
  .click { cursor: pointer; color: #0b5cad; }
  .click:hover { text-decoration: underline; }

  table { border-collapse: collapse; width: 100%; margin-top: 8px; }
  th, td { border-bottom: 1px solid #eee; padding: 6px 8px; text-align: left; font-size: 14px; }
  th { position: sticky; top: 0; background: white; border-bottom: 1px solid #ddd; }
  .num { text-align: right; font-variant-numeric: tabular-nums; }
  code { font-family: ui-monospace, SFMono-Regular, Menlo, Consolas, monospace; font-size: 13px; }
</style>
</head>
<body>
<header>
  <div class="summary" id="summary"></div>
</header>

<div class="container">
  <div class="sidebar">
    <div style="display:flex; gap: 8px; margin-bottom: 8px;">
      <button id="reset" style="padding: 6px 10px;">Reset</button>
      <button id="barsPrivate" style="padding: 6px 10px;">Private side</button>
      <button id="barsPublic" style="padding: 6px 10px;">Public side</button>
    </div>
    <h3 id="barsTitle"></h3>
    <table><tbody id="barsBody"></tbody></table>
    <h3>By province</h3>
    <table><tbody id="provinceBody"></tbody></table>
  </div>

  <div class="main">
    <h2>Flow <span class="muted" id="viewKey"></span></h2>
    <table>
      <thead>
        <tr><th>source</th><th>target</th><th class="num">reports</th></tr>
      </thead>
      <tbody id="flowBody"></tbody>
    </table>

    <h2>Reports per month</h2>
    <div style="display:flex; gap: 24px;">
      <div style="flex:1;"><h3>By sector</h3><table><tbody id="seriesPrivate"></tbody></table></div>
      <div style="flex:1;"><h3>By public category</h3><table><tbody id="seriesPublic"></tbody></table></div>
    </div>
  </div>
</div>

<script>
// Embedded dashboard data (JSON object literal)
const DATA = __DATA__;

const state = { view: DATA.flow.initial };

function escapeHtml(s) {
  return String(s)
    .replaceAll("&", "&amp;")
    .replaceAll("<", "&lt;")
    .replaceAll(">", "&gt;")
    .replaceAll('"', "&quot;")
    .replaceAll("'", "&#39;");
}

function renderSummary() {
  const t = DATA.totals;
  document.getElementById("summary").innerHTML = `
    <span class="pill">actors: <b>${t.actors}</b></span>
    <span class="pill">private: <b>${t.private_actors}</b></span>
    <span class="pill">public: <b>${t.public_actors}</b></span>
    <span class="pill">reports: <b>${t.reports}</b></span>
    <span class="pill">report links: <b>${t.links}</b></span>
  `;
}

// Same encoding as the Rust side: names may contain the key separators.
function keyPart(name) {
  return String(name).replaceAll("%", "%25").replaceAll("|", "%7C").replaceAll(":", "%3A");
}

function nodeText(dataset, name) {
  const node = dataset.nodes.find(n => n.name === name);
  return node && node.label ? `${escapeHtml(node.label)} <span class="muted">${escapeHtml(name)}</span>` : escapeHtml(name);
}

function go(eventKey) {
  const next = (DATA.flow.transitions[state.view] || {})[eventKey];
  if (next === undefined) return; // no-op in the current navigation state
  state.view = next;
  renderFlow();
}

function clickable(text, eventKey) {
  const legal = (DATA.flow.transitions[state.view] || {})[eventKey] !== undefined;
  const span = document.createElement("span");
  span.innerHTML = text;
  if (legal) {
    span.className = "click";
    span.onclick = () => go(eventKey);
  }
  return span;
}

function renderFlow() {
  const dataset = DATA.flow.views[state.view];
  document.getElementById("viewKey").textContent = state.view;
  const body = document.getElementById("flowBody");
  body.innerHTML = "";
  const pubs = new Set(dataset.public_names);
  for (const l of dataset.links) {
    const tr = document.createElement("tr");
    const src = document.createElement("td");
    src.appendChild(clickable(nodeText(dataset, l.source), (pubs.has(l.source) ? "public:" : "private:") + keyPart(l.source)));
    const dst = document.createElement("td");
    dst.appendChild(clickable(nodeText(dataset, l.target), "public:" + keyPart(l.target)));
    const val = document.createElement("td");
    val.className = "num";
    val.appendChild(clickable(String(l.value), `link:${keyPart(l.source)}|${keyPart(l.target)}`));
    tr.append(src, dst, val);
    body.appendChild(tr);
  }
}

function renderBars(title, bars, drill) {
  document.getElementById("barsTitle").textContent = title;
  const body = document.getElementById("barsBody");
  body.innerHTML = "";
  for (const b of bars) {
    const tr = document.createElement("tr");
    tr.innerHTML = `<td>${escapeHtml(b.name)}</td><td class="num">${b.count}</td>`;
    if (drill && drill[b.name]) {
      tr.firstChild.className = "click";
      tr.firstChild.onclick = () => renderBars(b.name, drill[b.name], null);
    }
    body.appendChild(tr);
  }
}

function renderProvinces() {
  const body = document.getElementById("provinceBody");
  body.innerHTML = "";
  for (const p of DATA.bars.by_province) {
    const tr = document.createElement("tr");
    tr.innerHTML = `<td>${escapeHtml(p.province ?? "unknown")}</td><td class="num">${p.count}</td>`;
    body.appendChild(tr);
  }
}

function renderSeries(id, series) {
  const body = document.getElementById(id);
  body.innerHTML = "";
  for (const [key, points] of Object.entries(series)) {
    const tr = document.createElement("tr");
    const cells = points.map(p => `<code>${p.month}</code>&nbsp;${p.count}`).join(" &middot; ");
    tr.innerHTML = `<td>${escapeHtml(key)}</td><td>${cells}</td>`;
    body.appendChild(tr);
  }
}

document.getElementById("reset").onclick = () => go("reset");
document.getElementById("barsPrivate").onclick = () => renderBars("By sector", DATA.bars.by_sector, DATA.bars.by_private);
document.getElementById("barsPublic").onclick = () => renderBars("By public category", DATA.bars.by_category, DATA.bars.by_public);

renderSummary();
renderFlow();
renderBars("By sector", DATA.bars.by_sector, DATA.bars.by_private);
renderProvinces();
renderSeries("seriesPrivate", DATA.series.by_sector);
renderSeries("seriesPublic", DATA.series.by_category);
</script>
</body>
</html>
"#;

    Ok(TEMPLATE.replace("__DATA__", &json))
}
