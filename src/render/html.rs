use crate::error::FileError;
use crate::log::LogRow;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// One scatter series: every point logged under `name`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    /// (timestamp, value) pairs in file order.
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotData {
    pub title: String,
    pub series: Vec<Series>,
}

impl PlotData {
    /// Group rows into one series per name. Every value has to be numeric; the
    /// first one that is not fails the whole file.
    pub fn from_rows(title: impl Into<String>, rows: &[&LogRow], path: &Path) -> Result<Self, FileError> {
        let mut by_name: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
        for row in rows {
            let y = row.value.number.ok_or_else(|| {
                FileError::input_format(
                    path,
                    format!(
                        "{} at {}: value {:?} is not numeric",
                        row.name, row.timestamp, row.value.raw
                    ),
                )
            })?;
            by_name
                .entry(row.name.as_str())
                .or_default()
                .push([row.timestamp, y]);
        }

        Ok(Self {
            title: title.into(),
            series: by_name
                .into_iter()
                .map(|(name, points)| Series {
                    name: name.to_string(),
                    points,
                })
                .collect(),
        })
    }
}

/// Render a self-contained HTML scatter plot (data embedded as JSON).
///
/// Each series gets its own color and marker symbol. The template is filled by
/// string replacement because the JS below is full of `{}`.
pub fn render_scatter_html(data: &PlotData) -> serde_json::Result<String> {
    // "</script>" inside a name would end the script block early.
    let json = serde_json::to_string(data)?.replace("</", "<\\/");

    const TEMPLATE: &str = r##"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>__TITLE__</title>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 0; }
  header { padding: 12px 16px; border-bottom: 1px solid #ddd; }
  .summary { display: flex; gap: 16px; flex-wrap: wrap; font-size: 14px; color: #333; }
  .pill { padding: 4px 8px; border: 1px solid #ddd; border-radius: 999px; background: #fafafa; }
  .main { padding: 12px 16px; }
  .legend { display: flex; gap: 16px; flex-wrap: wrap; font-size: 13px; margin-top: 8px; }
  .legend-item { cursor: pointer; user-select: none; }
  .legend-item.off { opacity: 0.35; }
  .tick { font-size: 11px; fill: #555; }
  .axis { stroke: #999; }
  .grid { stroke: #eee; }
  #tooltip { position: fixed; pointer-events: none; background: #fff; border: 1px solid #ccc;
             padding: 4px 6px; font-size: 12px; display: none; }
</style>
</head>
<body>
<header>
  <div class="summary" id="summary"></div>
</header>
<div class="main">
  <svg id="plot" width="1100" height="600"></svg>
  <div class="legend" id="legend"></div>
</div>
<div id="tooltip"></div>

<script>
const DATA = __DATA__;

const COLORS = ["#1f77b4", "#d62728", "#2ca02c", "#ff7f0e", "#9467bd", "#8c564b", "#e377c2", "#17becf"];
const SYMBOLS = ["circle", "square", "diamond", "triangle", "cross"];
const hidden = new Set();
const NS = "http://www.w3.org/2000/svg";
const M = { left: 70, right: 20, top: 20, bottom: 45 };

function el(tag, attrs) {
  const e = document.createElementNS(NS, tag);
  for (const [k, v] of Object.entries(attrs)) e.setAttribute(k, v);
  return e;
}

function escapeHtml(s) {
  return String(s)
    .replaceAll("&", "&amp;")
    .replaceAll("<", "&lt;")
    .replaceAll(">", "&gt;")
    .replaceAll('"', "&quot;")
    .replaceAll("'", "&#39;");
}

function extent(values) {
  let lo = Infinity, hi = -Infinity;
  for (const v of values) { if (v < lo) lo = v; if (v > hi) hi = v; }
  if (!isFinite(lo)) return [0, 1];
  if (lo === hi) return [lo - 1, hi + 1];
  const pad = (hi - lo) * 0.05;
  return [lo - pad, hi + pad];
}

function ticks(lo, hi, n) {
  const out = [];
  for (let i = 0; i <= n; i++) out.push(lo + (hi - lo) * i / n);
  return out;
}

function fmt(x) {
  return Math.abs(x) >= 1000 || (Math.abs(x) < 0.01 && x !== 0) ? x.toExponential(2) : (Math.round(x * 1000) / 1000).toString();
}

function marker(symbol, x, y, color) {
  const r = 3.5;
  switch (symbol) {
    case "square":
      return el("rect", { x: x - r, y: y - r, width: 2 * r, height: 2 * r, fill: color });
    case "diamond":
      return el("polygon", { points: `${x},${y - r - 1} ${x + r + 1},${y} ${x},${y + r + 1} ${x - r - 1},${y}`, fill: color });
    case "triangle":
      return el("polygon", { points: `${x},${y - r - 1} ${x + r + 1},${y + r} ${x - r - 1},${y + r}`, fill: color });
    case "cross":
      return el("path", { d: `M${x - r},${y - r}L${x + r},${y + r}M${x - r},${y + r}L${x + r},${y - r}`, stroke: color, "stroke-width": 2 });
    default:
      return el("circle", { cx: x, cy: y, r: r, fill: color });
  }
}

function renderSummary() {
  const total = DATA.series.reduce((n, s) => n + s.points.length, 0);
  document.getElementById("summary").innerHTML = `
    <span class="pill"><b>${escapeHtml(DATA.title)}</b></span>
    <span class="pill">series: <b>${DATA.series.length}</b></span>
    <span class="pill">points: <b>${total}</b></span>
  `;
}

function renderPlot() {
  const svg = document.getElementById("plot");
  svg.innerHTML = "";
  const W = svg.width.baseVal.value, H = svg.height.baseVal.value;
  const visible = DATA.series.filter(s => !hidden.has(s.name));
  const xs = [], ys = [];
  for (const s of visible) for (const [x, y] of s.points) { xs.push(x); ys.push(y); }
  const [x0, x1] = extent(xs), [y0, y1] = extent(ys);
  const sx = x => M.left + (x - x0) / (x1 - x0) * (W - M.left - M.right);
  const sy = y => H - M.bottom - (y - y0) / (y1 - y0) * (H - M.top - M.bottom);

  for (const t of ticks(x0, x1, 8)) {
    svg.appendChild(el("line", { x1: sx(t), x2: sx(t), y1: M.top, y2: H - M.bottom, class: "grid" }));
    const label = el("text", { x: sx(t), y: H - M.bottom + 16, "text-anchor": "middle", class: "tick" });
    label.textContent = fmt(t);
    svg.appendChild(label);
  }
  for (const t of ticks(y0, y1, 6)) {
    svg.appendChild(el("line", { x1: M.left, x2: W - M.right, y1: sy(t), y2: sy(t), class: "grid" }));
    const label = el("text", { x: M.left - 6, y: sy(t) + 4, "text-anchor": "end", class: "tick" });
    label.textContent = fmt(t);
    svg.appendChild(label);
  }
  svg.appendChild(el("line", { x1: M.left, x2: W - M.right, y1: H - M.bottom, y2: H - M.bottom, class: "axis" }));
  svg.appendChild(el("line", { x1: M.left, x2: M.left, y1: M.top, y2: H - M.bottom, class: "axis" }));
  const xl = el("text", { x: (W + M.left) / 2, y: H - 8, "text-anchor": "middle", class: "tick" });
  xl.textContent = "Timestamp";
  svg.appendChild(xl);

  const tip = document.getElementById("tooltip");
  DATA.series.forEach((s, i) => {
    if (hidden.has(s.name)) return;
    const color = COLORS[i % COLORS.length], symbol = SYMBOLS[i % SYMBOLS.length];
    for (const [x, y] of s.points) {
      const m = marker(symbol, sx(x), sy(y), color);
      m.onmouseenter = (e) => {
        tip.style.display = "block";
        tip.style.left = (e.clientX + 10) + "px";
        tip.style.top = (e.clientY + 10) + "px";
        tip.innerHTML = `${escapeHtml(s.name)}<br>t=${x}<br>value=${y}`;
      };
      m.onmouseleave = () => { tip.style.display = "none"; };
      svg.appendChild(m);
    }
  });
}

function renderLegend() {
  const legend = document.getElementById("legend");
  legend.innerHTML = "";
  DATA.series.forEach((s, i) => {
    const item = document.createElement("span");
    item.className = "legend-item" + (hidden.has(s.name) ? " off" : "");
    item.innerHTML = `<span style="color:${COLORS[i % COLORS.length]}">&#9679;</span> ${escapeHtml(s.name)} <span style="color:#777">(${SYMBOLS[i % SYMBOLS.length]})</span>`;
    item.onclick = () => {
      if (hidden.has(s.name)) hidden.delete(s.name); else hidden.add(s.name);
      renderLegend();
      renderPlot();
    };
    legend.appendChild(item);
  });
}

renderSummary();
renderLegend();
renderPlot();
</script>
</body>
</html>
"##;

    Ok(TEMPLATE
        .replace("__TITLE__", &escape_html(&data.title))
        .replace("__DATA__", &json))
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
