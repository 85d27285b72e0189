//! Chart rendering
//!
//! Pages describe a chart as labels, values and colours and hand it to a
//! [`ChartSink`]. [`ChartJs`] delegates drawing to Chart.js in the browser;
//! [`InlineSvg`] draws it here so a static build works without network access.

use crate::format::Escaped;
use serde_json::json;
use std::f64::consts::PI;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Doughnut,
    Bar,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<String>,
}

impl Chart {
    pub fn new(kind: ChartKind) -> Self {
        Self { kind, labels: vec![], values: vec![], colors: vec![] }
    }

    pub fn push(&mut self, label: impl Into<String>, value: f64, color: impl Into<String>) {
        self.labels.push(label.into());
        self.values.push(value);
        self.colors.push(color.into());
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Turns a chart description into markup placed at `id`
pub trait ChartSink {
    fn render(&self, id: &str, chart: &Chart) -> String;

    /// Markup the page `<head>` needs for this sink
    fn head(&self) -> &'static str {
        ""
    }
}

/// Chart.js canvas + config
#[derive(Debug, Clone, Copy, Default)]
pub struct ChartJs;

impl ChartSink for ChartJs {
    fn render(&self, id: &str, chart: &Chart) -> String {
        let kind = match chart.kind {
            ChartKind::Doughnut => "doughnut",
            ChartKind::Bar => "bar",
        };
        let mut config = json!({
            "type": kind,
            "data": {
                "labels": chart.labels,
                "datasets": [{
                    "label": "Track Count",
                    "data": chart.values,
                    "backgroundColor": chart.colors,
                    "borderWidth": 0,
                }]
            },
            "options": {
                "responsive": true,
                "maintainAspectRatio": false,
                "plugins": { "legend": { "display": false } }
            }
        });
        if chart.kind == ChartKind::Bar {
            config["data"]["datasets"][0]["borderRadius"] = json!(8);
            config["options"]["scales"] = json!({
                "y": { "beginAtZero": true, "grid": { "color": "rgba(255,255,255,0.1)" }, "ticks": { "color": "#a0a0a0" } },
                "x": { "grid": { "display": false }, "ticks": { "color": "#a0a0a0", "maxRotation": 45, "minRotation": 45 } }
            });
        }

        // Labels are dataset text; keep them from closing the script element
        let config = config.to_string().replace('<', "\\u003c");
        format!(
            r#"<div class="chart-box"><canvas id="{id}"></canvas></div>
<script>new Chart(document.getElementById('{id}'), {config});</script>"#,
            id = Escaped(id),
            config = config
        )
    }

    fn head(&self) -> &'static str {
        r#"<script src="https://cdn.jsdelivr.net/npm/chart.js@4"></script>"#
    }
}

/// Self-contained SVG
#[derive(Debug, Clone, Copy)]
pub struct InlineSvg {
    pub width: u32,
    pub height: u32,
}

impl Default for InlineSvg {
    fn default() -> Self {
        Self { width: 640, height: 300 }
    }
}

impl InlineSvg {
    fn doughnut(&self, id: &str, chart: &Chart) -> String {
        let size = self.width.min(self.height) as f64;
        let c = size / 2.0;
        let stroke = size * 0.18;
        let r = c - stroke / 2.0;
        let circumference = 2.0 * PI * r;
        let total: f64 = chart.values.iter().filter(|v| **v > 0.0).sum();

        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg id="{}" class="chart" viewBox="0 0 {size} {size}" width="{size}" height="{size}" role="img">"#,
            Escaped(id)
        );
        let _ = write!(
            svg,
            "<circle cx=\"{c}\" cy=\"{c}\" r=\"{r:.2}\" fill=\"none\" stroke=\"#2a2a2a\" stroke-width=\"{stroke:.2}\"/>"
        );

        if total > 0.0 {
            let mut offset = 0.0;
            for ((label, value), color) in chart.labels.iter().zip(&chart.values).zip(&chart.colors) {
                if *value <= 0.0 {
                    continue;
                }
                let len = value / total * circumference;
                let _ = write!(
                    svg,
                    r#"<circle cx="{c}" cy="{c}" r="{r:.2}" fill="none" stroke="{color}" stroke-width="{stroke:.2}" stroke-dasharray="{len:.2} {gap:.2}" stroke-dashoffset="{off:.2}" transform="rotate(-90 {c} {c})"><title>{label} ({value})</title></circle>"#,
                    color = Escaped(color),
                    gap = circumference - len,
                    off = -offset,
                    label = Escaped(label),
                    value = value,
                );
                offset += len;
            }
        }

        svg.push_str("</svg>");
        svg
    }

    fn bar(&self, id: &str, chart: &Chart) -> String {
        let (w, h) = (self.width as f64, self.height as f64);
        let label_band = 90.0;
        let plot_h = h - label_band;
        let max = chart.values.iter().cloned().fold(0.0_f64, f64::max);
        let slot = if chart.is_empty() { w } else { w / chart.values.len() as f64 };
        let bar_w = slot * 0.7;

        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg id="{}" class="chart" viewBox="0 0 {w} {h}" width="100%" height="{h}" role="img">"#,
            Escaped(id)
        );

        for (i, ((label, value), color)) in
            chart.labels.iter().zip(&chart.values).zip(&chart.colors).enumerate()
        {
            let bar_h = if max > 0.0 { value.max(0.0) / max * (plot_h - 10.0) } else { 0.0 };
            let x = i as f64 * slot + (slot - bar_w) / 2.0;
            let y = plot_h - bar_h;
            let cx = i as f64 * slot + slot / 2.0;
            let _ = write!(
                svg,
                r#"<rect x="{x:.2}" y="{y:.2}" width="{bar_w:.2}" height="{bar_h:.2}" rx="4" fill="{color}"><title>{label} ({value})</title></rect>"#,
                color = Escaped(color),
                label = Escaped(label),
            );
            let _ = write!(
                svg,
                "<text x=\"{cx:.2}\" y=\"{ty:.2}\" fill=\"#a0a0a0\" font-size=\"11\" text-anchor=\"end\" transform=\"rotate(-45 {cx:.2} {ty:.2})\">{label}</text>",
                ty = plot_h + 14.0,
                label = Escaped(label),
            );
        }

        svg.push_str("</svg>");
        svg
    }
}

impl ChartSink for InlineSvg {
    fn render(&self, id: &str, chart: &Chart) -> String {
        match chart.kind {
            ChartKind::Doughnut => self.doughnut(id, chart),
            ChartKind::Bar => self.bar(id, chart),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kind: ChartKind) -> Chart {
        let mut chart = Chart::new(kind);
        chart.push("Rock & Alternative", 30.0, "#ef4444");
        chart.push("Instrumental", 10.0, "#10b981");
        chart
    }

    #[test]
    fn test_chartjs_config() {
        let html = ChartJs.render("clusterChart", &sample(ChartKind::Doughnut));
        assert!(html.contains(r#"<canvas id="clusterChart">"#));
        assert!(html.contains(r#""type":"doughnut""#));
        assert!(html.contains(r#""data":[30.0,10.0]"#));
        assert!(html.contains("#ef4444"));
        assert!(!html.contains("scales"));
    }

    #[test]
    fn test_chartjs_bar_has_axes() {
        let html = ChartJs.render("dist", &sample(ChartKind::Bar));
        assert!(html.contains(r#""type":"bar""#));
        assert!(html.contains("beginAtZero"));
        assert!(html.contains(r#""borderRadius":8"#));
    }

    #[test]
    fn test_chartjs_label_cannot_close_script() {
        let mut chart = Chart::new(ChartKind::Bar);
        chart.push("</script><script>alert(1)</script>", 1.0, "#fff");
        let html = ChartJs.render("x", &chart);
        assert_eq!(html.matches("</script>").count(), 1);
        assert!(html.contains("\\u003c/script>"));
    }

    #[test]
    fn test_svg_doughnut_segments() {
        let svg = InlineSvg::default().render("d", &sample(ChartKind::Doughnut));
        // Background ring plus one circle per segment
        assert_eq!(svg.matches("<circle").count(), 3);
        assert!(svg.contains("Rock &amp; Alternative (30)"));
    }

    #[test]
    fn test_svg_doughnut_all_zero() {
        let mut chart = Chart::new(ChartKind::Doughnut);
        chart.push("Empty", 0.0, "#000");
        let svg = InlineSvg::default().render("d", &chart);
        assert_eq!(svg.matches("<circle").count(), 1);
    }

    #[test]
    fn test_svg_bar_heights_proportional() {
        let svg = InlineSvg { width: 200, height: 300 }.render("b", &sample(ChartKind::Bar));
        assert_eq!(svg.matches("<rect").count(), 2);
        // Plot height 210 minus padding: tallest bar 200, the other a third of it
        assert!(svg.contains(r#"height="200.00""#));
        assert!(svg.contains(r#"height="66.67""#));
    }

    #[test]
    fn test_head_markup() {
        assert!(ChartJs.head().contains("chart.js"));
        assert_eq!(InlineSvg::default().head(), "");
    }
}
