//! HTML output format for analysis reports
//!
//! A single self-contained page with embedded CSS and inline SVG:
//! - agreement heatmap (runs × channel index, plus the COMMON row)
//! - annotated Spearman correlation heatmap
//! - BER density spectrum, one curve per run

use crate::agreement::COMMON_ROW;
use crate::analysis::AnalysisReport;
use crate::density::DensitySpectrum;

/// Curve colours for the density spectrum (cycled)
const PALETTE: [&str; 8] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#17becf",
];

const SVG_WIDTH: f64 = 860.0;
const SVG_HEIGHT: f64 = 400.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 200.0;
const MARGIN_TOP: f64 = 20.0;
const MARGIN_BOTTOM: f64 = 50.0;

/// HTML report formatter
#[derive(Debug)]
pub struct HtmlReport<'a> {
    report: &'a AnalysisReport,
}

impl<'a> HtmlReport<'a> {
    pub fn new(report: &'a AnalysisReport) -> Self {
        Self { report }
    }

    /// Escape HTML special characters to prevent XSS
    fn escape_html(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }

    /// Generate embedded CSS styles
    fn generate_styles() -> &'static str {
        r#"
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            margin: 20px;
            background-color: #f5f5f5;
        }
        h1, h2 {
            color: #333;
        }
        table {
            border-collapse: collapse;
            background-color: white;
            box-shadow: 0 1px 3px rgba(0,0,0,0.1);
            margin-bottom: 20px;
        }
        th, td {
            border: 1px solid #ddd;
            padding: 6px;
            text-align: center;
        }
        th {
            background-color: #4a90d9;
            color: white;
            font-weight: bold;
        }
        .heatmap td {
            width: 6px;
            height: 14px;
            padding: 0;
            border: 1px solid #eeeeee;
        }
        .heatmap th.run {
            text-align: right;
            font-family: monospace;
            font-weight: normal;
            padding: 0 6px;
        }
        .heatmap tr.common th.run {
            font-weight: bold;
        }
        .frozen {
            background-color: #000080;
        }
        .reliable {
            background-color: #f0f0fa;
        }
        .corr td {
            font-family: monospace;
            min-width: 70px;
        }
        .verdict-pass {
            color: #2e7d32;
            font-weight: bold;
        }
        .verdict-fail {
            color: #c62828;
            font-weight: bold;
        }
        .spectrum {
            background-color: white;
            box-shadow: 0 1px 3px rgba(0,0,0,0.1);
        }
        .footer {
            margin-top: 20px;
            font-size: 0.8em;
            color: #888;
            text-align: center;
        }
        "#
    }

    /// Configuration and verdict section
    fn generate_summary(&self) -> String {
        let config = &self.report.config;
        let verdict = &self.report.verdict;
        let class = if verdict.passed {
            "verdict-pass"
        } else {
            "verdict-fail"
        };

        let mut html = String::new();
        html.push_str("<h2>Configuration</h2>\n<table>\n");
        html.push_str("<tr><th>Block length (N)</th><th>Information bits (K)</th><th>Frozen bits (N-K)</th><th>Runs</th><th>Skipped</th></tr>\n");
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            config.block_length,
            config.info_bits(),
            config.n_frozen(),
            self.report.runs.len(),
            self.report.skipped.len()
        ));
        html.push_str("</table>\n");

        html.push_str(&format!(
            "<p class=\"{}\">Common frozen indices: {} (target {}). {}</p>\n",
            class,
            verdict.common,
            verdict.target,
            Self::escape_html(&verdict.message())
        ));

        if !self.report.skipped.is_empty() {
            html.push_str("<h2>Skipped files</h2>\n<table>\n<tr><th>File</th><th>Reason</th></tr>\n");
            for skipped in &self.report.skipped {
                html.push_str(&format!(
                    "<tr><td>{}</td><td>{}</td></tr>\n",
                    Self::escape_html(&skipped.file),
                    Self::escape_html(&skipped.reason)
                ));
            }
            html.push_str("</table>\n");
        }

        html
    }

    fn heatmap_row(name: &str, labels: &[bool], row_class: &str) -> String {
        let mut row = format!(
            "<tr class=\"{}\"><th class=\"run\">{}</th>",
            row_class,
            Self::escape_html(name)
        );
        for (index, &frozen) in labels.iter().enumerate() {
            let (class, label) = if frozen {
                ("frozen", "frozen")
            } else {
                ("reliable", "reliable")
            };
            row.push_str(&format!(
                "<td class=\"{}\" title=\"{} #{}: {}\"></td>",
                class,
                Self::escape_html(name),
                index,
                label
            ));
        }
        row.push_str("</tr>\n");
        row
    }

    /// Agreement heatmap (figure 1)
    fn generate_agreement(&self) -> String {
        let matrix = &self.report.agreement;
        let mut html = String::new();
        html.push_str(&format!(
            "<h2>Frozen index intersection (N={}, K={})</h2>\n",
            self.report.config.block_length,
            self.report.config.info_bits()
        ));
        html.push_str("<table class=\"heatmap\">\n");

        for (name, labels) in matrix.runs.iter().zip(&matrix.rows) {
            html.push_str(&Self::heatmap_row(name, labels, "run"));
        }
        html.push_str(&Self::heatmap_row(COMMON_ROW, &matrix.common, "common"));

        html.push_str("</table>\n");
        html
    }

    /// Blue → white → red colour for a coefficient in [vmin, vmax]
    fn coolwarm(value: f64, vmin: f64, vmax: f64) -> String {
        if value.is_nan() {
            return "#dddddd".to_string();
        }
        let t = if vmax > vmin {
            ((value - vmin) / (vmax - vmin)).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let (cold, warm) = ((59.0, 76.0, 192.0), (180.0, 4.0, 38.0));
        let white = (221.0, 221.0, 221.0);
        let (from, to, s) = if t < 0.5 {
            (cold, white, t * 2.0)
        } else {
            (white, warm, (t - 0.5) * 2.0)
        };
        let mix = |a: f64, b: f64| (a + (b - a) * s).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            mix(from.0, to.0),
            mix(from.1, to.1),
            mix(from.2, to.2)
        )
    }

    /// Annotated Spearman heatmap (figure 2)
    fn generate_correlation(&self) -> String {
        let corr = &self.report.correlation;
        let vmin = corr.min_off_diagonal().map_or(0.9, |m| m.min(0.9));

        let mut html = String::new();
        html.push_str("<h2>Spearman rank correlation (channel ordering agreement)</h2>\n");
        html.push_str("<table class=\"corr\">\n<tr><th></th>");
        for name in &corr.names {
            html.push_str(&format!("<th>{}</th>", Self::escape_html(name)));
        }
        html.push_str("</tr>\n");

        for (i, name) in corr.names.iter().enumerate() {
            html.push_str(&format!("<tr><th>{}</th>", Self::escape_html(name)));
            for j in 0..corr.len() {
                let value = corr.get(i, j);
                let text = if value.is_nan() {
                    "n/a".to_string()
                } else {
                    format!("{:.4}", value)
                };
                html.push_str(&format!(
                    "<td style=\"background-color: {}\">{}</td>",
                    Self::coolwarm(value, vmin, 1.0),
                    text
                ));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</table>\n");

        if !self.report.controversial.is_empty() {
            html.push_str("<h2>Most controversial indices</h2>\n<table>\n<tr><th>Index</th><th>Rank variance</th></tr>\n");
            for channel in &self.report.controversial {
                html.push_str(&format!(
                    "<tr><td>{}</td><td>{:.2}</td></tr>\n",
                    channel.index, channel.variance
                ));
            }
            html.push_str("</table>\n");
        }

        html
    }

    /// Density spectrum as inline SVG (figure 3)
    fn generate_spectrum(&self) -> String {
        let spectrum: &DensitySpectrum = &self.report.density;
        let density = &self.report.config.density;
        let plot_w = SVG_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = SVG_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let peak = spectrum.peak();
        let y_max = if peak > 0.0 { peak * 1.05 } else { 1.0 };

        let x_of = |x: f64| {
            MARGIN_LEFT + (x - density.range_min) / (density.range_max - density.range_min) * plot_w
        };
        let y_of = |y: f64| MARGIN_TOP + plot_h - (y / y_max) * plot_h;

        let mut svg = String::new();
        svg.push_str(&format!(
            "<h2>Polarization spectrum (BER distribution, N={})</h2>\n",
            self.report.config.block_length
        ));
        svg.push_str(&format!(
            "<svg class=\"spectrum\" width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
            SVG_WIDTH, SVG_HEIGHT
        ));

        // Axes
        svg.push_str(&format!(
            "<line x1=\"{x0:.1}\" y1=\"{y0:.1}\" x2=\"{x1:.1}\" y2=\"{y0:.1}\" stroke=\"#333\"/>\n<line x1=\"{x0:.1}\" y1=\"{yt:.1}\" x2=\"{x0:.1}\" y2=\"{y0:.1}\" stroke=\"#333\"/>\n",
            x0 = MARGIN_LEFT,
            x1 = MARGIN_LEFT + plot_w,
            y0 = MARGIN_TOP + plot_h,
            yt = MARGIN_TOP
        ));
        for tick in 0..=5 {
            let x = density.range_min + (density.range_max - density.range_min) * tick as f64 / 5.0;
            svg.push_str(&format!(
                "<line x1=\"{px:.1}\" y1=\"{top:.1}\" x2=\"{px:.1}\" y2=\"{bottom:.1}\" stroke=\"#ccc\" stroke-dasharray=\"4 4\"/>\n<text x=\"{px:.1}\" y=\"{label:.1}\" font-size=\"11\" text-anchor=\"middle\">{x:.2}</text>\n",
                px = x_of(x),
                top = MARGIN_TOP,
                bottom = MARGIN_TOP + plot_h,
                label = MARGIN_TOP + plot_h + 16.0,
                x = x
            ));
        }
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\" text-anchor=\"middle\">Bit error rate (BER)</text>\n",
            MARGIN_LEFT + plot_w / 2.0,
            SVG_HEIGHT - 10.0
        ));
        svg.push_str(&format!(
            "<text x=\"15\" y=\"{:.1}\" font-size=\"12\" text-anchor=\"middle\" transform=\"rotate(-90 15 {:.1})\">Density</text>\n",
            MARGIN_TOP + plot_h / 2.0,
            MARGIN_TOP + plot_h / 2.0
        ));

        // Curves and legend
        for (i, curve) in spectrum.curves.iter().enumerate() {
            let color = PALETTE[i % PALETTE.len()];
            let points: Vec<String> = spectrum
                .grid
                .iter()
                .zip(&curve.density)
                .map(|(&x, &y)| format!("{:.1},{:.1}", x_of(x), y_of(y)))
                .collect();
            svg.push_str(&format!(
                "<polyline fill=\"{c}\" fill-opacity=\"0.1\" stroke=\"{c}\" stroke-width=\"2\" points=\"{p}\"><title>{n}</title></polyline>\n",
                c = color,
                p = points.join(" "),
                n = Self::escape_html(&curve.name)
            ));

            let legend_y = MARGIN_TOP + 14.0 + 18.0 * i as f64;
            let legend_x = MARGIN_LEFT + plot_w + 15.0;
            svg.push_str(&format!(
                "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"12\" height=\"12\" fill=\"{}\"/><text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\">{}</text>\n",
                legend_x,
                legend_y - 10.0,
                color,
                legend_x + 18.0,
                legend_y,
                Self::escape_html(&curve.name)
            ));
        }

        svg.push_str("</svg>\n");
        svg
    }

    /// Generate complete HTML document
    pub fn to_html(&self) -> String {
        let mut html = String::new();

        html.push_str("<!DOCTYPE html>\n");
        html.push_str("<html lang=\"en\">\n");

        html.push_str("<head>\n");
        html.push_str("    <meta charset=\"UTF-8\">\n");
        html.push_str(
            "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
        );
        html.push_str("    <title>Frozen Set Analysis Report</title>\n");
        html.push_str("    <style>");
        html.push_str(Self::generate_styles());
        html.push_str("</style>\n");
        html.push_str("</head>\n");

        html.push_str("<body>\n");
        html.push_str("<h1>Frozen Set Analysis Report</h1>\n");
        html.push_str(&self.generate_summary());
        html.push_str(&self.generate_agreement());
        html.push_str(&self.generate_correlation());
        html.push_str(&self.generate_spectrum());
        html.push_str(&format!(
            "<div class=\"footer\">Generated by frozen-audit {}</div>\n",
            env!("CARGO_PKG_VERSION")
        ));
        html.push_str("</body>\n</html>\n");

        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::config::AnalysisConfig;
    use crate::run::Run;

    fn report(names: [&str; 2]) -> AnalysisReport {
        let runs = vec![
            Run::new(names[0], vec![0.01, 0.2, 0.3, 0.45]),
            Run::new(names[1], vec![0.02, 0.3, 0.2, 0.44]),
        ];
        analyze(&runs, &AnalysisConfig::with_info_bits(4, 2)).unwrap()
    }

    #[test]
    fn test_html_structure() {
        let html = HtmlReport::new(&report(["a", "b"])).to_html();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Frozen Set Analysis Report</title>"));
        assert!(html.contains("Frozen index intersection (N=4, K=2)"));
        assert!(html.contains("Spearman rank correlation"));
        assert!(html.contains("<svg"));
        assert!(html.contains("</html>"));
    }

    #[test]
    fn test_heatmap_has_common_row() {
        let html = HtmlReport::new(&report(["a", "b"])).to_html();
        assert!(html.contains("<tr class=\"common\"><th class=\"run\">COMMON</th>"));
        // 3 rows x 4 channels
        let frozen = html.matches("<td class=\"frozen\"").count();
        let reliable = html.matches("<td class=\"reliable\"").count();
        assert_eq!(frozen + reliable, 12);
    }

    #[test]
    fn test_one_polyline_per_run() {
        let html = HtmlReport::new(&report(["a", "b"])).to_html();
        assert_eq!(html.matches("<polyline").count(), 2);
    }

    #[test]
    fn test_run_names_escaped() {
        let html = HtmlReport::new(&report(["<script>", "a&b"])).to_html();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("a&amp;b"));
    }

    #[test]
    fn test_coolwarm_endpoints() {
        assert_eq!(HtmlReport::coolwarm(0.9, 0.9, 1.0), "#3b4cc0");
        assert_eq!(HtmlReport::coolwarm(1.0, 0.9, 1.0), "#b40426");
        assert_eq!(HtmlReport::coolwarm(f64::NAN, 0.9, 1.0), "#dddddd");
        assert_eq!(HtmlReport::coolwarm(0.0, 0.9, 1.0), "#3b4cc0");
    }
}
