//! EQ preset visualizer

use super::{cluster_color, write_sample_tracks, write_stat, Page, Renderer};
use crate::format::{format_freq, format_gain, Escaped};
use crate::loader::{Download, Snapshot};
use crate::model::{EqPreset, EQ_BANDS};
use std::fmt::{self, Write};

/// Bar height per dB of gain
const PX_PER_DB: f64 = 8.0;

/// One column of the band visualizer
#[derive(Debug, Clone, PartialEq)]
pub struct BandView {
    pub frequency: u32,
    pub gain: f64,
    /// Bar height in px, proportional to |gain|
    pub height: f64,
}

impl BandView {
    pub fn is_negative(&self) -> bool {
        self.gain < 0.0
    }

    pub fn color(&self) -> &'static str {
        if self.gain > 0.0 {
            "#ff5500"
        } else if self.gain < 0.0 {
            "#3b82f6"
        } else {
            "#a0a0a0"
        }
    }
}

/// All ten bands of a preset, 0 dB where the preset is silent
pub fn band_views(preset: &EqPreset) -> Vec<BandView> {
    EQ_BANDS
        .iter()
        .map(|&frequency| {
            let gain = preset.gain(frequency);
            BandView { frequency, gain, height: gain.abs() * PX_PER_DB }
        })
        .collect()
}

impl Renderer<'_> {
    pub fn presets(&self, snap: &Snapshot) -> String {
        let mut body = String::new();
        let _ = self.write_presets(&mut body, snap);
        self.layout(Page::Presets, Page::Presets.title(), &body)
    }

    fn write_presets(&self, out: &mut String, snap: &Snapshot) -> fmt::Result {
        out.push_str(r#"<div class="stats">"#);
        write_stat(out, "preset-count", &snap.presets.presets.len().to_string(), "EQ Presets")?;
        out.push_str("</div>");

        write!(
            out,
            r#"<div class="card"><h2>Downloads</h2><a class="btn" href="{}" download>eqMac presets</a><a class="btn btn-secondary" href="{}" download>Detailed presets</a></div>"#,
            self.site.download_href(Download::Presets),
            self.site.download_href(Download::DetailedPresets)
        )?;

        out.push_str(r#"<div id="presets-container">"#);
        for preset in &snap.presets_detailed.presets {
            self.write_preset_card(out, preset)?;
        }
        out.push_str("</div>");
        Ok(())
    }

    fn write_preset_card(&self, out: &mut String, preset: &EqPreset) -> fmt::Result {
        write!(
            out,
            r#"<div class="card" id="{id}"><h2 style="border-left: 4px solid {color}; padding-left: 1rem;">{name}</h2><p class="muted">{desc}</p>"#,
            id = Escaped(&preset.cluster_id),
            color = cluster_color(&preset.cluster_id),
            name = Escaped(&preset.preset_name),
            desc = Escaped(&preset.description),
        )?;

        out.push_str(r#"<div class="eq-visualizer">"#);
        for band in band_views(preset) {
            write!(
                out,
                r#"<div class="eq-band"><div class="eq-db" style="color: {color}">{db}</div><div class="eq-bar-container"><div class="eq-zero-line"></div><div class="eq-bar{neg}" style="height: {height}px;"></div></div><div class="eq-freq">{freq}</div></div>"#,
                color = band.color(),
                db = format_gain(band.gain),
                neg = if band.is_negative() { " negative" } else { "" },
                height = band.height,
                freq = format_freq(band.frequency),
            )?;
        }
        out.push_str("</div>");

        write!(
            out,
            r#"<div><strong>{}</strong> <span class="muted">tracks</span></div><h3>Characteristics</h3><div class="tags">"#,
            preset.track_count
        )?;
        for tag in &preset.characteristics {
            write!(out, r#"<span class="tag">{}</span>"#, Escaped(tag))?;
        }
        out.push_str("</div><h3>Sample Tracks</h3>");
        write_sample_tracks(out, &preset.sample_tracks)?;
        out.push_str("</div>");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::InlineSvg;
    use crate::loader::fixtures;
    use crate::render::Site;
    use std::collections::BTreeMap;

    #[test]
    fn test_band_views_fill_missing() {
        let preset = EqPreset {
            cluster_id: "x".into(),
            preset_name: "X".into(),
            eq_settings: BTreeMap::from([(32, 3.0), (8000, -2.0)]),
            ..Default::default()
        };
        let bands = band_views(&preset);
        assert_eq!(bands.len(), 10);
        assert_eq!(bands[0], BandView { frequency: 32, gain: 3.0, height: 24.0 });
        assert_eq!(bands[8].frequency, 8000);
        assert!(bands[8].is_negative());
        assert_eq!(bands[8].height, 16.0);
        assert_eq!(bands[3].gain, 0.0);
        assert_eq!(bands[3].color(), "#a0a0a0");
    }

    #[test]
    fn test_preset_page() {
        let snap = fixtures::snapshot();
        let html = Renderer::new(Site::Served, &InlineSvg::default()).presets(&snap);
        assert!(html.contains(r#"id="preset-count">1<"#));
        assert!(html.contains("+3dB"));
        assert!(html.contains("-2dB"));
        assert!(html.contains(">0dB<"));
        assert!(html.contains(r#"<div class="eq-freq">16k</div>"#));
        assert!(html.contains(r#"<div class="eq-freq">250</div>"#));
        assert!(html.contains(r#"class="eq-bar negative" style="height: 16px;""#));
        assert!(html.contains(r#"<span class="tag">Punchy</span>"#));
        assert!(html.contains(r#"href="/download/eq_presets_detailed.json""#));
    }

    #[test]
    fn test_static_download_links() {
        let snap = fixtures::snapshot();
        let html = Renderer::new(Site::Static, &InlineSvg::default()).presets(&snap);
        assert!(html.contains(r#"href="eq_presets.json" download"#));
    }
}
