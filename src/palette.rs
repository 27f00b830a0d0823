use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;

use crate::models::GradeState;

/// Numeric bands for QNA and month scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreBand {
    A,
    B,
    C,
}

impl ScoreBand {
    /// `(0.89, 1.0]` is A, `[0.5, 0.89]` is B, anything lower is C.
    pub fn for_score(score: f64) -> ScoreBand {
        if score > 0.89 {
            ScoreBand::A
        } else if score >= 0.5 {
            ScoreBand::B
        } else {
            ScoreBand::C
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Palette {
    pub band_a: String,
    pub band_b: String,
    pub band_c: String,
    pub excellent: String,
    pub good: String,
    pub little: String,
    pub almost_none: String,
    pub none: String,
}

impl Palette {
    pub fn defaults() -> Palette {
        Palette {
            band_a: "#16a34a".to_string(),
            band_b: "#ca8a04".to_string(),
            band_c: "#dc2626".to_string(),
            excellent: "#15803d".to_string(),
            good: "#65a30d".to_string(),
            little: "#eab308".to_string(),
            almost_none: "#f97316".to_string(),
            none: "#b91c1c".to_string(),
        }
    }

    pub fn band_color(&self, band: ScoreBand) -> &str {
        match band {
            ScoreBand::A => &self.band_a,
            ScoreBand::B => &self.band_b,
            ScoreBand::C => &self.band_c,
        }
    }

    pub fn state_color(&self, state: GradeState) -> &str {
        match state {
            GradeState::Excellent => &self.excellent,
            GradeState::Good => &self.good,
            GradeState::Little => &self.little,
            GradeState::AlmostNone => &self.almost_none,
            GradeState::None => &self.none,
        }
    }

    /// Applies stored `(key, color)` rows on top of this palette.
    pub fn with_overrides<I, K, V>(mut self, rows: I) -> Palette
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, color) in rows {
            let slot = match key.as_ref() {
                "band_a" => &mut self.band_a,
                "band_b" => &mut self.band_b,
                "band_c" => &mut self.band_c,
                "state_e" => &mut self.excellent,
                "state_b" => &mut self.good,
                "state_p" => &mut self.little,
                "state_cn" => &mut self.almost_none,
                "state_n" => &mut self.none,
                other => {
                    tracing::debug!(key = other, "ignoring unknown palette key");
                    continue;
                }
            };
            *slot = color.into();
        }
        self
    }

    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("band_a", self.band_a.as_str()),
            ("band_b", self.band_b.as_str()),
            ("band_c", self.band_c.as_str()),
            ("state_e", self.excellent.as_str()),
            ("state_b", self.good.as_str()),
            ("state_p", self.little.as_str()),
            ("state_cn", self.almost_none.as_str()),
            ("state_n", self.none.as_str()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaletteState {
    Defaults(Palette),
    Fetched(Palette),
}

impl PaletteState {
    pub fn palette(&self) -> &Palette {
        match self {
            PaletteState::Defaults(palette) | PaletteState::Fetched(palette) => palette,
        }
    }

    pub fn is_fetched(&self) -> bool {
        matches!(self, PaletteState::Fetched(_))
    }
}

/// Starts with the built-in palette and swaps in the fetched one whenever
/// the background lookup finishes.
pub struct PaletteHandle {
    receiver: watch::Receiver<PaletteState>,
}

impl PaletteHandle {
    pub fn defaults_only() -> PaletteHandle {
        let (_sender, receiver) = watch::channel(PaletteState::Defaults(Palette::defaults()));
        PaletteHandle { receiver }
    }

    pub fn spawn<F>(fetch: F) -> PaletteHandle
    where
        F: Future<Output = anyhow::Result<Palette>> + Send + 'static,
    {
        let (sender, receiver) = watch::channel(PaletteState::Defaults(Palette::defaults()));
        tokio::spawn(async move {
            match fetch.await {
                Ok(palette) => {
                    tracing::debug!("palette fetched");
                    let _ = sender.send(PaletteState::Fetched(palette));
                }
                Err(err) => {
                    tracing::warn!(error = %err, "palette lookup failed, keeping defaults");
                }
            }
        });
        PaletteHandle { receiver }
    }

    pub fn current(&self) -> PaletteState {
        self.receiver.borrow().clone()
    }

    /// Waits at most `grace` for the fetched palette, then returns whatever
    /// is current.
    pub async fn settle(&mut self, grace: Duration) -> PaletteState {
        if !self.receiver.borrow().is_fetched() {
            let _ = tokio::time::timeout(grace, self.receiver.changed()).await;
        }
        self.current()
    }
}
