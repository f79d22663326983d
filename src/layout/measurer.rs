//! Text measurement and greedy word wrap.
//!
//! A [`Measurer`] asks its [`TextMetricsBackend`] for font metrics and text
//! widths. When the backend is missing or cannot measure some text, it falls
//! back to a deterministic approximation (height = font size, average
//! character width = 0.6 x font size) and records that layout is approximate.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::cache::LruCache;
use crate::fonts::MonoFontMetrics;
use crate::types::Font;

const WRAP_CACHE_CAP: usize = 1024;

/// Vertical and horizontal metrics of a font.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    pub ascent: f64,
    pub descent: f64,
    pub height: f64,
    pub max_advance_width: f64,
    /// True when derived from the size-based fallback.
    pub approximate: bool,
}

impl FontMetrics {
    /// Size-based fallback metrics.
    pub fn approximate(size: f64) -> Self {
        Self {
            ascent: size * 0.8,
            descent: size * 0.2,
            height: size,
            max_advance_width: size * 0.6,
            approximate: true,
        }
    }
}

/// Measured size of one line of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextExtent {
    pub width: f64,
    pub height: f64,
    pub approximate: bool,
}

/// A source of real font measurements.
pub trait TextMetricsBackend: Send + Sync {
    /// Metrics for a font, or `None` if the font is unavailable.
    fn font_metrics(&self, font: &Font) -> Option<FontMetrics>;

    /// Advance width of `text`, or `None` if it cannot be measured.
    fn text_width(&self, font: &Font, text: &str) -> Option<f64>;
}

/// Font identity used as a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontKey {
    pub name: String,
    size_bits: u64,
    pub bold: bool,
    pub italic: bool,
}

impl FontKey {
    pub fn new(font: &Font) -> Self {
        Self {
            name: font.name.clone(),
            size_bits: font.size.to_bits(),
            bold: font.bold,
            italic: font.italic,
        }
    }

    pub fn size(&self) -> f64 {
        f64::from_bits(self.size_bits)
    }
}

type WrapKey = (FontKey, u64, String);

/// Measures and wraps text, caching per-font metrics and wrap results.
///
/// Safe to share between threads; caches sit behind mutexes that are never
/// held while measuring.
pub struct Measurer {
    backend: Option<Box<dyn TextMetricsBackend>>,
    metrics: Mutex<HashMap<FontKey, FontMetrics>>,
    wraps: Mutex<LruCache<WrapKey, Vec<String>>>,
    degraded: AtomicBool,
}

impl Measurer {
    pub fn new(backend: impl TextMetricsBackend + 'static) -> Self {
        Self::with_backend(Some(Box::new(backend)))
    }

    /// A measurer with no backend: every measurement is approximate.
    pub fn approximate() -> Self {
        Self::with_backend(None)
    }

    fn with_backend(backend: Option<Box<dyn TextMetricsBackend>>) -> Self {
        Self {
            backend,
            metrics: Mutex::new(HashMap::new()),
            wraps: Mutex::new(LruCache::new(WRAP_CACHE_CAP)),
            degraded: AtomicBool::new(false),
        }
    }

    /// Whether any measurement so far fell back to approximation.
    pub fn is_approximate(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    fn mark_degraded(&self, what: &str) {
        if !self.degraded.swap(true, Ordering::Relaxed) {
            log::warn!("text measurement unavailable for {what}; using approximate metrics");
        }
    }

    /// Metrics for a font, computed once per `(name, size, bold, italic)`.
    pub fn font_metrics(&self, font: &Font) -> FontMetrics {
        let key = FontKey::new(font);
        if let Some(m) = self.metrics.lock().get(&key) {
            return *m;
        }

        let measured = self.backend.as_ref().and_then(|b| b.font_metrics(font));
        let metrics = measured.unwrap_or_else(|| {
            self.mark_degraded(&format!("font {} {}pt", font.name, font.size));
            FontMetrics::approximate(font.size)
        });
        *self.metrics.lock().entry(key).or_insert(metrics)
    }

    /// `(width, height)` of a single line of text.
    pub fn measure(&self, font: &Font, text: &str) -> (f64, f64) {
        let extent = self.measure_extent(font, text);
        (extent.width, extent.height)
    }

    /// Like [`measure`](Self::measure), also reporting whether the result
    /// came from the fallback approximation.
    #[allow(clippy::cast_precision_loss)]
    pub fn measure_extent(&self, font: &Font, text: &str) -> TextExtent {
        let metrics = self.font_metrics(font);
        if text.is_empty() {
            return TextExtent {
                width: 0.0,
                height: metrics.height,
                approximate: metrics.approximate,
            };
        }
        let measured = self.backend.as_ref().and_then(|b| b.text_width(font, text));
        let approximate = metrics.approximate || measured.is_none();
        let width = measured.unwrap_or_else(|| {
            self.mark_degraded(&format!("text {text:?}"));
            metrics.max_advance_width * text.chars().count() as f64
        });
        TextExtent {
            width,
            height: metrics.height,
            approximate,
        }
    }

    /// Greedy word wrap into lines no wider than `max_width`.
    ///
    /// A word wider than `max_width` sits alone on its own line and is never
    /// split. Empty or whitespace-only input yields no lines.
    pub fn wrap(&self, font: &Font, text: &str, max_width: f64) -> Vec<String> {
        let key: WrapKey = (FontKey::new(font), max_width.to_bits(), text.to_string());
        if let Some(lines) = self.wraps.lock().get(&key) {
            return lines.clone();
        }

        let lines = self.wrap_uncached(font, text, max_width);
        self.wraps.lock().insert(key, lines.clone());
        lines
    }

    fn wrap_uncached(&self, font: &Font, text: &str, max_width: f64) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();

        for word in text.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if self.measure(font, &candidate).0 <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    /// Drop cached metrics and wrap results.
    pub fn clear(&self) {
        self.metrics.lock().clear();
        self.wraps.lock().clear();
    }
}

impl Default for Measurer {
    /// Measures with the mono faces the raster backend draws.
    fn default() -> Self {
        Self::new(MonoFontMetrics)
    }
}

impl fmt::Debug for Measurer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Measurer")
            .field("has_backend", &self.backend.is_some())
            .field("cached_fonts", &self.metrics.lock().len())
            .field("approximate", &self.is_approximate())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_approximate_measurer() {
        let m = Measurer::approximate();
        assert!(!m.is_approximate());
        let font = Font::default().with_size(10.0);
        assert_eq!(m.measure(&font, "abcde"), (30.0, 10.0));
        assert!(m.is_approximate());
        assert!(m.measure_extent(&font, "abc").approximate);
    }

    #[test]
    fn test_metrics_cached_per_font() {
        let m = Measurer::default();
        let a = m.font_metrics(&Font::default());
        let b = m.font_metrics(&Font::default());
        assert_eq!(a, b);
        m.font_metrics(&Font::default().bold());
        assert_eq!(m.metrics.lock().len(), 2);
        m.clear();
        assert!(m.metrics.lock().is_empty());
    }

    #[test]
    fn test_empty_text_has_zero_width() {
        let m = Measurer::default();
        let (w, h) = m.measure(&Font::default(), "");
        assert_eq!(w, 0.0);
        assert_eq!(h, 13.0);
    }

    #[test]
    fn test_missing_glyphs_fall_back_per_text() {
        let m = Measurer::default();
        let font = Font::default();
        assert!(!m.measure_extent(&font, "plain").approximate);
        let extent = m.measure_extent(&font, "naïve");
        assert!(extent.approximate);
        assert!((extent.width - 5.0 * 8.0).abs() < 1e-9);
        assert!(m.is_approximate());
    }

    #[test]
    fn test_wrap_cache_returns_same_lines() {
        let m = Measurer::default();
        let font = Font::default();
        let first = m.wrap(&font, "one two three four", 60.0);
        let second = m.wrap(&font, "one two three four", 60.0);
        assert_eq!(first, second);
        assert_eq!(m.wraps.lock().len(), 1);
    }
}
