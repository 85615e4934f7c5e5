//! Failure snapshots of the shared tab
//!
//! `Page.captureScreenshot` only renders the viewport. A full-page capture
//! first resizes the emulated viewport to the document's content size, then
//! clears the override again.

use crate::browser::BrowserSession;
use crate::error::{BrowserError, Result};
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::protocol::cdp::{Emulation, Page};
use headless_chrome::Tab;
use serde_json::{json, Value};
use tracing::{debug, warn};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Largest edge Chrome renders in one capture
const MAX_CAPTURE_EDGE: u32 = 16_384;

/// Part of the tab to capture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaptureArea {
    /// What is currently visible
    Viewport,
    /// The whole document, beyond the viewport
    #[default]
    FullPage,
}

/// Whether `data` starts with the PNG file signature
pub fn is_png(data: &[u8]) -> bool {
    data.starts_with(&PNG_SIGNATURE)
}

fn to_edge(value: f64) -> u32 {
    (value.ceil().max(1.0) as u32).min(MAX_CAPTURE_EDGE)
}

/// Document size in CSS pixels from a `Page.getLayoutMetrics` reply
pub fn content_size(metrics: &Value) -> Option<(u32, u32)> {
    let size = metrics
        .get("cssContentSize")
        .or_else(|| metrics.get("contentSize"))?;
    let width = size.get("width")?.as_f64()?;
    let height = size.get("height")?.as_f64()?;
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    Some((to_edge(width), to_edge(height)))
}

/// Viewport override needed before capturing `area`, if any
pub fn viewport_override(
    area: CaptureArea,
    content: (u32, u32),
) -> Result<Option<Emulation::SetDeviceMetricsOverride>> {
    match area {
        CaptureArea::Viewport => Ok(None),
        CaptureArea::FullPage => {
            let (width, height) = content;
            let params = json!({
                "width": width,
                "height": height,
                "deviceScaleFactor": 1,
                "mobile": false,
            });
            Ok(Some(serde_json::from_value(params)?))
        }
    }
}

fn capture_viewport(tab: &Tab) -> Result<Vec<u8>> {
    tab.capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
        .map_err(|e| BrowserError::Browser(format!("Screenshot failed: {}", e)))
}

fn measure_content(tab: &Tab) -> Result<(u32, u32)> {
    let metrics = tab
        .call_method(Page::GetLayoutMetrics(None))
        .map_err(|e| BrowserError::Browser(format!("Failed to read layout metrics: {}", e)))?;
    content_size(&serde_json::to_value(&metrics)?)
        .ok_or_else(|| BrowserError::Browser("Layout metrics carry no content size".to_string()))
}

/// Capture the tab as PNG bytes
pub async fn capture_png(session: &BrowserSession, area: CaptureArea) -> Result<Vec<u8>> {
    let tab = session.tab();

    let override_params = match area {
        CaptureArea::Viewport => None,
        CaptureArea::FullPage => viewport_override(area, measure_content(tab)?)?,
    };

    let data = match override_params {
        None => capture_viewport(tab)?,
        Some(params) => {
            tab.call_method(params)
                .map_err(|e| BrowserError::Browser(format!("Failed to resize viewport: {}", e)))?;
            let captured = capture_viewport(tab);
            if let Err(e) = tab.call_method(Emulation::ClearDeviceMetricsOverride(None)) {
                warn!("Failed to restore viewport after screenshot: {}", e);
            }
            captured?
        }
    };

    if !is_png(&data) {
        return Err(BrowserError::Browser(format!(
            "Screenshot returned {} bytes that are not a PNG image",
            data.len()
        )));
    }

    debug!("Captured {:?} screenshot ({} bytes)", area, data.len());
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_area_is_full_page() {
        assert_eq!(CaptureArea::default(), CaptureArea::FullPage);
    }

    #[test]
    fn test_png_signature() {
        let mut png = PNG_SIGNATURE.to_vec();
        png.extend_from_slice(b"IHDR");
        assert!(is_png(&png));
        assert!(!is_png(b"\xff\xd8\xff\xe0JFIF"));
        assert!(!is_png(&[]));
    }

    #[test]
    fn test_content_size_prefers_css_pixels() {
        let metrics = json!({
            "contentSize": { "x": 0, "y": 0, "width": 3840.0, "height": 9000.0 },
            "cssContentSize": { "x": 0, "y": 0, "width": 1920.0, "height": 4500.4 }
        });
        assert_eq!(content_size(&metrics), Some((1920, 4501)));

        let legacy = json!({ "contentSize": { "x": 0, "y": 0, "width": 800, "height": 600 } });
        assert_eq!(content_size(&legacy), Some((800, 600)));

        assert_eq!(content_size(&json!({})), None);
    }

    #[test]
    fn test_content_size_is_capped() {
        let metrics = json!({
            "cssContentSize": { "x": 0, "y": 0, "width": 1920, "height": 100000 }
        });
        assert_eq!(content_size(&metrics), Some((1920, MAX_CAPTURE_EDGE)));
    }

    #[test]
    fn test_full_page_resizes_viewport_but_viewport_capture_does_not() {
        assert!(viewport_override(CaptureArea::Viewport, (1920, 4500))
            .unwrap()
            .is_none());

        let params = viewport_override(CaptureArea::FullPage, (1920, 4500))
            .unwrap()
            .unwrap();
        let sent = serde_json::to_value(&params).unwrap();
        assert_eq!(sent["width"], 1920);
        assert_eq!(sent["height"], 4500);
        assert_eq!(sent["mobile"], false);
    }
}
