/// Landing page shown at `/`, embedding the MJPEG feed.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexPage {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl IndexPage {
    pub fn render(&self) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <title>FaceStream - Live Face Detection</title>
    <style>
        body {{ font-family: Arial, sans-serif; text-align: center; background: #222; color: white; padding: 20px; }}
        h1 {{ color: #4CAF50; }}
        img {{ max-width: 100%; height: auto; border: 2px solid #4CAF50; margin-top: 20px; }}
        .info {{ margin-top: 20px; font-size: 14px; color: #aaa; }}
    </style>
</head>
<body>
    <h1>FaceStream Camera</h1>
    <h2>Face Detection with Haar Cascade</h2>
    <img src="/video_feed" width="100%" style="max-width: {width}px;">
    <div class="info">
        <p>Resolution: {width}x{height} @ {fps} FPS</p>
        <p>Green boxes = Detected faces</p>
    </div>
</body>
</html>
"#,
            width = self.width,
            height = self.height,
            fps = self.fps,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_embeds_feed_and_settings() {
        let html = IndexPage {
            width: 1280,
            height: 720,
            fps: 30,
        }
        .render();
        assert!(html.contains(r#"<img src="/video_feed""#));
        assert!(html.contains("Resolution: 1280x720 @ 30 FPS"));
        assert!(html.contains("max-width: 1280px"));
    }
}
