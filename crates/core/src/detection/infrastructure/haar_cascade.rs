use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::imageops::{self, FilterType};
use image::GrayImage;
use roxmltree::{Document, Node};
use thiserror::Error;

use crate::detection::domain::object_detector::{DetectionError, ObjectDetector};
use crate::detection::infrastructure::integral_image::IntegralImage;
use crate::detection::infrastructure::rectangle_grouping::{group_rectangles, GROUP_EPS};
use crate::shared::face_box::FaceBox;
use crate::shared::pipeline_config::DetectionParams;

#[derive(Error, Debug)]
pub enum CascadeError {
    #[error("failed to read cascade {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cascade XML is malformed: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("cascade is missing <{0}>")]
    Missing(&'static str),
    #[error("invalid value in <{element}>: {value:?}")]
    Value { element: &'static str, value: String },
    #[error("unsupported cascade: {0}")]
    Unsupported(String),
}

#[derive(Debug)]
struct WeightedRect {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    weight: f32,
}

#[derive(Debug)]
struct Feature {
    rects: Vec<WeightedRect>,
}

impl Feature {
    fn value(&self, ii: &IntegralImage, x: usize, y: usize) -> f32 {
        self.rects
            .iter()
            .map(|r| r.weight * ii.rect_sum(x + r.x, y + r.y, r.width, r.height) as f32)
            .sum()
    }
}

/// Split node. Children `> 0` index another node, `<= 0` index leaf `-child`.
#[derive(Debug)]
struct TreeNode {
    left: i32,
    right: i32,
    feature: usize,
    threshold: f32,
}

#[derive(Debug)]
struct WeakClassifier {
    nodes: Vec<TreeNode>,
    leaves: Vec<f32>,
}

impl WeakClassifier {
    fn predict(&self, mut feature_value: impl FnMut(usize) -> f32) -> f32 {
        let mut idx = 0i32;
        loop {
            let node = &self.nodes[idx as usize];
            idx = if feature_value(node.feature) < node.threshold {
                node.left
            } else {
                node.right
            };
            if idx <= 0 {
                return self.leaves[(-idx) as usize];
            }
        }
    }
}

#[derive(Debug)]
struct Stage {
    threshold: f32,
    classifiers: Vec<WeakClassifier>,
}

/// Boosted Haar-feature cascade in the OpenCV `<cascade>` XML layout.
#[derive(Debug)]
pub struct HaarCascade {
    window: (usize, usize),
    stages: Vec<Stage>,
    features: Vec<Feature>,
}

impl HaarCascade {
    pub fn from_file(path: &Path) -> Result<Self, CascadeError> {
        let xml = fs::read_to_string(path).map_err(|e| CascadeError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_xml_str(&xml)
    }

    pub fn from_xml_str(xml: &str) -> Result<Self, CascadeError> {
        let doc = Document::parse(xml)?;
        let root = doc
            .descendants()
            .find(|n| n.has_tag_name("cascade"))
            .ok_or_else(|| {
                if doc.descendants().any(|n| n.has_tag_name("trees")) {
                    CascadeError::Unsupported("legacy tree-based cascade layout".into())
                } else {
                    CascadeError::Missing("cascade")
                }
            })?;

        if let Some(kind) = root.children().find(|n| n.has_tag_name("featureType")) {
            let kind = kind.text().unwrap_or("").trim();
            if kind != "HAAR" {
                return Err(CascadeError::Unsupported(format!("feature type {kind}")));
            }
        }

        let width: usize = parse_one(child(root, "width")?, "width")?;
        let height: usize = parse_one(child(root, "height")?, "height")?;
        if width < 3 || height < 3 {
            return Err(CascadeError::Unsupported(format!(
                "window {width}x{height} is too small"
            )));
        }

        let features = items(child(root, "features")?)
            .map(|n| parse_feature(n, (width, height)))
            .collect::<Result<Vec<_>, _>>()?;

        let stages = items(child(root, "stages")?)
            .map(|n| parse_stage(n, features.len()))
            .collect::<Result<Vec<_>, _>>()?;
        if stages.is_empty() {
            return Err(CascadeError::Missing("stages"));
        }

        Ok(Self {
            window: (width, height),
            stages,
            features,
        })
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window.0 as u32, self.window.1 as u32)
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Slides the window over an image pyramid and groups the raw hits.
    pub fn detect_multi_scale(&self, image: &GrayImage, params: &DetectionParams) -> Vec<FaceBox> {
        let (img_w, img_h) = image.dimensions();
        let (win_w, win_h) = self.window_size();
        let mut candidates = Vec::new();

        let mut factor = 1.0f64;
        loop {
            let window = (
                (win_w as f64 * factor).round() as u32,
                (win_h as f64 * factor).round() as u32,
            );
            let scaled = (
                (img_w as f64 / factor).round() as u32,
                (img_h as f64 / factor).round() as u32,
            );
            if scaled.0 <= win_w || scaled.1 <= win_h {
                break;
            }
            if window.0 > img_w || window.1 > img_h {
                break;
            }
            if window.0 >= params.min_size.0 && window.1 >= params.min_size.1 {
                self.scan_scale(image, factor, scaled, window, &mut candidates);
            }
            factor *= params.scale_factor;
        }

        log::trace!("{} raw cascade hits", candidates.len());
        group_rectangles(&candidates, params.min_neighbors, GROUP_EPS)
    }

    fn scan_scale(
        &self,
        image: &GrayImage,
        factor: f64,
        scaled: (u32, u32),
        window: (u32, u32),
        out: &mut Vec<FaceBox>,
    ) {
        let resized;
        let source = if scaled == image.dimensions() {
            image
        } else {
            resized = imageops::resize(image, scaled.0, scaled.1, FilterType::Triangle);
            &resized
        };
        let ii = IntegralImage::new(source);
        let step = if factor > 2.0 { 1 } else { 2 };
        let span_x = scaled.0 as usize - self.window.0;
        let span_y = scaled.1 as usize - self.window.1;

        for y in (0..span_y).step_by(step) {
            for x in (0..span_x).step_by(step) {
                if self.accepts(&ii, x, y) {
                    out.push(FaceBox::new(
                        (x as f64 * factor).round() as i32,
                        (y as f64 * factor).round() as i32,
                        window.0 as i32,
                        window.1 as i32,
                    ));
                }
            }
        }
    }

    fn accepts(&self, ii: &IntegralImage, x: usize, y: usize) -> bool {
        let (nw, nh) = (self.window.0 - 2, self.window.1 - 2);
        let sum = ii.rect_sum(x + 1, y + 1, nw, nh) as f64;
        let sq_sum = ii.rect_sq_sum(x + 1, y + 1, nw, nh) as f64;
        let nf = (nw * nh) as f64 * sq_sum - sum * sum;
        let inv_norm = (if nf > 0.0 { 1.0 / nf.sqrt() } else { 1.0 }) as f32;

        self.stages.iter().all(|stage| {
            let total: f32 = stage
                .classifiers
                .iter()
                .map(|c| c.predict(|f| self.features[f].value(ii, x, y) * inv_norm))
                .sum();
            total >= stage.threshold
        })
    }
}

/// Cascade-backed implementation of the raw detector.
pub struct HaarCascadeDetector {
    cascade: HaarCascade,
}

impl HaarCascadeDetector {
    pub fn new(cascade: HaarCascade) -> Self {
        Self { cascade }
    }

    pub fn from_file(path: &Path) -> Result<Self, CascadeError> {
        let cascade = HaarCascade::from_file(path)?;
        log::info!(
            "Loaded cascade {} ({} stages, {}x{} window)",
            path.display(),
            cascade.stage_count(),
            cascade.window.0,
            cascade.window.1
        );
        Ok(Self::new(cascade))
    }
}

impl ObjectDetector for HaarCascadeDetector {
    fn detect(
        &mut self,
        image: &GrayImage,
        params: &DetectionParams,
    ) -> Result<Vec<FaceBox>, DetectionError> {
        if params.scale_factor.is_nan() || params.scale_factor <= 1.0 {
            return Err(DetectionError::Backend(format!(
                "scale factor must be greater than 1.0, got {}",
                params.scale_factor
            )));
        }
        Ok(self.cascade.detect_multi_scale(image, params))
    }
}

fn child<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> Result<Node<'a, 'input>, CascadeError> {
    node.children()
        .find(|n| n.has_tag_name(name))
        .ok_or(CascadeError::Missing(name))
}

/// Element children of an OpenCV sequence node (each tagged `_`).
fn items<'a, 'input: 'a>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|n| n.is_element())
}

fn tokens<'a>(node: Node<'a, '_>) -> impl Iterator<Item = &'a str> {
    node.text().unwrap_or("").split_whitespace()
}

fn parse_token<T: FromStr>(token: &str, element: &'static str) -> Result<T, CascadeError> {
    token.parse().map_err(|_| CascadeError::Value {
        element,
        value: token.to_string(),
    })
}

fn parse_one<T: FromStr>(node: Node, element: &'static str) -> Result<T, CascadeError> {
    let text = node.text().unwrap_or("").trim();
    parse_token(text, element)
}

fn parse_feature(node: Node, window: (usize, usize)) -> Result<Feature, CascadeError> {
    if let Some(tilted) = node.children().find(|n| n.has_tag_name("tilted")) {
        if tilted.text().unwrap_or("").trim() != "0" {
            return Err(CascadeError::Unsupported("tilted Haar features".into()));
        }
    }

    let rects = items(child(node, "rects")?)
        .map(|r| {
            let t: Vec<&str> = tokens(r).collect();
            if t.len() != 5 {
                return Err(CascadeError::Value {
                    element: "rects",
                    value: t.join(" "),
                });
            }
            let rect = WeightedRect {
                x: parse_token(t[0], "rects")?,
                y: parse_token(t[1], "rects")?,
                width: parse_token(t[2], "rects")?,
                height: parse_token(t[3], "rects")?,
                weight: parse_token(t[4], "rects")?,
            };
            if rect.x + rect.width > window.0 || rect.y + rect.height > window.1 {
                return Err(CascadeError::Value {
                    element: "rects",
                    value: t.join(" "),
                });
            }
            Ok(rect)
        })
        .collect::<Result<Vec<_>, _>>()?;

    if rects.is_empty() {
        return Err(CascadeError::Missing("rects"));
    }
    Ok(Feature { rects })
}

fn parse_stage(node: Node, feature_count: usize) -> Result<Stage, CascadeError> {
    let threshold = parse_one(child(node, "stageThreshold")?, "stageThreshold")?;
    let classifiers = items(child(node, "weakClassifiers")?)
        .map(|n| parse_weak_classifier(n, feature_count))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Stage {
        threshold,
        classifiers,
    })
}

fn parse_weak_classifier(node: Node, feature_count: usize) -> Result<WeakClassifier, CascadeError> {
    let raw: Vec<&str> = tokens(child(node, "internalNodes")?).collect();
    if raw.is_empty() || raw.len() % 4 != 0 {
        return Err(CascadeError::Value {
            element: "internalNodes",
            value: raw.join(" "),
        });
    }
    let nodes = raw
        .chunks_exact(4)
        .map(|c| {
            Ok(TreeNode {
                left: parse_token(c[0], "internalNodes")?,
                right: parse_token(c[1], "internalNodes")?,
                feature: parse_token(c[2], "internalNodes")?,
                threshold: parse_token(c[3], "internalNodes")?,
            })
        })
        .collect::<Result<Vec<_>, CascadeError>>()?;

    let leaves = tokens(child(node, "leafValues")?)
        .map(|t| parse_token(t, "leafValues"))
        .collect::<Result<Vec<f32>, _>>()?;

    let child_ok = |c: i32| {
        if c > 0 {
            (c as usize) < nodes.len()
        } else {
            ((-c) as usize) < leaves.len()
        }
    };
    for n in &nodes {
        if n.feature >= feature_count || !child_ok(n.left) || !child_ok(n.right) {
            return Err(CascadeError::Value {
                element: "internalNodes",
                value: raw.join(" "),
            });
        }
    }

    Ok(WeakClassifier { nodes, leaves })
}
