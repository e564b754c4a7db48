//! SVG import and export for the stroke list, plus content framing.
//!
//! Export writes a self-contained document whose `viewBox` is the padded
//! union bounding box of all strokes, followed by one `<path>` per stroke.
//! Import walks any SVG, flattening every path, polyline and line it finds
//! into polylines; non-visual elements are skipped and groups are recursed.

use crate::config::BoardConfig;
use crate::error::{BoardError, BoardResult, ParseError};
use crate::stroke::{Stroke, StrokeStyle};
use crate::viewport::ViewportTransform;
use kurbo::{BezPath, PathEl, Point, Rect, Size};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::HashMap;

/// Tolerance used when flattening curves on import, in world units.
pub const FLATTEN_TOLERANCE: f64 = 0.25;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Elements whose subtree never contributes strokes.
const SKIPPED_ELEMENTS: &[&str] = &[
    "style",
    "script",
    "title",
    "desc",
    "defs",
    "metadata",
    "clippath",
    "mask",
    "symbol",
    "marker",
    "pattern",
    "lineargradient",
    "radialgradient",
];

/// A stroke read from a document, before it is given an id.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedStroke {
    pub points: Vec<Point>,
    pub style: StrokeStyle,
}

impl ImportedStroke {
    pub fn into_stroke(self) -> Option<Stroke> {
        Stroke::new(self.points, self.style)
    }
}

/// Converts between the stroke list and SVG text.
#[derive(Debug, Clone)]
pub struct VectorDocumentCodec {
    export_padding: f64,
    fit_padding: f64,
    background: String,
    default_color: String,
    default_width: f64,
}

impl Default for VectorDocumentCodec {
    fn default() -> Self {
        Self::new(&BoardConfig::default())
    }
}

impl VectorDocumentCodec {
    pub fn new(config: &BoardConfig) -> Self {
        Self {
            export_padding: config.export_padding,
            fit_padding: config.fit_padding,
            background: config.background.clone(),
            default_color: config.import_default_color.clone(),
            default_width: config.import_default_width,
        }
    }

    /// Serialize strokes into a standalone SVG document.
    pub fn export(&self, strokes: &[Stroke]) -> BoardResult<String> {
        let bounds = strokes
            .iter()
            .map(Stroke::bounds)
            .reduce(|acc, bounds| acc.union(bounds))
            .ok_or(BoardError::EmptyDocument)?;
        let frame = bounds.inflate(self.export_padding, self.export_padding);

        self.write_document(frame, strokes)
            .map_err(|e| BoardError::Export(e.to_string()))
    }

    fn write_document(&self, frame: Rect, strokes: &[Stroke]) -> std::io::Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let view_box = format!(
            "{} {} {} {}",
            frame.x0,
            frame.y0,
            frame.width(),
            frame.height()
        );
        let mut svg = BytesStart::new("svg");
        svg.push_attribute(("xmlns", SVG_NS));
        svg.push_attribute(("viewBox", view_box.as_str()));
        svg.push_attribute(("preserveAspectRatio", "xMidYMid meet"));
        writer.write_event(Event::Start(svg))?;

        let style = format!(
            "svg {{ display: block; background: {}; }} \
             path {{ fill: none; stroke-linecap: round; stroke-linejoin: round; }}",
            self.background
        );
        writer.write_event(Event::Start(BytesStart::new("style")))?;
        writer.write_event(Event::Text(BytesText::new(&style)))?;
        writer.write_event(Event::End(BytesEnd::new("style")))?;

        let (x, y) = (frame.x0.to_string(), frame.y0.to_string());
        let (width, height) = (frame.width().to_string(), frame.height().to_string());
        let mut rect = BytesStart::new("rect");
        rect.push_attribute(("x", x.as_str()));
        rect.push_attribute(("y", y.as_str()));
        rect.push_attribute(("width", width.as_str()));
        rect.push_attribute(("height", height.as_str()));
        rect.push_attribute(("fill", self.background.as_str()));
        writer.write_event(Event::Empty(rect))?;

        for stroke in strokes {
            let d = path_data(stroke.points());
            let stroke_width = stroke.width().to_string();
            let mut path = BytesStart::new("path");
            path.push_attribute(("d", d.as_str()));
            path.push_attribute(("stroke", stroke.color()));
            path.push_attribute(("stroke-width", stroke_width.as_str()));
            path.push_attribute(("fill", "none"));
            path.push_attribute(("stroke-linecap", "round"));
            path.push_attribute(("stroke-linejoin", "round"));
            writer.write_event(Event::Empty(path))?;
        }

        writer.write_event(Event::End(BytesEnd::new("svg")))?;
        String::from_utf8(writer.into_inner())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Parse an SVG document into strokes.
    pub fn import(&self, text: &str) -> Result<Vec<ImportedStroke>, ParseError> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Frame> = Vec::new();
        let mut root_seen = false;
        let mut strokes = Vec::new();

        loop {
            let event = reader
                .read_event()
                .map_err(|e| ParseError::Xml(e.to_string()))?;
            let (element, open) = match event {
                Event::Start(element) => (element, true),
                Event::Empty(element) => (element, false),
                Event::End(_) => {
                    stack.pop();
                    if stack.is_empty() {
                        break;
                    }
                    continue;
                }
                Event::Eof => {
                    if !root_seen {
                        return Err(ParseError::MissingRoot);
                    }
                    if let Some(open) = stack.last() {
                        return Err(ParseError::Xml(format!(
                            "document ended inside <{}>",
                            open.name
                        )));
                    }
                    break;
                }
                _ => continue,
            };

            let name = element_name(&element);
            let frame = match stack.last() {
                Some(parent) => parent.child(&name, &element)?,
                None => {
                    if name != "svg" {
                        return Err(ParseError::NotSvg(name));
                    }
                    root_seen = true;
                    Frame::root().child(&name, &element)?
                }
            };
            if !frame.skipping {
                self.read_shape(&name, &element, &frame.presentation, &mut strokes)?;
            }
            if open {
                stack.push(frame);
            } else if stack.is_empty() {
                break;
            }
        }

        log::debug!("Imported {} strokes", strokes.len());
        Ok(strokes)
    }

    fn read_shape(
        &self,
        name: &str,
        element: &BytesStart<'_>,
        presentation: &Presentation,
        out: &mut Vec<ImportedStroke>,
    ) -> Result<(), ParseError> {
        let attrs = attributes(element)?;
        let polylines = match name {
            "path" => {
                let Some(d) = attrs.get("d") else {
                    log::debug!("Skipping <path> without d");
                    return Ok(());
                };
                let path = BezPath::from_svg(d).map_err(|e| ParseError::PathData {
                    data: d.clone(),
                    reason: e.to_string(),
                })?;
                flatten_subpaths(&path)
            }
            "polyline" | "polygon" => {
                let raw = attrs.get("points").map(String::as_str).unwrap_or("");
                let mut points = parse_points(raw)?;
                if name == "polygon" && points.len() > 1 {
                    points.push(points[0]);
                }
                vec![points]
            }
            "line" => {
                let coord = |key: &'static str| number_attr(&attrs, key).map(|v| v.unwrap_or(0.0));
                vec![vec![
                    Point::new(coord("x1")?, coord("y1")?),
                    Point::new(coord("x2")?, coord("y2")?),
                ]]
            }
            "g" | "svg" | "a" | "switch" => return Ok(()),
            other => {
                log::debug!("Skipping unsupported element <{other}>");
                return Ok(());
            }
        };

        let style = StrokeStyle::new(
            presentation
                .stroke
                .clone()
                .unwrap_or_else(|| self.default_color.clone()),
            presentation.stroke_width.unwrap_or(self.default_width),
        );
        for points in polylines {
            let points = collapse_dot(points);
            if points.is_empty() {
                continue;
            }
            out.push(ImportedStroke {
                points,
                style: style.clone(),
            });
        }
        Ok(())
    }

    /// Frame `bounds` in a viewport of the given size.
    ///
    /// Zooms out just enough to show the padded content, never zooms in past
    /// 1:1, and centers the content. Missing bounds, an empty viewport, or any
    /// non-finite result yields the identity transform. Scale limits are
    /// taken from `limits`.
    pub fn fit_to_view(
        &self,
        bounds: Option<Rect>,
        viewport: Size,
        limits: &ViewportTransform,
    ) -> ViewportTransform {
        let mut fitted = ViewportTransform::with_limits(limits.min_scale, limits.max_scale);
        let Some(bounds) = bounds else {
            return fitted;
        };
        if !(viewport.width > 0.0 && viewport.height > 0.0) {
            log::debug!("Viewport {viewport:?} has no area; keeping identity transform");
            return fitted;
        }

        let content = bounds.inflate(self.fit_padding, self.fit_padding);
        let scale = (viewport.width / content.width())
            .min(viewport.height / content.height())
            .min(1.0);
        let scale = fitted.clamp_scale(scale);
        let center = content.center();
        let candidate = ViewportTransform {
            scale,
            tx: viewport.width / 2.0 - center.x * scale,
            ty: viewport.height / 2.0 - center.y * scale,
            ..fitted
        };
        fitted.apply_or_reset(candidate);
        fitted
    }
}

/// Stroke presentation inherited down the element tree.
#[derive(Debug, Clone, Default, PartialEq)]
struct Presentation {
    stroke: Option<String>,
    stroke_width: Option<f64>,
}

impl Presentation {
    /// Presentation of a child element. Attributes win over `style`
    /// declarations, which win over inherited values.
    fn inherit(&self, attrs: &HashMap<String, String>) -> Self {
        let declarations = attrs
            .get("style")
            .map(|style| parse_style(style))
            .unwrap_or_default();
        let lookup = |key: &str| attrs.get(key).or_else(|| declarations.get(key));

        let stroke = match lookup("stroke").map(|s| s.trim()) {
            Some("none") | Some("") | None => self.stroke.clone(),
            Some(color) => Some(color.to_string()),
        };
        let stroke_width = match lookup("stroke-width") {
            Some(raw) => parse_width(raw).or(self.stroke_width),
            None => self.stroke_width,
        };
        Self {
            stroke,
            stroke_width,
        }
    }
}

#[derive(Debug, Clone)]
struct Frame {
    name: String,
    presentation: Presentation,
    skipping: bool,
}

impl Frame {
    fn root() -> Self {
        Self {
            name: String::new(),
            presentation: Presentation::default(),
            skipping: false,
        }
    }

    fn child(&self, name: &str, element: &BytesStart<'_>) -> Result<Self, ParseError> {
        let skipping = self.skipping || SKIPPED_ELEMENTS.contains(&name);
        let presentation = if skipping {
            self.presentation.clone()
        } else {
            self.presentation.inherit(&attributes(element)?)
        };
        Ok(Self {
            name: name.to_string(),
            presentation,
            skipping,
        })
    }
}

fn element_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).to_ascii_lowercase()
}

fn attributes(element: &BytesStart<'_>) -> Result<HashMap<String, String>, ParseError> {
    let mut map = HashMap::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| ParseError::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| ParseError::Xml(e.to_string()))?
            .into_owned();
        map.insert(key, value);
    }
    Ok(map)
}

/// Parse `a: b; c: d` declarations.
fn parse_style(style: &str) -> HashMap<String, String> {
    style
        .split(';')
        .filter_map(|decl| {
            let (key, value) = decl.split_once(':')?;
            Some((key.trim().to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect()
}

fn parse_width(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    match number.parse::<f64>() {
        Ok(width) if width.is_finite() && width > 0.0 => Some(width),
        _ => {
            log::debug!("Ignoring stroke-width {raw:?}");
            None
        }
    }
}

fn number_attr(
    attrs: &HashMap<String, String>,
    attribute: &'static str,
) -> Result<Option<f64>, ParseError> {
    let Some(raw) = attrs.get(attribute) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed);
    number
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
        .ok_or_else(|| ParseError::InvalidNumber {
            attribute,
            value: raw.clone(),
        })
}

fn parse_points(raw: &str) -> Result<Vec<Point>, ParseError> {
    let invalid = || ParseError::InvalidNumber {
        attribute: "points",
        value: raw.to_string(),
    };
    let numbers = raw
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| token.parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(invalid)?;
    if numbers.len() % 2 != 0 {
        return Err(invalid());
    }
    Ok(numbers
        .chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect())
}

/// Flatten a path into one polyline per subpath.
fn flatten_subpaths(path: &BezPath) -> Vec<Vec<Point>> {
    let mut subpaths = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    kurbo::flatten(path, FLATTEN_TOLERANCE, |el| match el {
        PathEl::MoveTo(p) => {
            if !current.is_empty() {
                subpaths.push(std::mem::take(&mut current));
            }
            current.push(p);
        }
        PathEl::LineTo(p) => current.push(p),
        PathEl::ClosePath => {
            if let Some(&start) = current.first() {
                if current.len() > 1 {
                    current.push(start);
                }
            }
        }
        _ => {}
    });
    if !current.is_empty() {
        subpaths.push(current);
    }
    subpaths
}

/// A zero-length two-point polyline is how a dot is written out.
fn collapse_dot(mut points: Vec<Point>) -> Vec<Point> {
    if points.len() == 2 && points[0] == points[1] {
        points.truncate(1);
    }
    points
}

fn path_data(points: &[Point]) -> String {
    let mut d = String::new();
    for (i, point) in points.iter().enumerate() {
        let command = if i == 0 { 'M' } else { 'L' };
        if i > 0 {
            d.push(' ');
        }
        d.push_str(&format!("{command} {} {}", point.x, point.y));
    }
    if let [only] = points {
        d.push_str(&format!(" L {} {}", only.x, only.y));
    }
    d
}
