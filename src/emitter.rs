// The textual output stage. Pure: a report plus options in, ordered stdout
// lines out, so the CLI stays a thin shell and the formats stay testable.

use crate::core_modules::rect::Rect;
use crate::pipeline::DiffReport;

/// How rectangles are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeometryFormat {
    /// `X,Y+WxH`
    #[default]
    Plain,
    /// `WxH+X+Y`, ImageMagick's geometry order.
    ImageMagick,
}

pub fn format_rect(rect: &Rect, format: GeometryFormat) -> String {
    match format {
        GeometryFormat::Plain => {
            format!("{},{}+{}x{}", rect.x, rect.y, rect.width, rect.height)
        }
        GeometryFormat::ImageMagick => {
            format!("{}x{}+{}+{}", rect.width, rect.height, rect.x, rect.y)
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EmitOptions {
    pub format: GeometryFormat,
    /// Emit only in-place matches, and nothing else.
    pub same_only: bool,
}

/// Renders a report as output lines: one `<old-rect> <new-rect>` line per
/// moved match followed by one line per unmatched rect, or, under
/// `same_only`, one line per in-place match alone. With no matches at all
/// the unmatched cover is the whole image, so the default mode degenerates
/// to a single whole-image line.
pub fn emit_report(report: &DiffReport, options: EmitOptions) -> Vec<String> {
    let mut lines = Vec::new();
    for pair in &report.matches {
        if pair.in_place() {
            if options.same_only {
                lines.push(format_rect(&pair.new_chunk.rect(), options.format));
            }
        } else if !options.same_only {
            lines.push(format!(
                "{} {}",
                format_rect(&pair.old_chunk.rect(), options.format),
                format_rect(&pair.new_chunk.rect(), options.format)
            ));
        }
    }
    if !options.same_only {
        for rect in &report.unmatched {
            lines.push(format_rect(rect, options.format));
        }
    }
    lines
}
