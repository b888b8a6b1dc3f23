//! Plan report rendering
//!
//! Uses the PDF base-14 Helvetica faces with WinAnsiEncoding, so no font
//! files are embedded. Text outside Latin-1 is replaced with `?`.

use chrono::Local;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::error::ReportError;
use crate::planner::TaskItem;

pub const DEFAULT_REPORT_TITLE: &str = "Project Plan Report";

// A4 in points
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;
const TEXT_WIDTH: i64 = PAGE_WIDTH - 2 * MARGIN;

#[derive(Debug, Clone, Copy)]
enum Face {
    Regular,
    Bold,
    Italic,
}

impl Face {
    fn resource(self) -> &'static str {
        match self {
            Face::Regular => "F1",
            Face::Bold => "F2",
            Face::Italic => "F3",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Style {
    face: Face,
    size: i64,
    leading: i64,
}

const TITLE: Style = Style {
    face: Face::Bold,
    size: 16,
    leading: 24,
};
const HEADING: Style = Style {
    face: Face::Bold,
    size: 12,
    leading: 20,
};
const BODY: Style = Style {
    face: Face::Regular,
    size: 11,
    leading: 16,
};
const NOTE: Style = Style {
    face: Face::Italic,
    size: 10,
    leading: 15,
};

/// Accumulates content-stream operations page by page
struct Layout {
    finished: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    y: i64,
}

impl Layout {
    fn new() -> Self {
        Self {
            finished: Vec::new(),
            current: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn ensure_room(&mut self, leading: i64) {
        if self.y - leading < MARGIN {
            self.finished.push(std::mem::take(&mut self.current));
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn into_pages(mut self) -> Vec<Vec<Operation>> {
        self.finished.push(self.current);
        self.finished
    }

    fn place(&mut self, text: &str, style: Style, x: i64) {
        self.ensure_room(style.leading);
        self.y -= style.leading;
        let ops = &mut self.current;
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![style.face.resource().into(), style.size.into()],
        ));
        ops.push(Operation::new("Td", vec![x.into(), self.y.into()]));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(latin1(text), StringFormat::Literal)],
        ));
        ops.push(Operation::new("ET", vec![]));
    }

    /// Word-wrapped paragraph at the left margin
    fn paragraph(&mut self, text: &str, style: Style) {
        for line in wrap(text, style.size, TEXT_WIDTH) {
            self.place(&line, style, MARGIN);
        }
    }

    fn centered(&mut self, text: &str, style: Style) {
        for line in wrap(text, style.size, TEXT_WIDTH) {
            let width = text_width(&line, style.size);
            let x = MARGIN + ((TEXT_WIDTH - width) / 2).max(0);
            self.place(&line, style, x);
        }
    }

    fn gap(&mut self, points: i64) {
        self.y -= points;
    }
}

/// Render tasks, in order, into a PDF document
pub fn render_plan_pdf(tasks: &[TaskItem], title: &str) -> Result<Vec<u8>, ReportError> {
    let mut layout = Layout::new();

    layout.centered(title, TITLE);
    layout.centered(
        &format!("Generated on {}", Local::now().format("%Y-%m-%d %H:%M")),
        NOTE,
    );
    layout.gap(12);

    for (idx, task) in tasks.iter().enumerate() {
        layout.paragraph(&format!("{}. {} - {}", idx + 1, task.step, task.task), HEADING);
        layout.paragraph(&format!("Estimated Time: {}", task.estimated_time), NOTE);
        layout.paragraph(&format!("Description: {}", task.description), BODY);
        if !task.technologies.is_empty() {
            layout.paragraph(
                &format!("Technologies: {}", task.technologies.join(", ")),
                BODY,
            );
        }
        if !task.deliverables.is_empty() {
            layout.paragraph(
                &format!("Deliverables: {}", task.deliverables.join(", ")),
                BODY,
            );
        }
        if let Some(link) = &task.jira_link {
            layout.paragraph(&format!("Jira: {}", link), BODY);
        }
        if let Some(link) = &task.github_link {
            layout.paragraph(&format!("GitHub: {}", link), BODY);
        }
        layout.gap(8);
    }

    assemble(layout.into_pages())
}

fn assemble(pages: Vec<Vec<Operation>>) -> Result<Vec<u8>, ReportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font = |doc: &mut Document, base: &str| -> ObjectId {
        doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => base,
            "Encoding" => "WinAnsiEncoding",
        })
    };
    let regular = font(&mut doc, "Helvetica");
    let bold = font(&mut doc, "Helvetica-Bold");
    let italic = font(&mut doc, "Helvetica-Oblique");

    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
            "F3" => italic,
        },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::from(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

/// WinAnsi bytes for printable Latin-1; C1 controls and wider chars become `?`
fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u8::try_from(u32::from(c)) {
            Ok(byte) if !(0x80..=0x9F).contains(&byte) => byte,
            _ => b'?',
        })
        .collect()
}

/// Approximate Helvetica advance widths, in thousandths of an em
fn char_width(c: char) -> i64 {
    match c {
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' => 222,
        ' ' | 'f' | 't' | 'I' | '/' | '(' | ')' | '[' | ']' | '-' => 278,
        'r' => 333,
        'm' | 'M' | 'W' | '@' => 833,
        'w' => 722,
        'A'..='Z' => 667,
        _ => 556,
    }
}

fn text_width(text: &str, size: i64) -> i64 {
    text.chars().map(char_width).sum::<i64>() * size / 1000
}

/// Greedy word wrap; words wider than a line are split by character
fn wrap(text: &str, size: i64, max_width: i64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if text_width(&candidate, size) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        for c in word.chars() {
            current.push(c);
            if text_width(&current, size) > max_width {
                current.pop();
                lines.push(std::mem::take(&mut current));
                current.push(c);
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
