use serde::{Deserialize, Serialize};

pub(crate) const NEW_CHECKLIST_ITEM: &str = "New checklist item";

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ChecklistItem {
    pub text: String,
    #[serde(default)]
    pub checked: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Text { text: String },
    Checklist { items: Vec<ChecklistItem> },
    Image { src: String },
}

/// Structured note content.
///
/// Persisted as a JSON array of blocks. The editor works on a line-based
/// markup (see [`NoteBody::parse_markup`]).
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct NoteBody {
    pub blocks: Vec<Block>,
}

impl NoteBody {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn text(s: &str) -> Self {
        Self::new(vec![Block::Text {
            text: s.to_string(),
        }])
    }

    /// True iff there is at least one checklist item.
    pub fn has_checklist(&self) -> bool {
        self.blocks
            .iter()
            .any(|b| matches!(b, Block::Checklist { items } if !items.is_empty()))
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|b| match b {
            Block::Text { text } => text.trim().is_empty(),
            Block::Checklist { items } => items.is_empty(),
            Block::Image { src } => src.trim().is_empty(),
        })
    }

    /// Text content with all structure removed. Images contribute nothing.
    pub fn plain_text(&self) -> String {
        let mut lines: Vec<&str> = Vec::new();
        for b in &self.blocks {
            match b {
                Block::Text { text } => lines.push(text),
                Block::Checklist { items } => lines.extend(items.iter().map(|i| i.text.as_str())),
                Block::Image { .. } => {}
            }
        }
        lines.join("\n")
    }

    pub fn push_checklist_item(&mut self, text: &str) {
        let item = ChecklistItem {
            text: text.to_string(),
            checked: false,
        };
        match self.blocks.last_mut() {
            Some(Block::Checklist { items }) => items.push(item),
            _ => self.blocks.push(Block::Checklist { items: vec![item] }),
        }
    }

    /// Line markup:
    /// - `- [ ] text` / `- [x] text` is a checklist item; consecutive items share a checklist.
    /// - `![](src)` is an image.
    /// - anything else is text; consecutive text lines share a block.
    pub fn parse_markup(input: &str) -> Self {
        let mut blocks: Vec<Block> = Vec::new();

        for line in input.lines() {
            if let Some(item) = parse_checklist_line(line) {
                match blocks.last_mut() {
                    Some(Block::Checklist { items }) => items.push(item),
                    _ => blocks.push(Block::Checklist { items: vec![item] }),
                }
                continue;
            }

            if let Some(src) = parse_image_line(line) {
                blocks.push(Block::Image { src });
                continue;
            }

            match blocks.last_mut() {
                Some(Block::Text { text }) => {
                    text.push('\n');
                    text.push_str(line);
                }
                _ => blocks.push(Block::Text {
                    text: line.to_string(),
                }),
            }
        }

        Self { blocks }
    }

    pub fn to_markup(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        for b in &self.blocks {
            match b {
                Block::Text { text } => lines.push(text.clone()),
                Block::Checklist { items } => {
                    for i in items {
                        let mark = if i.checked { 'x' } else { ' ' };
                        lines.push(format!("- [{mark}] {}", i.text));
                    }
                }
                Block::Image { src } => lines.push(format!("![]({src})")),
            }
        }
        lines.join("\n")
    }
}

impl NoteBody {
    /// Converts the HTML older versions stored in `content`.
    ///
    /// Checklist `<li class="checklist-item [checked]">` elements become
    /// checklist items and `<img src>` becomes an image. Block tags only
    /// contribute line breaks. Source whitespace is collapsed as a browser
    /// would render it.
    pub fn from_legacy_html(html: &str) -> Self {
        let mut out = String::new();
        let mut rest = html;

        while let Some(start) = rest.find('<') {
            out.push_str(&decode_entities(&rest[..start]));
            let Some(len) = rest[start..].find('>') else {
                out.push_str(&decode_entities(&rest[start..]));
                rest = "";
                break;
            };
            let tag = &rest[start + 1..start + len];
            rest = &rest[start + len + 1..];

            let closing = tag.starts_with('/');
            let name = tag
                .trim_start_matches('/')
                .split(|c: char| c.is_whitespace() || c == '/')
                .next()
                .unwrap_or_default()
                .to_ascii_lowercase();

            match (name.as_str(), closing) {
                ("br", _) => out.push('\n'),
                ("div" | "p" | "ul" | "ol", _) | ("li", true) => out.push('\n'),
                ("li", false) => {
                    out.push('\n');
                    let classes = html_attr(tag, "class").unwrap_or_default();
                    if classes.split_whitespace().any(|c| c == "checklist-item") {
                        let checked = classes.split_whitespace().any(|c| c == "checked");
                        out.push_str(if checked { "- [x] " } else { "- [ ] " });
                    }
                }
                ("img", false) => {
                    if let Some(src) = html_attr(tag, "src") {
                        out.push_str(&format!("\n![]({src})\n"));
                    }
                }
                _ => {}
            }
        }
        out.push_str(&decode_entities(rest));

        let lines: Vec<String> = out
            .lines()
            .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|l| !l.is_empty())
            .collect();
        Self::parse_markup(&lines.join("\n"))
    }
}

fn html_attr<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!("{name}=\"");
    let start = tag.find(&needle)? + needle.len();
    let len = tag[start..].find('"')?;
    Some(&tag[start..start + len])
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn parse_checklist_line(line: &str) -> Option<ChecklistItem> {
    let rest = line.trim_start().strip_prefix("- [")?;
    let mut chars = rest.chars();
    let mark = chars.next()?;
    let checked = match mark {
        ' ' => false,
        'x' | 'X' => true,
        _ => return None,
    };
    let rest = chars.as_str().strip_prefix(']')?;
    let text = rest.strip_prefix(' ').unwrap_or(rest);
    Some(ChecklistItem {
        text: text.to_string(),
        checked,
    })
}

fn parse_image_line(line: &str) -> Option<String> {
    let src = line.trim().strip_prefix("![](")?.strip_suffix(')')?;
    if src.trim().is_empty() {
        return None;
    }
    Some(src.to_string())
}
