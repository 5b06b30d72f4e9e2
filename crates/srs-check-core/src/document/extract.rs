use std::{
    collections::HashMap,
    fs::File,
    io::{Read, Seek},
    path::Path,
};

use roxmltree::{Document, Node};
use tracing::{debug, instrument};
use zip::{result::ZipError, ZipArchive};

use super::ParagraphUnit;
use crate::error::ExtractError;

const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";

/// Source of paragraph streams. Implementations drop blank paragraphs and trim
/// surrounding whitespace.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<Vec<ParagraphUnit>, ExtractError>;
}

/// Line-oriented UTF-8 text: every non-blank line is a paragraph.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn paragraphs_from_str(text: &str) -> Vec<ParagraphUnit> {
        text.trim_start_matches('\u{feff}')
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ParagraphUnit::plain)
            .collect()
    }
}

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<Vec<ParagraphUnit>, ExtractError> {
        let bytes = std::fs::read(path).map_err(|source| ExtractError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8(bytes).map_err(|_| ExtractError::InvalidEncoding {
            path: path.to_path_buf(),
        })?;
        Ok(Self::paragraphs_from_str(&text))
    }
}

/// Word `.docx` documents. Paragraph style ids are resolved to their display
/// names (`Heading 1`, `toc 2`, ...) through the styles part.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxExtractor;

impl DocxExtractor {
    pub fn paragraphs_from_reader<R: Read + Seek>(
        reader: R,
        path: &Path,
    ) -> Result<Vec<ParagraphUnit>, ExtractError> {
        let malformed = |message: String| ExtractError::MalformedContainer {
            path: path.to_path_buf(),
            message,
        };

        let mut archive = ZipArchive::new(reader).map_err(|err| malformed(err.to_string()))?;
        let document_xml = read_part(&mut archive, DOCUMENT_PART)
            .map_err(malformed)?
            .ok_or_else(|| malformed(format!("missing {DOCUMENT_PART}")))?;
        let styles = match read_part(&mut archive, STYLES_PART).map_err(malformed)? {
            Some(styles_xml) => style_names(&styles_xml).map_err(malformed)?,
            None => HashMap::new(),
        };

        let document = Document::parse(&document_xml)
            .map_err(|err| malformed(format!("{DOCUMENT_PART}: {err}")))?;
        let paragraphs = document
            .descendants()
            .filter(|node| node.has_tag_name((WORD_NS, "p")))
            .filter_map(|node| {
                let text = paragraph_text(node);
                let text = text.trim();
                if text.is_empty() {
                    return None;
                }
                let style_hint = paragraph_style(node)
                    .map(|id| styles.get(id).cloned().unwrap_or_else(|| id.to_string()));
                Some(ParagraphUnit {
                    text: text.to_string(),
                    style_hint,
                })
            })
            .collect();
        Ok(paragraphs)
    }
}

impl TextExtractor for DocxExtractor {
    fn extract(&self, path: &Path) -> Result<Vec<ParagraphUnit>, ExtractError> {
        let file = File::open(path).map_err(|source| ExtractError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::paragraphs_from_reader(file, path)
    }
}

/// Pick an extractor by file extension and run it.
#[instrument(name = "extract_paragraphs", skip(path), fields(path = %path.display()))]
pub fn extract_paragraphs(path: &Path) -> Result<Vec<ParagraphUnit>, ExtractError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let paragraphs = match extension.as_str() {
        "txt" | "md" => PlainTextExtractor.extract(path)?,
        "docx" => DocxExtractor.extract(path)?,
        _ => {
            return Err(ExtractError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            })
        }
    };
    debug!(paragraphs = paragraphs.len(), "document extracted");
    Ok(paragraphs)
}

fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>, String> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(err) => return Err(format!("{name}: {err}")),
    };
    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|err| format!("{name}: {err}"))?;
    Ok(Some(xml))
}

fn style_names(styles_xml: &str) -> Result<HashMap<String, String>, String> {
    let styles = Document::parse(styles_xml).map_err(|err| format!("{STYLES_PART}: {err}"))?;
    let names = styles
        .descendants()
        .filter(|node| node.has_tag_name((WORD_NS, "style")))
        .filter_map(|style| {
            let id = style.attribute((WORD_NS, "styleId"))?;
            let name = style
                .children()
                .find(|child| child.has_tag_name((WORD_NS, "name")))
                .and_then(|child| child.attribute((WORD_NS, "val")))?;
            Some((id.to_string(), name.to_string()))
        })
        .collect();
    Ok(names)
}

fn paragraph_style<'a>(paragraph: Node<'a, '_>) -> Option<&'a str> {
    paragraph
        .children()
        .find(|child| child.has_tag_name((WORD_NS, "pPr")))?
        .children()
        .find(|child| child.has_tag_name((WORD_NS, "pStyle")))?
        .attribute((WORD_NS, "val"))
}

fn paragraph_text(paragraph: Node<'_, '_>) -> String {
    let mut text = String::new();
    for node in paragraph.descendants() {
        if node.has_tag_name((WORD_NS, "t")) {
            text.push_str(node.text().unwrap_or_default());
        } else if node.has_tag_name((WORD_NS, "tab")) {
            text.push('\t');
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    fn build_docx(document_xml: &str, styles_xml: Option<&str>) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer.start_file(DOCUMENT_PART, options).unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        if let Some(styles) = styles_xml {
            writer.start_file(STYLES_PART, options).unwrap();
            writer.write_all(styles.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    const DOCUMENT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:pPr><w:pStyle w:val="1"/></w:pPr><w:r><w:t>1</w:t></w:r><w:r><w:tab/><w:t>Scope</w:t></w:r></w:p>
    <w:p><w:r><w:t xml:space="preserve">  Body </w:t></w:r><w:r><w:t>text.</w:t></w:r></w:p>
    <w:p><w:r><w:t>   </w:t></w:r></w:p>
    <w:p><w:pPr><w:pStyle w:val="TOC2"/></w:pPr><w:r><w:t>Identification</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:styleId="1"><w:name w:val="heading 1"/></w:style>
</w:styles>"#;

    #[test]
    fn plain_text_drops_blank_lines_and_trims() {
        let paragraphs = PlainTextExtractor::paragraphs_from_str("\u{feff}1 Scope\n\n   body  \n");
        assert_eq!(
            paragraphs,
            vec![ParagraphUnit::plain("1 Scope"), ParagraphUnit::plain("body")]
        );
    }

    #[test]
    fn docx_paragraphs_resolve_style_names() {
        let bytes = build_docx(DOCUMENT, Some(STYLES));
        let paragraphs =
            DocxExtractor::paragraphs_from_reader(Cursor::new(bytes), Path::new("t.docx"))
                .expect("docx should parse");
        assert_eq!(paragraphs.len(), 3);
        assert_eq!(paragraphs[0].text, "1\tScope");
        assert_eq!(paragraphs[0].style_hint.as_deref(), Some("heading 1"));
        assert_eq!(paragraphs[1].text, "Body text.");
        assert!(paragraphs[1].style_hint.is_none());
        // unknown style ids fall back to the raw id
        assert_eq!(paragraphs[2].style_hint.as_deref(), Some("TOC2"));
    }

    #[test]
    fn docx_without_document_part_is_malformed() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/other.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<x/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();
        let err = DocxExtractor::paragraphs_from_reader(Cursor::new(bytes), Path::new("t.docx"))
            .expect_err("missing document part");
        assert!(matches!(err, ExtractError::MalformedContainer { .. }));
    }

    #[test]
    fn non_zip_bytes_are_malformed() {
        let err = DocxExtractor::paragraphs_from_reader(
            Cursor::new(b"not a zip".to_vec()),
            Path::new("t.docx"),
        )
        .expect_err("garbage should fail");
        assert!(matches!(err, ExtractError::MalformedContainer { .. }));
    }

    #[test]
    fn extract_rejects_unknown_extension() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("spec.pdf");
        std::fs::write(&path, b"%PDF").unwrap();
        let err = extract_paragraphs(&path).expect_err("pdf unsupported");
        assert!(matches!(err, ExtractError::UnsupportedFormat { ref extension, .. } if extension == "pdf"));
    }

    #[test]
    fn extract_missing_file_is_unreadable() {
        let temp = tempfile::tempdir().unwrap();
        let err = extract_paragraphs(&temp.path().join("absent.txt")).expect_err("missing");
        assert!(matches!(err, ExtractError::Unreadable { .. }));
    }

    #[test]
    fn extract_reads_text_files() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("spec.TXT");
        std::fs::write(&path, "1 Scope\nSome body text.\n").unwrap();
        let paragraphs = extract_paragraphs(&path).unwrap();
        assert_eq!(paragraphs.len(), 2);
    }
}
