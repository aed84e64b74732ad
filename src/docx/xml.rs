use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Result, WorkdocError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum XmlEvent {
    Decl {
        version: String,
        encoding: Option<String>,
        standalone: Option<String>,
    },
    Start {
        name: String,
        attrs: Vec<(String, String)>,
    },
    End {
        name: String,
    },
    Empty {
        name: String,
        attrs: Vec<(String, String)>,
    },
    Text {
        text: String,
    },
    CData {
        text: String,
    },
    Comment {
        text: String,
    },
    PI {
        content: String,
    },
    DocType {
        text: String,
    },
}

impl XmlEvent {
    pub fn is_start(&self, tag: &str) -> bool {
        matches!(self, XmlEvent::Start { name, .. } if name == tag)
    }
}

/// One package part as a flat, lossless event list.
#[derive(Clone, Debug)]
pub struct XmlPart {
    pub name: String,
    pub events: Vec<XmlEvent>,
}

pub fn parse_xml_part(name: &str, xml_bytes: &[u8]) -> Result<XmlPart> {
    let err = |source: quick_xml::Error| WorkdocError::Xml {
        part: name.to_string(),
        source,
    };

    let mut reader = Reader::from_reader(xml_bytes);
    reader.config_mut().trim_text(false);

    let mut events: Vec<XmlEvent> = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let ev = reader.read_event_into(&mut buf).map_err(err)?;
        match ev {
            Event::Eof => break,
            Event::Decl(d) => {
                let version = bytes_to_string(d.version().map_err(err)?);
                let encoding = d
                    .encoding()
                    .transpose()
                    .map_err(|e| err(e.into()))?
                    .map(bytes_to_string);
                let standalone = d
                    .standalone()
                    .transpose()
                    .map_err(|e| err(e.into()))?
                    .map(bytes_to_string);
                events.push(XmlEvent::Decl {
                    version,
                    encoding,
                    standalone,
                });
            }
            Event::Start(s) => {
                events.push(XmlEvent::Start {
                    name: bytes_to_string(s.name().as_ref()),
                    attrs: collect_attrs(&s).map_err(err)?,
                });
            }
            Event::End(e) => {
                events.push(XmlEvent::End {
                    name: bytes_to_string(e.name().as_ref()),
                });
            }
            Event::Empty(s) => {
                events.push(XmlEvent::Empty {
                    name: bytes_to_string(s.name().as_ref()),
                    attrs: collect_attrs(&s).map_err(err)?,
                });
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(|e| err(e.into()))?.into_owned();
                events.push(XmlEvent::Text { text });
            }
            Event::CData(t) => {
                events.push(XmlEvent::CData {
                    text: bytes_to_string(t.into_inner()),
                });
            }
            Event::Comment(t) => {
                events.push(XmlEvent::Comment {
                    text: bytes_to_string(t.into_inner()),
                });
            }
            Event::PI(t) => {
                let target = bytes_to_string(t.target());
                let content = bytes_to_string(t.content());
                events.push(XmlEvent::PI {
                    content: format!("{target}{content}"),
                });
            }
            Event::DocType(t) => {
                events.push(XmlEvent::DocType {
                    text: bytes_to_string(t.into_inner()),
                });
            }
        }
    }

    Ok(XmlPart {
        name: name.to_string(),
        events,
    })
}

fn collect_attrs(s: &BytesStart<'_>) -> std::result::Result<Vec<(String, String)>, quick_xml::Error> {
    let mut attrs: Vec<(String, String)> = Vec::new();
    for a in s.attributes() {
        let a = a.map_err(quick_xml::Error::from)?;
        // Values stay raw (still escaped) so character references such as
        // `&#xD;&#xA;` in VML attributes survive the round trip.
        attrs.push((bytes_to_string(a.key.as_ref()), bytes_to_string(a.value.as_ref())));
    }
    Ok(attrs)
}

fn bytes_to_string(bytes: impl AsRef<[u8]>) -> String {
    String::from_utf8_lossy(bytes.as_ref()).into_owned()
}

pub fn write_xml_part(part: &XmlPart) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::new();

    fn escape_text_into(out: &mut Vec<u8>, text: &str) {
        for ch in text.chars() {
            match ch {
                '&' => out.extend_from_slice(b"&amp;"),
                '<' => out.extend_from_slice(b"&lt;"),
                '>' => out.extend_from_slice(b"&gt;"),
                _ => {
                    let mut buf = [0u8; 4];
                    out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                }
            }
        }
    }

    fn write_start_like(out: &mut Vec<u8>, name: &str, attrs: &[(String, String)], empty: bool) {
        out.push(b'<');
        out.extend_from_slice(name.as_bytes());
        // Already escaped, see collect_attrs.
        for (k, v) in attrs {
            out.push(b' ');
            out.extend_from_slice(k.as_bytes());
            out.extend_from_slice(b"=\"");
            out.extend_from_slice(v.as_bytes());
            out.push(b'"');
        }
        if empty {
            out.extend_from_slice(b"/>");
        } else {
            out.push(b'>');
        }
    }

    for ev in &part.events {
        match ev {
            XmlEvent::Decl {
                version,
                encoding,
                standalone,
            } => {
                out.extend_from_slice(b"<?xml version=\"");
                out.extend_from_slice(version.as_bytes());
                out.push(b'"');
                if let Some(e) = encoding {
                    out.extend_from_slice(b" encoding=\"");
                    out.extend_from_slice(e.as_bytes());
                    out.push(b'"');
                }
                if let Some(s) = standalone {
                    out.extend_from_slice(b" standalone=\"");
                    out.extend_from_slice(s.as_bytes());
                    out.push(b'"');
                }
                out.extend_from_slice(b"?>");
            }
            XmlEvent::Start { name, attrs } => write_start_like(&mut out, name, attrs, false),
            XmlEvent::End { name } => {
                out.extend_from_slice(b"</");
                out.extend_from_slice(name.as_bytes());
                out.push(b'>');
            }
            XmlEvent::Empty { name, attrs } => write_start_like(&mut out, name, attrs, true),
            XmlEvent::Text { text } => escape_text_into(&mut out, text),
            XmlEvent::CData { text } => {
                out.extend_from_slice(b"<![CDATA[");
                out.extend_from_slice(text.as_bytes());
                out.extend_from_slice(b"]]>");
            }
            XmlEvent::Comment { text } => {
                out.extend_from_slice(b"<!--");
                out.extend_from_slice(text.as_bytes());
                out.extend_from_slice(b"-->");
            }
            XmlEvent::PI { content } => {
                out.extend_from_slice(b"<?");
                out.extend_from_slice(content.as_bytes());
                out.extend_from_slice(b"?>");
            }
            XmlEvent::DocType { text } => {
                out.extend_from_slice(b"<!DOCTYPE");
                out.extend_from_slice(text.as_bytes());
                out.push(b'>');
            }
        }
    }

    out
}

/// Set or add an attribute on a start-like event. Other events are ignored.
pub fn set_attr_value(ev: &mut XmlEvent, key: &str, value: &str) {
    if let XmlEvent::Start { attrs, .. } | XmlEvent::Empty { attrs, .. } = ev {
        match attrs.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => attrs.push((key.to_string(), value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_preserves_attr_entity_refs() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?><root xmlns:o="urn:test" o:gfxdata="A&#xD;&#xA;B"/>"#;
        let part = parse_xml_part("test.xml", xml).unwrap();
        let s = String::from_utf8(write_xml_part(&part)).unwrap();

        assert!(s.contains(r#"o:gfxdata="A&#xD;&#xA;B""#));
        assert!(!s.contains(r#"o:gfxdata="A&amp;#xD;"#));
    }

    #[test]
    fn text_is_unescaped_then_reescaped() {
        let xml = br#"<w:t xml:space="preserve">a &amp; b &lt;c&gt;</w:t>"#;
        let part = parse_xml_part("p.xml", xml).unwrap();
        assert_eq!(
            part.events[1],
            XmlEvent::Text {
                text: "a & b <c>".to_string()
            }
        );
        assert_eq!(write_xml_part(&part), xml.to_vec());
    }

    #[test]
    fn declaration_round_trips() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><a/>"#;
        let part = parse_xml_part("d.xml", xml).unwrap();
        assert_eq!(write_xml_part(&part), xml.to_vec());
    }

    #[test]
    fn malformed_xml_is_reported_with_part_name() {
        let err = parse_xml_part("word/document.xml", b"<a><b></a>").unwrap_err();
        match err {
            WorkdocError::Xml { part, .. } => assert_eq!(part, "word/document.xml"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn set_attr_replaces_or_appends() {
        let mut ev = XmlEvent::Start {
            name: "w:t".to_string(),
            attrs: vec![],
        };
        set_attr_value(&mut ev, "xml:space", "preserve");
        set_attr_value(&mut ev, "xml:space", "preserve");
        assert_eq!(
            ev,
            XmlEvent::Start {
                name: "w:t".to_string(),
                attrs: vec![("xml:space".to_string(), "preserve".to_string())],
            }
        );
    }
}
