//! LimeSoda environment configuration export
//!
//! Produces an environment configuration file that replays every setting as
//! an n98-magerun `config:set` command:
//!
//! ```xml
//! <config>
//!   <global>
//!     <limesoda>
//!       <environments>
//!         <default>
//!           <commands>
//!             <cfg_1><![CDATA[config:set --scope="default" --scope-id="0" "general/store_information/name" "Acme"]]></cfg_1>
//! ```
//!
//! Values are folded onto one line: newlines become a literal `\n` and double
//! quotes are backslash-escaped. The command list is the same for both shapes.

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::xml::xml_err;
use super::FormatEncoder;
use crate::error::ExportResult;
use crate::models::{DocumentEntry, ShapedDocument};

const WRAPPERS: [&str; 6] = [
    "config",
    "global",
    "limesoda",
    "environments",
    "default",
    "commands",
];

/// LimeSoda environment XML encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct LimeSodaXmlEncoder;

impl FormatEncoder for LimeSodaXmlEncoder {
    fn name(&self) -> &'static str {
        "limesodaxml"
    }

    fn file_extension(&self) -> &'static str {
        "xml"
    }

    fn encode(&self, document: &ShapedDocument) -> ExportResult<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_err)?;

        for wrapper in WRAPPERS {
            writer
                .write_event(Event::Start(BytesStart::new(wrapper)))
                .map_err(xml_err)?;
        }

        for (index, entry) in document.entries().iter().enumerate() {
            let tag = format!("cfg_{}", index + 1);
            let command = config_set_command(entry);

            writer
                .write_event(Event::Start(BytesStart::new(tag.as_str())))
                .map_err(xml_err)?;
            // A CDATA section cannot contain its own terminator
            if command.contains("]]>") {
                writer
                    .write_event(Event::Text(BytesText::new(&command)))
                    .map_err(xml_err)?;
            } else {
                writer
                    .write_event(Event::CData(BytesCData::new(command.as_str())))
                    .map_err(xml_err)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(tag.as_str())))
                .map_err(xml_err)?;
        }

        for wrapper in WRAPPERS.iter().rev() {
            writer
                .write_event(Event::End(BytesEnd::new(*wrapper)))
                .map_err(xml_err)?;
        }

        let mut bytes = writer.into_inner();
        bytes.push(b'\n');
        Ok(bytes)
    }
}

/// Build the `config:set` command for one setting
///
/// NULL values are written as an empty string.
pub fn config_set_command(entry: &DocumentEntry<'_>) -> String {
    format!(
        "config:set --scope=\"{}\" --scope-id=\"{}\" \"{}\" \"{}\"",
        single_line(entry.scope),
        single_line(entry.scope_id),
        single_line(&entry.path),
        single_line(entry.value.unwrap_or_default())
    )
}

/// Fold a value onto one line and escape double quotes
fn single_line(value: &str) -> String {
    value
        .replace("\r\n", "\\n")
        .replace('\n', "\\n")
        .replace('"', "\\\"")
}
