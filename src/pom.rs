use std::io::Write;

use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::license::catalog::LicenseCatalog;
use crate::models::Coordinates;

const POM_NAMESPACE: &str = "http://maven.apache.org/POM/4.0.0";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
const POM_SCHEMA_LOCATION: &str =
    "http://maven.apache.org/POM/4.0.0 https://maven.apache.org/xsd/maven-4.0.0.xsd";

/// Property holding the combined SPDX expression of all bundled licenses.
pub const SPDX_EXPRESSION_PROPERTY: &str = "spdx.license.expression";

/// Start an indented XML document with the standard declaration.
pub(crate) fn xml_writer() -> Result<Writer<Vec<u8>>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    Ok(writer)
}

/// Write `<name>text</name>`; the text is escaped.
pub(crate) fn text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

pub(crate) fn finish(writer: Writer<Vec<u8>>) -> Result<String> {
    let mut xml = String::from_utf8(writer.into_inner())?;
    xml.push('\n');
    Ok(xml)
}

/// Render the POM for the published archive.
///
/// Each catalog entry becomes a `<license>` element; the combined `AND`
/// expression is recorded as a property so consumers do not have to rebuild
/// it from the list.
pub fn render_pom(coords: &Coordinates, catalog: &LicenseCatalog, description: &str) -> Result<String> {
    let mut w = xml_writer()?;

    let project = BytesStart::new("project").with_attributes([
        ("xmlns", POM_NAMESPACE),
        ("xmlns:xsi", XSI_NAMESPACE),
        ("xsi:schemaLocation", POM_SCHEMA_LOCATION),
    ]);
    w.write_event(Event::Start(project))?;

    text_element(&mut w, "modelVersion", "4.0.0")?;
    text_element(&mut w, "groupId", &coords.group_id)?;
    text_element(&mut w, "artifactId", &coords.artifact_id)?;
    text_element(&mut w, "version", &coords.version)?;
    text_element(&mut w, "packaging", "zip")?;
    text_element(&mut w, "description", description)?;

    if catalog.is_empty() {
        w.write_event(Event::Empty(BytesStart::new("licenses")))?;
    } else {
        w.write_event(Event::Start(BytesStart::new("licenses")))?;
        for (id, url) in catalog.iter() {
            w.write_event(Event::Start(BytesStart::new("license")))?;
            text_element(&mut w, "name", id)?;
            if let Some(url) = url {
                text_element(&mut w, "url", url)?;
            }
            text_element(&mut w, "distribution", "repo")?;
            w.write_event(Event::End(BytesEnd::new("license")))?;
        }
        w.write_event(Event::End(BytesEnd::new("licenses")))?;

        w.write_event(Event::Start(BytesStart::new("properties")))?;
        text_element(&mut w, SPDX_EXPRESSION_PROPERTY, &catalog.expression())?;
        w.write_event(Event::End(BytesEnd::new("properties")))?;
    }

    w.write_event(Event::End(BytesEnd::new("project")))?;
    finish(w)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords() -> Coordinates {
        Coordinates {
            group_id: "com.jetbrains.mps".to_string(),
            artifact_id: "mps-prerelease".to_string(),
            version: "2024.3-RC1".to_string(),
        }
    }

    #[test]
    fn test_pom_lists_every_license() {
        let catalog = LicenseCatalog::parse_lines(
            "Apache-2.0|https://www.apache.org/licenses/LICENSE-2.0\n\
             GPL-2.0-only WITH Classpath-exception-2.0|\n\
             MIT|https://opensource.org/licenses/MIT\n",
        )
        .unwrap();
        let pom = render_pom(&coords(), &catalog, "MPS & friends").unwrap();

        assert!(pom.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(pom.contains("<groupId>com.jetbrains.mps</groupId>"));
        assert!(pom.contains("<version>2024.3-RC1</version>"));
        assert!(pom.contains("<description>MPS &amp; friends</description>"));
        assert_eq!(pom.matches("<license>").count(), 3);
        assert!(pom.contains("<name>GPL-2.0-only WITH Classpath-exception-2.0</name>"));
        assert!(pom.contains("<url>https://opensource.org/licenses/MIT</url>"));
        assert!(pom.contains(
            "<spdx.license.expression>Apache-2.0 AND GPL-2.0-only WITH Classpath-exception-2.0 AND MIT</spdx.license.expression>"
        ));

        let apache = pom.find("<name>Apache-2.0</name>").unwrap();
        let mit = pom.find("<name>MIT</name>").unwrap();
        assert!(apache < mit);
    }

    #[test]
    fn test_pom_without_licenses() {
        let pom = render_pom(&coords(), &LicenseCatalog::default(), "d").unwrap();
        assert!(pom.contains("<licenses/>"));
        assert!(!pom.contains("<properties>"));
    }
}
