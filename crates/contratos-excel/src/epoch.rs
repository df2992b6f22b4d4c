/// Detection of the workbook date epoch.
///
/// An `.xlsx` file records the Mac 1904 date system as
/// `<workbookPr date1904="1"/>` in `xl/workbook.xml`. Numeric cells that are
/// not formatted as dates carry raw serials, so the extractor needs this flag
/// to read them.
use std::io::{Read, Seek};

use tracing::debug;

const WORKBOOK_PART: &str = "xl/workbook.xml";

/// Returns `true` when the `.xlsx` archive declares the 1904 date system.
///
/// Unreadable archives and missing parts count as the 1900 system.
pub fn workbook_uses_1904<R: Read + Seek>(reader: R) -> bool {
    let Ok(mut archive) = zip::ZipArchive::new(reader) else {
        return false;
    };
    let Ok(mut part) = archive.by_name(WORKBOOK_PART) else {
        debug!("workbook part missing; assuming 1900 date system");
        return false;
    };
    let mut xml = String::new();
    if part.read_to_string(&mut xml).is_err() {
        return false;
    }
    declares_1904(&xml)
}

/// Looks for a truthy `date1904` attribute in workbook XML.
fn declares_1904(xml: &str) -> bool {
    let Some(pos) = xml.find("date1904=") else {
        return false;
    };
    let value = xml[pos + "date1904=".len()..]
        .trim_start_matches(['"', '\''])
        .chars()
        .next();
    matches!(value, Some('1' | 't' | 'T'))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use std::io::{Cursor, Write as _};

    use super::*;

    fn archive_with_workbook(xml: &str) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut buf);
            zip.start_file(WORKBOOK_PART, zip::write::SimpleFileOptions::default())
                .expect("start part");
            zip.write_all(xml.as_bytes()).expect("write part");
            zip.finish().expect("finish archive");
        }
        buf.into_inner()
    }

    #[test]
    fn attribute_values() {
        assert!(declares_1904(r#"<workbookPr date1904="1" defaultThemeVersion="1"/>"#));
        assert!(declares_1904(r#"<workbookPr date1904='true'/>"#));
        assert!(!declares_1904(r#"<workbookPr date1904="0"/>"#));
        assert!(!declares_1904(r#"<workbookPr defaultThemeVersion="164011"/>"#));
    }

    #[test]
    fn reads_flag_from_archive() {
        let mac = archive_with_workbook(r#"<workbook><workbookPr date1904="1"/></workbook>"#);
        assert!(workbook_uses_1904(Cursor::new(mac)));
        let win = archive_with_workbook("<workbook><workbookPr/></workbook>");
        assert!(!workbook_uses_1904(Cursor::new(win)));
    }

    #[test]
    fn non_archives_are_1900() {
        assert!(!workbook_uses_1904(Cursor::new(b"Numero;Valor\n1;2\n".to_vec())));
    }
}
