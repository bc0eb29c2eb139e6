//! Minimal `manifest.safe` reader: only what grouping needs to know about a scene.
use std::io::BufRead;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{Error, Result};
use crate::types::Polarization;

/// Polarizations listed in `transmitterReceiverPolarisation` elements, in
/// document order. Unknown tags (e.g. HH/HV) are skipped.
pub fn read_manifest_polarizations(path: &Path) -> Result<Vec<Polarization>> {
    let reader = Reader::from_file(path).map_err(|e| Error::manifest(path, e))?;
    parse_polarizations(reader).map_err(|e| Error::manifest(path, e))
}

fn parse_polarizations<R: BufRead>(
    mut reader: Reader<R>,
) -> std::result::Result<Vec<Polarization>, quick_xml::Error> {
    reader.trim_text(true);
    let mut buf = Vec::new();
    let mut in_polarisation = false;
    let mut pols = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                in_polarisation =
                    e.local_name().as_ref() == b"transmitterReceiverPolarisation";
            }
            Event::End(_) => in_polarisation = false,
            Event::Text(e) if in_polarisation => {
                let txt = e.unescape()?;
                if let Some(pol) = Polarization::from_tag(txt.trim()) {
                    if !pols.contains(&pol) {
                        pols.push(pol);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(pols)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xfdu:XFDU xmlns:xfdu="urn:ccsds:schema:xfdu:1" xmlns:s1sarl1="http://www.esa.int/safe/sentinel-1.0/sentinel-1/sar/level-1">
  <metadataSection>
    <metadataObject ID="generalProductInformation">
      <metadataWrap><xmlData>
        <s1sarl1:standAloneProductInformation>
          <s1sarl1:productClass>S</s1sarl1:productClass>
          <s1sarl1:transmitterReceiverPolarisation>VV</s1sarl1:transmitterReceiverPolarisation>
          <s1sarl1:transmitterReceiverPolarisation>VH</s1sarl1:transmitterReceiverPolarisation>
        </s1sarl1:standAloneProductInformation>
      </xmlData></metadataWrap>
    </metadataObject>
  </metadataSection>
</xfdu:XFDU>"#;

    #[test]
    fn reads_dual_pol_mode() {
        let pols = parse_polarizations(Reader::from_str(MANIFEST)).unwrap();
        assert_eq!(pols, vec![Polarization::Vv, Polarization::Vh]);
    }

    #[test]
    fn single_pol_and_foreign_tags() {
        let xml = r#"<a><transmitterReceiverPolarisation>HH</transmitterReceiverPolarisation>
            <transmitterReceiverPolarisation>VV</transmitterReceiverPolarisation><productClass>VH</productClass></a>"#;
        let pols = parse_polarizations(Reader::from_str(xml)).unwrap();
        assert_eq!(pols, vec![Polarization::Vv]);
    }

    #[test]
    fn broken_manifest_names_its_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("S1A_X.SAFE").join("manifest.safe");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "<xfdu:XFDU><metadataSection></xfdu:XFDU>").unwrap();

        let err = read_manifest_polarizations(&path).unwrap_err();

        assert!(matches!(err, Error::Manifest { path: ref p, .. } if *p == path));
        assert!(err.to_string().contains("S1A_X.SAFE"));
    }
}
