use std::io::{Read, Write};

use base64ct::{Base64, Encoding};
use flate2::{Compression, read::ZlibDecoder, write::ZlibEncoder};
use serde::{Deserialize, Serialize};

use crate::{
    element::Element,
    error::{ArbResult, LoadContext},
    localization::Message,
    types::Version,
};

/// Element name of run notes.
pub const TAG: &str = "Notes";
const FAULTS_TAG: &str = "Faults";
const CRCD_TAG: &str = "CRCD";
const CRCD_META_TAG: &str = "CRCDMeta";
const CRCD_META2_TAG: &str = "CRCDMeta2";
const OTHER_TAG: &str = "Other";

/// Free-form notes on a run, including the course diagram.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notes {
    /// Fault lines, in order. Blank lines are kept.
    pub faults: Vec<String>,
    /// Course diagram text.
    pub crcd: String,
    /// Raw course-diagram metafile bytes.
    pub crcd_meta: Vec<u8>,
    /// Free text.
    pub other: String,
}

/// base64 of the zlib-compressed payload.
pub fn encode_meta(raw: &[u8]) -> ArbResult<String> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(raw)?;
    Ok(Base64::encode_string(&encoder.finish()?))
}

/// Inverse of [`encode_meta`].
pub fn decode_meta(text: &str) -> ArbResult<Vec<u8>> {
    let packed = Base64::decode_vec(text.trim())?;
    let mut raw = Vec::new();
    ZlibDecoder::new(packed.as_slice()).read_to_end(&mut raw)?;
    Ok(raw)
}

/// Legacy `CRCDMeta` held the bytes base64-encoded without compression.
fn decode_legacy_meta(text: &str) -> ArbResult<Vec<u8>> {
    Ok(Base64::decode_vec(text.trim())?)
}

impl Notes {
    /// True when there is nothing to save.
    pub fn is_empty(&self) -> bool {
        self.faults.is_empty() && self.crcd.is_empty() && self.crcd_meta.is_empty() && self.other.is_empty()
    }

    /// Reads a `Notes` element, decoding CRCD metadata when present.
    pub fn load(tree: &Element, version: Version, ctx: &mut LoadContext<'_>) -> Option<Self> {
        let mut notes = Notes::default();
        for child in tree.children() {
            match child.name() {
                FAULTS_TAG => notes.faults.push(child.value().to_string()),
                CRCD_TAG => notes.crcd = child.value().to_string(),
                OTHER_TAG => notes.other = child.value().to_string(),
                name @ (CRCD_META_TAG | CRCD_META2_TAG) => {
                    let decoded = if name == CRCD_META2_TAG {
                        decode_meta(child.value())
                    } else {
                        decode_legacy_meta(child.value())
                    };
                    match decoded {
                        Ok(raw) => notes.crcd_meta = raw,
                        // Early files wrote placeholder metadata that never decoded.
                        Err(_) if version < Version::new(12, 9) => notes.crcd_meta.clear(),
                        Err(err) => {
                            tracing::warn!(%err, "dropping course diagram metadata");
                            let detail = format!("{name}: {err}");
                            ctx.log(Message::InvalidDocStructure(&detail));
                            notes.crcd_meta.clear();
                        }
                    }
                }
                _ => {}
            }
        }
        Some(notes)
    }

    /// Appends a `Notes` element unless empty.
    pub fn save(&self, parent: &mut Element) -> bool {
        if self.is_empty() {
            return true;
        }
        let encoded = if self.crcd_meta.is_empty() {
            None
        } else {
            match encode_meta(&self.crcd_meta) {
                Ok(text) => Some(text),
                Err(err) => {
                    tracing::warn!(%err, "could not encode course diagram metadata");
                    return false;
                }
            }
        };
        let notes = parent.add_element(TAG);
        // Blank fault lines are kept so the list reloads unchanged.
        for fault in &self.faults {
            notes.add_element(FAULTS_TAG).set_value(fault.as_str());
        }
        notes.add_text_element(CRCD_TAG, &self.crcd);
        if let Some(text) = encoded {
            notes.add_text_element(CRCD_META2_TAG, &text);
        }
        notes.add_text_element(OTHER_TAG, &self.other);
        true
    }
}
