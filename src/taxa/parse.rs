use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::error::TaxaError;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTaxon {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default, alias = "iNaturalistTaxonName")]
    pub name: String,
    #[serde(default)]
    pub common_name: Option<String>,
    #[serde(default)]
    pub children: Vec<RawTaxon>,
    #[serde(default)]
    pub observation_count: u64,
    #[serde(default)]
    pub undocumented_count: u64,
    #[serde(default, alias = "iNaturalistTaxonImage")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub wikipedia_summary: Option<String>,
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "taxon id must be a string or number, got {other}"
        ))),
    }
}

/// Accepts either a bare root taxon or a `{ "tree": root }` wrapper.
pub fn parse_tree_document(raw: &str) -> Result<RawTaxon, TaxaError> {
    let parsed: Value = serde_json::from_str(raw)?;
    let root = match parsed {
        Value::Object(object) if object.contains_key("id") => Value::Object(object),
        Value::Object(mut object) => object.remove("tree").ok_or(TaxaError::EmptyDocument)?,
        _ => return Err(TaxaError::EmptyDocument),
    };

    Ok(RawTaxon::deserialize(root)?)
}
