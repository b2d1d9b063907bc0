// src/schema/normalize.rs

use tracing::{debug, info, warn};

use crate::ai::Generator;

use super::types::{CanonicalSchema, TableInfo};

/// Build the transformer prompt for one table.
fn build_prompt(info: &TableInfo) -> String {
    let payload = serde_json::to_string_pretty(info).expect("TableInfo serializes");
    format!(
        "Rewrite the following SAP table extract as a single JSON object with \
         this exact structure:\n\
         {{\n\
         \x20 \"name\": \"table name\",\n\
         \x20 \"description\": \"table description\",\n\
         \x20 \"fields\": [\n\
         \x20   {{\"name\": \"...\", \"data_element\": \"...\", \"type\": \"...\", \
         \"length\": \"...\", \"decimals\": \"...\"}}\n\
         \x20 ]\n\
         }}\n\
         Keep every field, in declaration order. Reply with JSON only.\n\n{}",
        payload
    )
}

/// Strip a surrounding Markdown code fence, if present. Transformer replies
/// sometimes arrive as ```json ... ``` despite the JSON-only instruction.
fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let rest = match trimmed.strip_prefix("```") {
        Some(rest) => rest.strip_prefix("json").unwrap_or(rest),
        None => return trimmed,
    };
    match rest.find("```") {
        Some(end) => rest[..end].trim(),
        None => rest.trim(),
    }
}

/// The deterministic passthrough schema: a lossless identity mapping from
/// the extracted `TableInfo`.
pub fn fallback_schema(info: &TableInfo) -> CanonicalSchema {
    CanonicalSchema {
        name: info.table_name.clone(),
        description: info.description.clone(),
        fields: info.fields.clone(),
    }
}

/// Canonicalize one extracted table via the generative transformer.
///
/// The transformer's reply is untrusted: a failed call, unparseable JSON or
/// a shape mismatch all fall back to [`fallback_schema`], so the generative
/// step can never lose a table that extracted cleanly. Returns `None` only
/// when the resulting schema has no fields; such a schema must not be
/// persisted.
pub async fn normalize<G>(generator: &G, info: &TableInfo) -> Option<CanonicalSchema>
where
    G: Generator + ?Sized,
{
    let prompt = build_prompt(info);
    let schema = match generator.generate(&prompt).await {
        Ok(reply) => match serde_json::from_str::<CanonicalSchema>(strip_code_fences(&reply)) {
            Ok(schema) => {
                debug!(table = %info.table_name, fields = schema.fields.len(), "transformer reply accepted");
                schema
            }
            Err(e) => {
                warn!(table = %info.table_name, error = %e, "transformer reply invalid; using passthrough schema");
                fallback_schema(info)
            }
        },
        Err(e) => {
            warn!(table = %info.table_name, error = %e, "transformer call failed; using passthrough schema");
            fallback_schema(info)
        }
    };

    if schema.fields.is_empty() {
        info!(table = %info.table_name, "no valid structure produced");
        return None;
    }
    Some(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::FieldRecord;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    struct Canned(Result<&'static str>);

    #[async_trait]
    impl Generator for Canned {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            match &self.0 {
                Ok(s) => Ok(s.to_string()),
                Err(e) => Err(anyhow!("{}", e)),
            }
        }
    }

    fn sample_info() -> TableInfo {
        TableInfo {
            table_name: "TCURR".to_string(),
            description: "Currency Exchange Rates".to_string(),
            fields: vec![
                FieldRecord {
                    name: "MANDT".to_string(),
                    data_element: "MANDT".to_string(),
                    ty: "CLNT".to_string(),
                    length: "3".to_string(),
                    decimals: "0".to_string(),
                },
                FieldRecord {
                    name: "KURST".to_string(),
                    data_element: "KURST".to_string(),
                    ty: "CHAR".to_string(),
                    length: "4".to_string(),
                    decimals: "0".to_string(),
                },
                FieldRecord {
                    name: "FCURR".to_string(),
                    data_element: "FCURR".to_string(),
                    ty: "CUKY".to_string(),
                    length: "5".to_string(),
                    decimals: "0".to_string(),
                },
            ],
        }
    }

    #[tokio::test]
    async fn unparseable_reply_falls_back_losslessly() {
        let info = sample_info();
        let schema = normalize(&Canned(Ok("not json")), &info).await.unwrap();
        assert_eq!(schema, fallback_schema(&info));
        assert_eq!(schema.fields, info.fields);
    }

    #[tokio::test]
    async fn transformer_error_falls_back_losslessly() {
        let info = sample_info();
        let schema = normalize(&Canned(Err(anyhow!("quota exceeded"))), &info)
            .await
            .unwrap();
        assert_eq!(schema.name, "TCURR");
        assert_eq!(schema.fields, info.fields);
    }

    #[tokio::test]
    async fn valid_reply_is_used_verbatim() {
        let reply = r#"{
            "name": "TCURR",
            "description": "Exchange Rates",
            "fields": [
                {"name": "MANDT", "data_element": "MANDT", "type": "CLNT", "length": "3", "decimals": "0"}
            ]
        }"#;
        let schema = normalize(&Canned(Ok(reply)), &sample_info()).await.unwrap();
        assert_eq!(schema.description, "Exchange Rates");
        assert_eq!(schema.fields.len(), 1);
        assert_eq!(schema.fields[0].ty, "CLNT");
    }

    #[tokio::test]
    async fn fenced_reply_is_unwrapped() {
        let reply = "```json\n{\"name\": \"TCURR\", \"fields\": [{\"name\": \"MANDT\", \
                     \"data_element\": \"MANDT\", \"type\": \"CLNT\"}]}\n```";
        let schema = normalize(&Canned(Ok(reply)), &sample_info()).await.unwrap();
        assert_eq!(schema.fields[0].length, "");
        assert_eq!(schema.description, "");
    }

    #[tokio::test]
    async fn reply_with_empty_fields_is_rejected() {
        let reply = r#"{"name": "TCURR", "description": "", "fields": []}"#;
        assert!(normalize(&Canned(Ok(reply)), &sample_info()).await.is_none());
    }

    #[tokio::test]
    async fn shape_mismatch_falls_back() {
        // parses as JSON but not as a canonical schema
        let info = sample_info();
        let schema = normalize(&Canned(Ok(r#"{"tables": 3}"#)), &info).await.unwrap();
        assert_eq!(schema.fields, info.fields);
    }

    #[test]
    fn fences_without_terminator_still_strip() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }
}
