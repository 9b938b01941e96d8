use std::collections::HashMap;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use serde_json::{Map, Number, Value};

use crate::config::PulseConfig;
use crate::trends::types::{RawRecord, TrendStore};

/// Partition key attribute of the trend table.
pub const KEY_ATTRIBUTE: &str = "source";

pub struct DynamoStore {
    client: Client,
}

impl DynamoStore {
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Region and endpoint come from config; credentials from the AWS default chain.
    pub async fn connect(config: &PulseConfig) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_dynamodb::config::Builder::from(&shared);
        // Local DynamoDB / LocalStack
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        tracing::info!(
            target: "trends",
            region = %config.region,
            endpoint = config.endpoint_url.as_deref().unwrap_or("default"),
            "dynamodb client ready"
        );
        Self::from_client(Client::from_conf(builder.build()))
    }
}

#[async_trait]
impl TrendStore for DynamoStore {
    async fn get(&self, table: &str, key: &str) -> Result<Option<RawRecord>> {
        let out = self
            .client
            .get_item()
            .table_name(table)
            .key(KEY_ATTRIBUTE, AttributeValue::S(key.to_string()))
            .send()
            .await
            .map_err(|e| anyhow!("dynamodb get_item: {}", DisplayErrorContext(&e)))?;

        Ok(out.item().map(record_from_item))
    }

    fn name(&self) -> &'static str {
        "dynamodb"
    }
}

pub fn record_from_item(item: &HashMap<String, AttributeValue>) -> RawRecord {
    item.iter()
        .map(|(k, v)| (k.clone(), attribute_to_json(v)))
        .collect()
}

/// DynamoDB attribute value -> JSON. Binary values have no JSON form and become null.
pub fn attribute_to_json(av: &AttributeValue) -> Value {
    match av {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => number_to_json(n),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(list) => Value::Array(list.iter().map(attribute_to_json).collect()),
        AttributeValue::M(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), attribute_to_json(v)))
                .collect::<Map<String, Value>>(),
        ),
        AttributeValue::Ss(set) => Value::Array(set.iter().cloned().map(Value::String).collect()),
        AttributeValue::Ns(set) => Value::Array(set.iter().map(|n| number_to_json(n)).collect()),
        _ => Value::Null,
    }
}

/// DynamoDB numbers travel as decimal strings.
fn number_to_json(n: &str) -> Value {
    let t = n.trim();
    if let Ok(i) = t.parse::<i64>() {
        return Value::Number(i.into());
    }
    t.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(n.to_string()))
}
