//! Points query against the data table

use crate::clickhouse::{quote, ClickHouseClient};
use crate::finder::reverse_string;
use crate::render::data::Data;
use crate::render::error::RenderResult;
use crate::render::point::Point;

/// Points query settings for one data table
#[derive(Debug, Clone)]
pub struct PointsQuery {
    table: String,
    reverse: bool,
}

impl PointsQuery {
    /// Query a table storing paths in forward orientation
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            reverse: false,
        }
    }

    /// Query a table storing paths with reversed segments
    pub fn reversed(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            reverse: true,
        }
    }

    /// SQL selecting RowBinary points for canonical `names`
    pub fn sql(&self, names: &[String], from: i64, until: i64) -> String {
        let paths: Vec<String> = names
            .iter()
            .map(|name| {
                if self.reverse {
                    quote(&reverse_string(name))
                } else {
                    quote(name)
                }
            })
            .collect();

        format!(
            "SELECT Path, Time, Value, Timestamp FROM {} WHERE Path IN ({}) \
             AND Time >= {} AND Time <= {} ORDER BY Path, Time FORMAT RowBinary",
            self.table,
            paths.join(", "),
            from,
            until
        )
    }

    /// Fetch and decode points for `names`.
    ///
    /// `extra_points` are merged into the result under the same ID space.
    pub async fn fetch(
        &self,
        client: &ClickHouseClient,
        names: &[String],
        from: i64,
        until: i64,
        extra_points: &[Point],
    ) -> RenderResult<Data> {
        if names.is_empty() {
            return Ok(Data::parse(&[], extra_points, self.reverse)?);
        }

        let body = client.query(&self.sql(names, from, until)).await?;
        let data = Data::parse(&body, extra_points, self.reverse)?;

        tracing::debug!(
            table = %self.table,
            series = names.len(),
            points = data.len(),
            "Fetched points"
        );

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::data::tests::encode_record;
    use crate::render::error::{DecodeError, RenderError};
    use std::time::Duration;
    use wiremock::matchers::{body_string, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_sql() {
        let query = PointsQuery::new("graphite");
        assert_eq!(
            query.sql(&["a.b".to_string(), "c'd".to_string()], 10, 20),
            r"SELECT Path, Time, Value, Timestamp FROM graphite WHERE Path IN ('a.b', 'c\'d') AND Time >= 10 AND Time <= 20 ORDER BY Path, Time FORMAT RowBinary"
        );
    }

    #[test]
    fn test_reversed_sql() {
        let query = PointsQuery::reversed("graphite_reverse");
        assert!(query
            .sql(&["servers.host1.cpu".to_string()], 0, 60)
            .contains("Path IN ('cpu.host1.servers')"));
    }

    #[tokio::test]
    async fn test_fetch_reversed_table() {
        let server = MockServer::start().await;
        let query = PointsQuery::reversed("graphite_reverse");
        let names = vec!["servers.host1.cpu".to_string()];

        let mut body = Vec::new();
        encode_record(&mut body, "cpu.host1.servers", 60, 1.0, 61);
        encode_record(&mut body, "cpu.host1.servers", 120, 2.0, 121);

        Mock::given(method("POST"))
            .and(body_string(query.sql(&names, 0, 180)))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .mount(&server)
            .await;

        let client = ClickHouseClient::new(server.uri(), Duration::from_secs(5)).unwrap();
        let data = query.fetch(&client, &names, 0, 180, &[]).await.unwrap();

        assert_eq!(data.len(), 2);
        assert!(data
            .points
            .iter()
            .all(|p| &*p.metric == "servers.host1.cpu" && p.metric_id == 1));
    }

    #[tokio::test]
    async fn test_fetch_malformed_body() {
        let server = MockServer::start().await;
        let mut body = Vec::new();
        encode_record(&mut body, "a", 0, 1.0, 0);
        body.pop();

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .mount(&server)
            .await;

        let client = ClickHouseClient::new(server.uri(), Duration::from_secs(5)).unwrap();
        let result = PointsQuery::new("graphite")
            .fetch(&client, &["a".to_string()], 0, 60, &[])
            .await;

        assert!(matches!(
            result,
            Err(RenderError::Decode(DecodeError::MalformedResponse { .. }))
        ));
    }

    #[tokio::test]
    async fn test_fetch_without_names_skips_store() {
        let client = ClickHouseClient::new("http://127.0.0.1:1", Duration::from_millis(100)).unwrap();
        let extra = vec![Point::new("derived", 60, 1.0, 61)];

        let data = PointsQuery::new("graphite")
            .fetch(&client, &[], 0, 60, &extra)
            .await
            .unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data.points[0].metric_id, 1);
    }
}
