//! Remote-learning wire contract: pure parse/format functions over the
//! `/explore`, `/model`, `/info`, `/welcome`, `/observation` payload
//! grammars. No network code lives here — see module docs on `liaison`.

use crate::error::AsrtmError;
use crate::knowledge_base::{KnobValue, OperatingPoint};

/// Which inbound/outbound suffix a message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    /// Inbound: replace every cluster's knowledge base with a single OP and
    /// enter design-space exploration.
    Explore,
    /// Inbound: install a whole new knowledge base, clustered by feature key.
    Model,
    /// Inbound: request for a caller-supplied description string.
    Info,
    /// Inbound: request for this liaison's client id.
    Welcome,
    /// Outbound only: a measurement report.
    Observation,
    /// Outbound only: the last-will message published on disconnect.
    Kia,
}

impl Topic {
    /// Parse the suffix of an inbound topic string, e.g. `margot/myapp/explore`
    /// → `Explore`. Case-sensitive, matching the original wire contract.
    pub fn from_suffix(suffix: &str) -> Result<Self, AsrtmError> {
        match suffix {
            "explore" => Ok(Topic::Explore),
            "model" => Ok(Topic::Model),
            "info" => Ok(Topic::Info),
            "welcome" => Ok(Topic::Welcome),
            "observation" => Ok(Topic::Observation),
            "kia" => Ok(Topic::Kia),
            other => Err(AsrtmError::UnknownTopic(other.to_string())),
        }
    }

    pub fn as_suffix(&self) -> &'static str {
        match self {
            Topic::Explore => "explore",
            Topic::Model => "model",
            Topic::Info => "info",
            Topic::Welcome => "welcome",
            Topic::Observation => "observation",
            Topic::Kia => "kia",
        }
    }
}

/// One message exchanged with the remote-learning channel: a topic and its
/// raw payload. Parsing the payload into the shape `Topic` implies is the
/// caller's job — done through the functions below, not by this type.
#[derive(Debug, Clone)]
pub struct LiaisonMessage {
    pub topic: Topic,
    pub payload: String,
}

impl LiaisonMessage {
    pub fn new(topic: Topic, payload: impl Into<String>) -> Self {
        Self {
            topic,
            payload: payload.into(),
        }
    }
}

fn parse_csv_f64(field: &str) -> Result<Vec<f64>, AsrtmError> {
    if field.is_empty() {
        return Ok(Vec::new());
    }
    field
        .split(',')
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| AsrtmError::MessageParse(format!("not a number: {v}")))
        })
        .collect()
}

fn join_csv(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// One parsed `/observation` report.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub seconds: u64,
    pub nanoseconds: u32,
    pub client_id: String,
    pub knobs: Vec<f64>,
    pub features: Vec<f64>,
    pub metrics: Vec<f64>,
}

/// Format an outbound `/observation` payload:
/// `<seconds>,<nanoseconds> <client-id> <knobs> [<features>] <metrics>`,
/// commas inside a section, spaces between sections. The feature section is
/// omitted entirely when there are no features, matching the grammar's
/// optional bracket.
pub fn format_observation(
    client_id: &str,
    seconds: u64,
    nanoseconds: u32,
    knobs: &[f64],
    features: &[f64],
    metrics: &[f64],
) -> String {
    let mut sections = vec![
        format!("{seconds},{nanoseconds}"),
        client_id.to_string(),
        join_csv(knobs),
    ];
    if !features.is_empty() {
        sections.push(join_csv(features));
    }
    sections.push(join_csv(metrics));
    sections.join(" ")
}

/// Parse an `/observation` payload produced by [`format_observation`].
/// `knob_count` and `metric_count` disambiguate the optional feature
/// section — without them, a payload with no features is indistinguishable
/// from one with all-features-and-no-metrics.
pub fn parse_observation(
    payload: &str,
    knob_count: usize,
    metric_count: usize,
) -> Result<Observation, AsrtmError> {
    let mut sections = payload.split(' ');
    let timestamp = sections
        .next()
        .ok_or_else(|| AsrtmError::MessageParse("missing timestamp".into()))?;
    let (seconds, nanoseconds) = timestamp
        .split_once(',')
        .ok_or_else(|| AsrtmError::MessageParse(format!("malformed timestamp: {timestamp}")))?;
    let seconds: u64 = seconds
        .parse()
        .map_err(|_| AsrtmError::MessageParse(format!("bad seconds: {seconds}")))?;
    let nanoseconds: u32 = nanoseconds
        .parse()
        .map_err(|_| AsrtmError::MessageParse(format!("bad nanoseconds: {nanoseconds}")))?;

    let client_id = sections
        .next()
        .ok_or_else(|| AsrtmError::MessageParse("missing client id".into()))?
        .to_string();

    let knobs = parse_csv_f64(
        sections
            .next()
            .ok_or_else(|| AsrtmError::MessageParse("missing knob values".into()))?,
    )?;
    if knobs.len() != knob_count {
        return Err(AsrtmError::MessageParse(format!(
            "expected {knob_count} knobs, got {}",
            knobs.len()
        )));
    }

    let remaining: Vec<&str> = sections.collect();
    let (features, metrics_field) = match remaining.len() {
        1 => (Vec::new(), remaining[0]),
        2 => (parse_csv_f64(remaining[0])?, remaining[1]),
        n => {
            return Err(AsrtmError::MessageParse(format!(
                "expected 1 or 2 remaining sections, got {n}"
            )))
        }
    };
    let metrics = parse_csv_f64(metrics_field)?;
    if metrics.len() != metric_count {
        return Err(AsrtmError::MessageParse(format!(
            "expected {metric_count} metrics, got {}",
            metrics.len()
        )));
    }

    Ok(Observation {
        seconds,
        nanoseconds,
        client_id,
        knobs,
        features,
        metrics,
    })
}

/// Decodes one whitespace-separated token of a `/model` line into knob
/// values — injected so the caller controls the token format, per spec.
pub trait TokenDecoder {
    fn decode(&self, token: &str) -> Result<Vec<KnobValue>, AsrtmError>;
}

/// The straightforward decoder: a comma-separated list of means, no stddev.
pub struct CsvMeanDecoder;

impl TokenDecoder for CsvMeanDecoder {
    fn decode(&self, token: &str) -> Result<Vec<KnobValue>, AsrtmError> {
        parse_csv_f64(token).map(|means| means.into_iter().map(KnobValue::exact).collect())
    }
}

/// Parse an `/explore` payload: a single configuration token and metrics
/// token separated by whitespace, the same per-OP shape as one `/model`
/// line but carrying exactly one Operating Point.
pub fn parse_explore(
    payload: &str,
    decoder: &dyn TokenDecoder,
) -> Result<OperatingPoint, AsrtmError> {
    let (config_token, metrics_token) = payload
        .trim()
        .split_once(char::is_whitespace)
        .ok_or_else(|| AsrtmError::MessageParse(format!("malformed explore payload: {payload}")))?;
    let configuration = decoder.decode(config_token.trim())?;
    let metrics = decoder.decode(metrics_token.trim())?;
    Ok(OperatingPoint::new(configuration, metrics))
}

/// One `/model` line's feature-key section marker: `#<feature-key>` opens a
/// new cluster; every OP line until the next marker (or end of payload)
/// belongs to it. Lines before the first marker belong to an unnamed
/// default cluster. The base wire grammar only specifies the per-OP line
/// shape; this marker convention is how feature-key grouping for `/model`
/// is layered on top of it — see DESIGN.md.
const FEATURE_KEY_MARKER: char = '#';

/// Parse a `/model` payload into an ordered map from feature-key to the OPs
/// installed under it, preserving the order feature keys first appear in.
pub fn parse_model(
    payload: &str,
    decoder: &dyn TokenDecoder,
) -> Result<Vec<(String, Vec<OperatingPoint>)>, AsrtmError> {
    let mut clusters: Vec<(String, Vec<OperatingPoint>)> = Vec::new();
    let mut current = String::new();

    for line in payload.split('@') {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(key) = line.strip_prefix(FEATURE_KEY_MARKER) {
            current = key.trim().to_string();
            if !clusters.iter().any(|(name, _)| name == &current) {
                clusters.push((current.clone(), Vec::new()));
            }
            continue;
        }
        let (config_token, metrics_token) = line
            .split_once(char::is_whitespace)
            .ok_or_else(|| AsrtmError::MessageParse(format!("malformed model line: {line}")))?;
        let configuration = decoder.decode(config_token.trim())?;
        let metrics = decoder.decode(metrics_token.trim())?;
        let op = OperatingPoint::new(configuration, metrics);

        match clusters.iter_mut().find(|(name, _)| name == &current) {
            Some((_, ops)) => ops.push(op),
            None => clusters.push((current.clone(), vec![op])),
        }
    }
    Ok(clusters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_round_trips_through_suffix() {
        for t in [
            Topic::Explore,
            Topic::Model,
            Topic::Info,
            Topic::Welcome,
            Topic::Observation,
            Topic::Kia,
        ] {
            assert_eq!(Topic::from_suffix(t.as_suffix()).unwrap(), t);
        }
    }

    #[test]
    fn unknown_topic_is_an_error() {
        assert!(Topic::from_suffix("bogus").is_err());
    }

    #[test]
    fn observation_round_trips_with_features() {
        let payload = format_observation("client-1", 100, 250, &[1.0, 2.0], &[0.5], &[9.0]);
        let parsed = parse_observation(&payload, 2, 1).unwrap();
        assert_eq!(parsed.seconds, 100);
        assert_eq!(parsed.nanoseconds, 250);
        assert_eq!(parsed.client_id, "client-1");
        assert_eq!(parsed.knobs, vec![1.0, 2.0]);
        assert_eq!(parsed.features, vec![0.5]);
        assert_eq!(parsed.metrics, vec![9.0]);
    }

    #[test]
    fn observation_round_trips_without_features() {
        let payload = format_observation("client-1", 1, 2, &[1.0], &[], &[9.0, 8.0]);
        let parsed = parse_observation(&payload, 1, 2).unwrap();
        assert!(parsed.features.is_empty());
        assert_eq!(parsed.metrics, vec![9.0, 8.0]);
    }

    #[test]
    fn observation_rejects_wrong_arity() {
        let payload = format_observation("client-1", 1, 2, &[1.0], &[], &[9.0]);
        assert!(parse_observation(&payload, 2, 1).is_err());
    }

    #[test]
    fn model_parses_lines_into_ops_grouped_by_feature_key() {
        let payload = "#low\n1.0,2.0 3.0@4.0,5.0 6.0@#high\n7.0 8.0@";
        let clusters = parse_model(payload, &CsvMeanDecoder).unwrap();
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].0, "low");
        assert_eq!(clusters[0].1.len(), 2);
        assert_eq!(clusters[0].1[0].configuration[0].mean, 1.0);
        assert_eq!(clusters[1].0, "high");
        assert_eq!(clusters[1].1.len(), 1);
    }

    #[test]
    fn model_without_any_marker_uses_a_default_cluster() {
        let payload = "1.0 2.0@";
        let clusters = parse_model(payload, &CsvMeanDecoder).unwrap();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].0, "");
    }

    #[test]
    fn model_rejects_a_line_without_two_tokens() {
        let payload = "1.0,2.0@";
        assert!(parse_model(payload, &CsvMeanDecoder).is_err());
    }

    #[test]
    fn explore_parses_a_single_operating_point() {
        let op = parse_explore("1.0,2.0 3.0", &CsvMeanDecoder).unwrap();
        assert_eq!(op.configuration.len(), 2);
        assert_eq!(op.metrics[0].mean, 3.0);
    }

    #[test]
    fn explore_rejects_a_payload_without_two_tokens() {
        assert!(parse_explore("1.0,2.0", &CsvMeanDecoder).is_err());
    }
}
