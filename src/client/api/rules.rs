//! Realtime rules, over the REST API
//!
//! Rules carry their Python body plus unit tests. Panther runs the tests on
//! save; a 400 reporting failing tests becomes [`ApiError::FailingTests`] with
//! every result unpacked.

use std::fmt;
use std::str::FromStr;

use futures::stream::BoxStream;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue, json};

use crate::client::pagination::{PageExtractor, REST_PAGE_SIZE};
use crate::client::panther::Panther;
use crate::client::request::RequestDescriptor;
use crate::convert::Value;
use crate::error::{ApiError, Error, Result};
use crate::normalize::ShapeMapping;

const RESOURCE: &str = "rules";
const FAILING_TESTS_MESSAGE: &str = "you have failing tests";

/// Default severity of alerts a rule raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl FromStr for Severity {
    type Err = ApiError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INFO" => Ok(Severity::Info),
            "LOW" => Ok(Severity::Low),
            "MEDIUM" => Ok(Severity::Medium),
            "HIGH" => Ok(Severity::High),
            "CRITICAL" => Ok(Severity::Critical),
            _ => Err(ApiError::validation(format!("Invalid severity: {s}"))),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overrides a Python function while a unit test runs.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMock {
    pub object_name: String,
    pub return_value: JsonValue,
}

impl RuleMock {
    fn to_json(&self) -> JsonValue {
        json!({"objectName": self.object_name, "returnValue": self.return_value})
    }
}

/// One unit test: a log event and whether it should raise an alert.
///
/// A string `event` is taken to be JSON text already; anything else is
/// serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitTest {
    pub name: String,
    pub expected_result: bool,
    pub event: JsonValue,
    pub mocks: Vec<RuleMock>,
}

impl UnitTest {
    fn to_json(&self) -> JsonValue {
        let resource = match &self.event {
            JsonValue::String(text) => text.clone(),
            other => other.to_string(),
        };
        json!({
            "name": self.name,
            "expectedResult": self.expected_result,
            "resource": resource,
            "mocks": self.mocks.iter().map(RuleMock::to_json).collect::<Vec<_>>(),
        })
    }
}

/// Inline filters, either as YAML text or as filter objects to be dumped to YAML.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineFilters {
    Yaml(String),
    Filters(Vec<JsonValue>),
}

impl InlineFilters {
    fn to_yaml(&self) -> Result<String> {
        match self {
            InlineFilters::Yaml(text) => Ok(text.clone()),
            InlineFilters::Filters(filters) => serde_yaml::to_string(filters)
                .map_err(|e| ApiError::validation(format!("Invalid inline filters: {e}")).into()),
        }
    }
}

/// Fields of a rule create or update. Unset fields are left out of the payload.
///
/// A create needs `body`, `severity` and `log_types`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSpec {
    pub body: Option<String>,
    pub severity: Option<Severity>,
    pub log_types: Option<Vec<String>>,
    pub dedup_period_minutes: Option<u32>,
    pub description: Option<String>,
    pub display_name: Option<String>,
    pub enabled: Option<bool>,
    pub inline_filters: Option<InlineFilters>,
    pub managed: Option<bool>,
    pub reports: Option<JsonValue>,
    pub runbook: Option<String>,
    pub summary_attributes: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub tests: Option<Vec<UnitTest>>,
}

impl RuleSpec {
    pub fn new(body: impl Into<String>, severity: Severity, log_types: Vec<String>) -> Self {
        Self {
            body: Some(body.into()),
            severity: Some(severity),
            log_types: Some(log_types),
            ..Default::default()
        }
    }

    fn to_payload(&self, id: &str) -> Result<Map<String, JsonValue>> {
        let mut payload = Map::new();
        payload.insert("id".to_string(), JsonValue::from(id));
        if let Some(body) = &self.body {
            payload.insert("body".to_string(), JsonValue::from(body.as_str()));
        }
        if let Some(severity) = self.severity {
            payload.insert("severity".to_string(), JsonValue::from(severity.as_str()));
        }
        if let Some(dedup) = self.dedup_period_minutes {
            payload.insert("dedupPeriodMinutes".to_string(), JsonValue::from(dedup));
        }
        if let Some(description) = &self.description {
            payload.insert("description".to_string(), JsonValue::from(description.as_str()));
        }
        if let Some(display_name) = &self.display_name {
            payload.insert("displayName".to_string(), JsonValue::from(display_name.as_str()));
        }
        if let Some(enabled) = self.enabled {
            payload.insert("enabled".to_string(), JsonValue::from(enabled));
        }
        if let Some(filters) = &self.inline_filters {
            payload.insert("inlineFilters".to_string(), JsonValue::from(filters.to_yaml()?));
        }
        if let Some(log_types) = &self.log_types {
            payload.insert("logTypes".to_string(), json!(log_types));
        }
        if let Some(managed) = self.managed {
            payload.insert("managed".to_string(), JsonValue::from(managed));
        }
        if let Some(reports) = &self.reports {
            payload.insert("reports".to_string(), reports.clone());
        }
        if let Some(runbook) = &self.runbook {
            payload.insert("runbook".to_string(), JsonValue::from(runbook.as_str()));
        }
        if let Some(attributes) = &self.summary_attributes {
            payload.insert("summaryAttributes".to_string(), json!(attributes));
        }
        if let Some(tags) = &self.tags {
            payload.insert("tags".to_string(), json!(tags));
        }
        if let Some(tests) = &self.tests {
            let tests: Vec<JsonValue> = tests.iter().map(UnitTest::to_json).collect();
            payload.insert("tests".to_string(), JsonValue::Array(tests));
        }
        Ok(payload)
    }
}

/// Whether Panther runs the unit tests before saving, or only runs them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TestRun {
    pub run_tests_first: Option<bool>,
    pub run_tests_only: Option<bool>,
}

impl TestRun {
    fn apply(&self, mut request: RequestDescriptor) -> RequestDescriptor {
        if let Some(first) = self.run_tests_first {
            request = request.query_param("run-tests-first", first);
        }
        if let Some(only) = self.run_tests_only {
            request = request.query_param("run-tests-only", only);
        }
        request
    }
}

/// Error reported by a test or one of a rule's auxiliary functions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TestError {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

/// Output of one auxiliary function, such as `title` or `dedup`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TestFunctionOutput {
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub error: Option<TestError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestFunctions {
    pub alert_context: Option<TestFunctionOutput>,
    pub dedup: Option<TestFunctionOutput>,
    pub description: Option<TestFunctionOutput>,
    pub destinations: Option<TestFunctionOutput>,
    pub reference: Option<TestFunctionOutput>,
    pub runbook: Option<TestFunctionOutput>,
    pub severity: Option<TestFunctionOutput>,
    pub title: Option<TestFunctionOutput>,
}

/// Outcome of one unit test.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub name: String,
    #[serde(default)]
    pub passed: bool,
    #[serde(default)]
    pub errored: bool,
    #[serde(default)]
    pub trigger_alert: Option<bool>,
    #[serde(default)]
    pub error: Option<TestError>,
    #[serde(default)]
    pub functions: Option<TestFunctions>,
}

impl TestResult {
    pub fn failed(&self) -> bool {
        !self.passed || self.errored
    }
}

/// Read a test result as Panther returns it, either as an object or as JSON text.
pub fn unpack_test_result(body: JsonValue) -> Result<TestResult> {
    let body = match body {
        JsonValue::String(text) => serde_json::from_str(&text)?,
        other => other,
    };
    Ok(serde_json::from_value(body)?)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FailingTestsReport {
    message: String,
    #[serde(default)]
    test_results: Vec<TestResult>,
}

fn failing_test_results(err: &Error) -> Option<Vec<TestResult>> {
    let Some(ApiError::Http { status: 400, body }) = err.api() else {
        return None;
    };
    let report: FailingTestsReport = serde_json::from_str(body).ok()?;
    (report.message == FAILING_TESTS_MESSAGE).then_some(report.test_results)
}

fn with_test_failures(id: &str, err: Error) -> Error {
    match failing_test_results(&err) {
        Some(results) => ApiError::FailingTests {
            id: id.to_string(),
            results,
        }
        .into(),
        None => err,
    }
}

fn is_not_found(err: &Error) -> bool {
    matches!(err.api(), Some(ApiError::Http { status: 404, .. }))
}

fn rule_path(id: &str) -> Result<String> {
    if id.is_empty() || id.contains('/') {
        return Err(ApiError::validation(format!("Invalid rule ID: '{id}'")).into());
    }
    Ok(format!("{RESOURCE}/{id}"))
}

pub struct Rules<'a> {
    client: &'a Panther,
}

impl<'a> Rules<'a> {
    pub(crate) fn new(client: &'a Panther) -> Self {
        Self { client }
    }

    /// Every realtime rule, fetched 50 at a time.
    pub fn list(&self) -> BoxStream<'static, Result<Value>> {
        self.client.paginate(
            RequestDescriptor::get(RESOURCE).param("limit", REST_PAGE_SIZE),
            PageExtractor::rest("results", "next"),
            ShapeMapping::new(),
        )
    }

    pub async fn get(&self, id: &str) -> Result<Value> {
        self.client
            .execute(RequestDescriptor::get(rule_path(id)?), &ShapeMapping::new())
            .await
    }

    /// Create a rule. A 204 from Panther yields `Value::Null`.
    pub async fn create(&self, id: &str, spec: &RuleSpec, run: TestRun) -> Result<Value> {
        rule_path(id)?;
        if spec.body.is_none() || spec.severity.is_none() || spec.log_types.is_none() {
            return Err(
                ApiError::validation("A new rule needs a body, a severity and log types").into(),
            );
        }
        let request = run.apply(RequestDescriptor::post(RESOURCE).params(spec.to_payload(id)?));
        self.client
            .execute(request, &ShapeMapping::new())
            .await
            .map_err(|e| with_test_failures(id, e))
    }

    /// Apply `changes` on top of the stored rule.
    ///
    /// The rule must already exist; it is fetched first and the merged body is
    /// sent back.
    pub async fn update(&self, id: &str, changes: &RuleSpec, run: TestRun) -> Result<Value> {
        let path = rule_path(id)?;
        let changes = changes.to_payload(id)?;
        let mut payload = match self.get(id).await?.to_canonical() {
            JsonValue::Object(current) => current,
            _ => Map::new(),
        };
        payload.extend(changes);

        let request = run.apply(RequestDescriptor::put(path).params(payload));
        self.client
            .execute(request, &ShapeMapping::new())
            .await
            .map_err(|e| with_test_failures(id, e))
    }

    /// Delete a rule. With `ignore_missing` a 404 counts as success.
    pub async fn delete(&self, id: &str, ignore_missing: bool) -> Result<()> {
        let request = RequestDescriptor::delete(rule_path(id)?);
        match self.client.send_raw(&request).await {
            Ok(_) => Ok(()),
            Err(err) if ignore_missing && is_not_found(&err) => Ok(()),
            Err(err) => Err(err),
        }
    }
}
