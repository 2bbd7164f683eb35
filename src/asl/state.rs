//! The tagged state-variant model: one Rust type per ASL state type, built
//! once by [`super::builder::compile`] and immutable thereafter. Dispatch is
//! by `match`, never by downcast — see the "tagged variants instead of
//! inheritance" design note this crate follows.

use crate::types::QueryLanguage;
use rustc_hash::FxHashMap;
use serde_json::Value;

/// Where a state sends control after it completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Next(String),
    End,
}

/// The shared input/output transformation fields every non-terminal state
/// carries, regardless of mode (unused fields for a given mode are simply
/// left `None` — mode-forbidden combinations are rejected at build time).
#[derive(Debug, Clone, Default)]
pub struct Transform {
    pub input_path: Option<String>,
    pub parameters: Option<Value>,
    pub arguments: Option<Value>,
    pub result_selector: Option<Value>,
    pub result_path: Option<String>,
    pub output_path: Option<String>,
    pub assign: Option<Value>,
    pub output: Option<Value>,
}

/// A labeled, directed graph of states plus a start label. Branches of a
/// Parallel state and the `ItemProcessor` of a Map state are each an
/// independent `StateMachine`.
#[derive(Debug, Clone)]
pub struct StateMachine {
    pub start_at: String,
    pub states: FxHashMap<String, State>,
    pub query_language: QueryLanguage,
}

impl StateMachine {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&State> {
        self.states.get(name)
    }
}

#[derive(Debug, Clone)]
pub enum State {
    Pass(PassState),
    Task(TaskState),
    Wait(WaitState),
    Choice(ChoiceState),
    Succeed(SucceedState),
    Fail(FailState),
    Parallel(ParallelState),
    Map(MapState),
}

impl State {
    #[must_use]
    pub fn query_language(&self) -> QueryLanguage {
        match self {
            State::Pass(s) => s.query_language,
            State::Task(s) => s.query_language,
            State::Wait(s) => s.query_language,
            State::Choice(s) => s.query_language,
            State::Succeed(s) => s.query_language,
            State::Fail(s) => s.query_language,
            State::Parallel(s) => s.query_language,
            State::Map(s) => s.query_language,
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            State::Pass(_) => "Pass",
            State::Task(_) => "Task",
            State::Wait(_) => "Wait",
            State::Choice(_) => "Choice",
            State::Succeed(_) => "Succeed",
            State::Fail(_) => "Fail",
            State::Parallel(_) => "Parallel",
            State::Map(_) => "Map",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PassState {
    pub query_language: QueryLanguage,
    pub result: Option<Value>,
    pub transform: Transform,
    pub transition: Transition,
}

#[derive(Debug, Clone, Default)]
pub struct Retrier {
    pub error_equals: Vec<String>,
    pub interval_seconds: u32,
    pub max_attempts: u32,
    pub backoff_rate: f64,
    pub max_delay_seconds: Option<u32>,
    pub jitter_strategy: JitterStrategy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JitterStrategy {
    #[default]
    None,
    Full,
}

#[derive(Debug, Clone)]
pub struct Catcher {
    pub error_equals: Vec<String>,
    pub next: String,
    pub result_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TaskState {
    pub query_language: QueryLanguage,
    pub resource: String,
    pub transform: Transform,
    pub retry: Vec<Retrier>,
    pub catch: Vec<Catcher>,
    pub transition: Transition,
}

#[derive(Debug, Clone)]
pub struct WaitState {
    pub query_language: QueryLanguage,
    pub seconds: Option<f64>,
    pub seconds_path: Option<String>,
    pub timestamp: Option<String>,
    pub timestamp_path: Option<String>,
    pub transform: Transform,
    pub transition: Transition,
}

/// One operator applied to a resolved `Variable` value in a JSONPath choice
/// comparison rule. `*Path` variants compare against a second JSONPath
/// lookup rather than a literal.
#[derive(Debug, Clone)]
pub enum ComparisonOp {
    StringEquals(Value),
    StringEqualsPath(String),
    StringLessThan(String),
    StringLessThanPath(String),
    StringGreaterThan(String),
    StringGreaterThanPath(String),
    StringLessThanEquals(String),
    StringLessThanEqualsPath(String),
    StringGreaterThanEquals(String),
    StringGreaterThanEqualsPath(String),
    NumericEquals(f64),
    NumericEqualsPath(String),
    NumericLessThan(f64),
    NumericLessThanPath(String),
    NumericGreaterThan(f64),
    NumericGreaterThanPath(String),
    NumericLessThanEquals(f64),
    NumericLessThanEqualsPath(String),
    NumericGreaterThanEquals(f64),
    NumericGreaterThanEqualsPath(String),
    BooleanEquals(bool),
    BooleanEqualsPath(String),
    TimestampEquals(String),
    TimestampEqualsPath(String),
    TimestampLessThan(String),
    TimestampLessThanPath(String),
    TimestampGreaterThan(String),
    TimestampGreaterThanPath(String),
    TimestampLessThanEquals(String),
    TimestampLessThanEqualsPath(String),
    TimestampGreaterThanEquals(String),
    TimestampGreaterThanEqualsPath(String),
    IsNull(bool),
    IsNumeric(bool),
    IsString(bool),
    IsBoolean(bool),
    IsTimestamp(bool),
    IsPresent(bool),
    StringMatches(String),
}

/// A choice rule's test: either a JSONPath comparison/logical tree or a raw
/// JSONata boolean condition (already stripped of its `{% %}` wrapper).
#[derive(Debug, Clone)]
pub enum Predicate {
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    Compare { variable: String, op: ComparisonOp },
    Jsonata(String),
}

#[derive(Debug, Clone)]
pub struct ChoiceRule {
    pub predicate: Predicate,
    pub next: String,
}

#[derive(Debug, Clone)]
pub struct ChoiceState {
    pub query_language: QueryLanguage,
    pub choices: Vec<ChoiceRule>,
    pub default: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SucceedState {
    pub query_language: QueryLanguage,
    pub transform: Transform,
}

#[derive(Debug, Clone)]
pub struct FailState {
    pub query_language: QueryLanguage,
    pub error: Option<String>,
    pub cause: Option<String>,
    pub error_path: Option<String>,
    pub cause_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ParallelState {
    pub query_language: QueryLanguage,
    pub branches: Vec<StateMachine>,
    pub transform: Transform,
    pub retry: Vec<Retrier>,
    pub catch: Vec<Catcher>,
    pub transition: Transition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapMode {
    Inline,
    Distributed,
}

#[derive(Debug, Clone)]
pub enum ToleranceValue {
    Count(f64),
    Path(String),
}

#[derive(Debug, Clone)]
pub struct ItemReaderSpec {
    pub resource: String,
    pub parameters: Value,
    pub max_items: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct ItemBatcherSpec {
    pub max_items_per_batch: Option<u32>,
    pub max_input_bytes_per_batch: Option<u64>,
    pub batch_input: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct ResultWriterSpec {
    pub resource: Option<String>,
    pub bucket: Option<String>,
    pub prefix: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MapState {
    pub query_language: QueryLanguage,
    pub mode: MapMode,
    pub items_path: Option<String>,
    pub items: Option<Value>,
    pub item_selector: Option<Value>,
    pub parameters: Option<Value>,
    pub max_concurrency: Option<u32>,
    pub item_processor: Box<StateMachine>,
    pub item_reader: Option<ItemReaderSpec>,
    pub item_batcher: Option<ItemBatcherSpec>,
    pub result_writer: Option<ResultWriterSpec>,
    pub tolerated_failure_count: Option<ToleranceValue>,
    pub tolerated_failure_percentage: Option<ToleranceValue>,
    pub transform: Transform,
    pub retry: Vec<Retrier>,
    pub catch: Vec<Catcher>,
    pub transition: Transition,
}
