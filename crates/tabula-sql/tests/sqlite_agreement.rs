use proptest::prelude::*;
use rusqlite::{params, params_from_iter, types::Value as SqlValue, Connection};
use serde_json::{json, Value};
use tabula_core::schema::field::*;
use tabula_core::schema::*;
use tabula_core::spec::{Operator, Record, SortSpec};
use tabula_core::Spec;
use tabula_sql::{Param, Serializer};

/// Texts chosen to collide with `LIKE` wildcards and case folding.
const TEXTS: &[&str] = &["", "a", "A", "ab", "b%", "a_b", "c\\d", "Ba"];

const TAGS: &[&str] = &["a", "b", "c"];

fn title() -> FieldId {
    FieldId::parse("fldTitle00000000000").unwrap()
}

fn score() -> FieldId {
    FieldId::parse("fldScore00000000000").unwrap()
}

fn done() -> FieldId {
    FieldId::parse("fldDone000000000000").unwrap()
}

fn tags() -> FieldId {
    FieldId::parse("fldTags000000000000").unwrap()
}

fn table() -> Table {
    let name = |s: &str| FieldName::new(s).unwrap();

    Table::builder(BaseId::generate(), "Tasks")
        .db_table_name("tasks")
        .field(SingleLineText::create(title(), name("Title"), Default::default()).unwrap())
        .field(Number::create(score(), name("Score"), Default::default()).unwrap())
        .field(Checkbox::create(done(), name("Done"), Default::default()).unwrap())
        .field(
            MultipleSelect::create(tags(), name("Tags"), SelectOptions::from_names(TAGS.iter().copied()).unwrap())
                .unwrap(),
        )
        .build()
        .unwrap()
}

#[derive(Debug, Clone)]
struct Row {
    title: Option<&'static str>,
    score: Option<i64>,
    done: Option<bool>,
    tags: Option<Vec<&'static str>>,
}

impl Row {
    fn record(&self, id: RecordId) -> Record {
        let mut record = Record::new(id);

        if let Some(value) = self.title {
            record = record.with(title(), value);
        }
        if let Some(value) = self.score {
            record = record.with(score(), json!(value as f64));
        }
        if let Some(value) = self.done {
            record = record.with(done(), value);
        }
        if let Some(value) = &self.tags {
            record = record.with(tags(), json!(value));
        }

        record
    }
}

/// Loads `rows` into a fresh in-memory database and returns the matching
/// evaluator records.
fn load(table: &Table, rows: &[Row]) -> (Connection, Vec<Record>) {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&Serializer::sqlite(table).create_table().unwrap())
        .unwrap();

    let mut records = vec![];

    for (i, row) in rows.iter().enumerate() {
        let id = RecordId::parse(format!("rec{i:016}")).unwrap();

        conn.execute(
            r#"INSERT INTO "tasks" VALUES (?1, ?2, ?3, ?4, ?5)"#,
            params![
                id.as_str(),
                row.title,
                row.score.map(|n| n as f64),
                row.done,
                row.tags.as_ref().map(|tags| json!(tags).to_string()),
            ],
        )
        .unwrap();

        records.push(row.record(id));
    }

    (conn, records)
}

fn bind(param: &Param) -> SqlValue {
    match param {
        Param::Text(s) => SqlValue::Text(s.clone()),
        Param::Number(n) => SqlValue::Real(*n),
        Param::Boolean(b) => SqlValue::Integer(i64::from(*b)),
    }
}

fn select_ids(conn: &Connection, table: &Table, filter: Option<&Spec>, sort: &[SortSpec]) -> Vec<String> {
    let mut params = vec![];
    let sql = Serializer::sqlite(table)
        .select_ids(filter, sort, &mut params)
        .unwrap();

    let mut stmt = conn.prepare(&sql).unwrap();
    let ids = stmt
        .query_map(params_from_iter(params.iter().map(bind)), |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap();
    ids
}

fn arb_row() -> impl Strategy<Value = Row> {
    (
        prop::option::of(prop::sample::select(TEXTS)),
        prop::option::of(-2i64..4),
        prop::option::of(any::<bool>()),
        prop::option::of(prop::sample::subsequence(TAGS, 0..=3)),
    )
        .prop_map(|(title, score, done, tags)| Row {
            title,
            score,
            done,
            tags,
        })
}

/// A scalar operand of any kind, `null` included.
fn arb_operand() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        prop::sample::select(TEXTS).prop_map(Value::from),
        (-2i64..4).prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
    ]
}

/// Any operator over one of the scalar columns.
fn arb_scalar_condition() -> impl Strategy<Value = Spec> {
    (
        prop::sample::select(vec![title(), score(), done()]),
        prop::sample::select(Operator::ALL.to_vec()),
        arb_operand(),
        prop::collection::vec(arb_operand(), 0..=3),
    )
        .prop_map(|(field_id, operator, scalar, list)| {
            let value = if operator.takes_list() {
                Value::Array(list)
            } else {
                scalar
            };
            Spec::condition(field_id, operator, value)
        })
}

/// The operators supported on list columns.
fn arb_tags_condition() -> impl Strategy<Value = Spec> {
    let operators = vec![
        Operator::Is,
        Operator::IsNot,
        Operator::IsEmpty,
        Operator::IsNotEmpty,
        Operator::HasAnyOf,
        Operator::HasAllOf,
    ];

    let element = prop_oneof![
        prop::sample::select(vec!["a", "b", "c", "d"]).prop_map(Value::from),
        (0i64..2).prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
    ];

    (
        prop::sample::select(operators),
        prop::collection::vec(element, 0..=3),
    )
        .prop_map(|(operator, list)| {
            let value = if operator.takes_list() {
                Value::Array(list)
            } else {
                Value::Null
            };
            Spec::condition(tags(), operator, value)
        })
}

fn arb_spec() -> impl Strategy<Value = Spec> {
    let leaf = prop_oneof![arb_scalar_condition(), arb_tags_condition()];

    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(Spec::not),
            prop::collection::vec(inner.clone(), 0..=3).prop_map(Spec::And),
            prop::collection::vec(inner, 0..=3).prop_map(Spec::Or),
        ]
    })
}

proptest! {
    #[test]
    fn sqlite_selects_what_the_evaluator_accepts(
        rows in prop::collection::vec(arb_row(), 0..8),
        spec in arb_spec(),
    ) {
        let table = table();
        let (conn, records) = load(&table, &rows);

        let mut actual = select_ids(&conn, &table, Some(&spec), &[]);
        actual.sort();

        let mut expected: Vec<String> = records
            .iter()
            .filter(|record| spec.is_satisfied_by(record))
            .map(|record| record.id.to_string())
            .collect();
        expected.sort();

        prop_assert_eq!(actual, expected);
    }
}

#[test]
fn sqlite_sorts_like_the_evaluator() {
    let table = table();
    let rows = [Some(2), None, Some(-1), Some(5)].map(|value| Row {
        title: None,
        score: value,
        done: None,
        tags: None,
    });
    let (conn, records) = load(&table, &rows);

    for sort in [SortSpec::asc(score()), SortSpec::desc(score())] {
        let mut expected: Vec<&Record> = records.iter().collect();
        SortSpec::sort(std::slice::from_ref(&sort), &mut expected);
        let expected: Vec<String> = expected.iter().map(|record| record.id.to_string()).collect();

        let actual = select_ids(&conn, &table, None, std::slice::from_ref(&sort));
        assert_eq!(actual, expected, "{sort:?}");
    }
}
