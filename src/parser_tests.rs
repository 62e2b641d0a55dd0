use crate::{ErrorKind, Kind, Table, parse, parse_file};

fn parse_ok(input: &str) -> Table {
    parse(input).unwrap_or_else(|e| panic!("parse failed for {input:?}: {e}"))
}

fn parse_err(input: &str) -> crate::Error {
    match parse(input) {
        Ok(_) => panic!("expected an error for {input:?}"),
        Err(e) => e,
    }
}

#[test]
fn basic_scalar_values() {
    // empty document
    assert!(parse_ok("").is_empty());

    // string
    let t = parse_ok("a = \"hello\"");
    assert_eq!(t["a"].as_str(), Some("hello"));

    // integers
    assert_eq!(parse_ok("a = 42")["a"].as_integer(), Some(42));
    assert_eq!(parse_ok("a = -100")["a"].as_integer(), Some(-100));
    assert_eq!(parse_ok("a = +8")["a"].as_integer(), Some(8));
    assert_eq!(parse_ok("a = 0")["a"].as_integer(), Some(0));

    // float
    let f = parse_ok("a = 3.14")["a"].as_float().unwrap();
    assert!((f - 3.14).abs() < f64::EPSILON);

    // booleans
    assert_eq!(parse_ok("a = true")["a"].as_bool(), Some(true));
    assert_eq!(parse_ok("a = false")["a"].as_bool(), Some(false));

    // multiple keys
    let t = parse_ok("a = 1\nb = 2\nc = 3");
    assert_eq!(t.len(), 3);
    assert_eq!(t["a"].as_integer(), Some(1));
    assert_eq!(t["c"].as_integer(), Some(3));
}

#[test]
fn string_escapes() {
    let t = parse_ok(r#"a = "line1\nline2""#);
    assert_eq!(t["a"].as_str(), Some("line1\nline2"));

    let t = parse_ok(r#"a = "col1\tcol2""#);
    assert_eq!(t["a"].as_str(), Some("col1\tcol2"));

    let t = parse_ok(r#"a = "path\\to""#);
    assert_eq!(t["a"].as_str(), Some("path\\to"));

    let t = parse_ok(r#"a = "say \"hi\"""#);
    assert_eq!(t["a"].as_str(), Some("say \"hi\""));

    let t = parse_ok(r#"a = "bell\b form\f cr\r""#);
    assert_eq!(t["a"].as_str(), Some("bell\u{8} form\u{c} cr\r"));

    // unicode short \uXXXX and long \UXXXXXXXX
    let t = parse_ok("a = \"\\u0041\"");
    assert_eq!(t["a"].as_str(), Some("A"));
    let t = parse_ok(r#"a = "\U0001F600""#);
    assert_eq!(t["a"].as_str(), Some("\u{1F600}"));
}

#[test]
fn invalid_escapes() {
    assert!(matches!(
        parse_err(r#"a = "\z""#).kind,
        ErrorKind::InvalidEscape('z')
    ));
    assert!(matches!(
        parse_err(r#"a = "\ud800""#).kind,
        ErrorKind::InvalidEscapeValue(0xD800)
    ));
    assert!(matches!(
        parse_err(r#"a = "\U00110000""#).kind,
        ErrorKind::InvalidEscapeValue(0x110000)
    ));
    assert!(matches!(
        parse_err(r#"a = "\uZZZZ""#).kind,
        ErrorKind::InvalidHexEscape('Z')
    ));
    // escapes do not exist in literal strings
    let t = parse_ok(r#"a = 'no\escape'"#);
    assert_eq!(t["a"].as_str(), Some("no\\escape"));
}

#[test]
fn string_types() {
    // multiline basic; leading newline is discarded
    let t = parse_ok("a = \"\"\"\nhello\nworld\"\"\"");
    assert_eq!(t["a"].as_str(), Some("hello\nworld"));

    // multiline literal
    let t = parse_ok("a = '''\nhello\nworld'''");
    assert_eq!(t["a"].as_str(), Some("hello\nworld"));

    // empty strings
    assert_eq!(parse_ok(r#"a = """#)["a"].as_str(), Some(""));
    assert_eq!(parse_ok("a = ''")["a"].as_str(), Some(""));
    assert_eq!(parse_ok(r#"a = """""""#)["a"].as_str(), Some(""));

    // quotes inside multiline strings
    let t = parse_ok("a = \"\"\"one \" two \"\" three\"\"\"");
    assert_eq!(t["a"].as_str(), Some("one \" two \"\" three"));

    // extra quotes immediately before the closing delimiter
    let t = parse_ok("a = \"\"\"end\"\"\"\"\"");
    assert_eq!(t["a"].as_str(), Some("end\"\""));

    // unterminated
    assert!(matches!(
        parse_err("a = \"unterminated").kind,
        ErrorKind::UnterminatedString
    ));
    assert!(matches!(
        parse_err("a = '''\nnever closed").kind,
        ErrorKind::UnterminatedString
    ));

    // raw newline in a single-line string
    assert!(matches!(
        parse_err("a = \"line\nbreak\"").kind,
        ErrorKind::InvalidCharInString('\n')
    ));
}

#[test]
fn multiline_escaped_newline() {
    // backslash at end of line swallows the newline and following whitespace
    let t = parse_ok("s = \"\"\"a\\\n    b\"\"\"");
    assert_eq!(t["s"].as_str(), Some("ab"));

    // across blank lines
    let t = parse_ok("s = \"\"\"a\\\n\n\n  b\"\"\"");
    assert_eq!(t["s"].as_str(), Some("ab"));

    // backslash, whitespace, then the newline
    let t = parse_ok("s = \"\"\"a\\   \nb\"\"\"");
    assert_eq!(t["s"].as_str(), Some("ab"));

    // whitespace after the backslash without a newline is an error
    assert!(matches!(
        parse_err("s = \"\"\"a\\ b\"\"\"").kind,
        ErrorKind::InvalidEscape(' ')
    ));
}

#[test]
fn number_formats() {
    // hex, octal, binary
    assert_eq!(parse_ok("a = 0xDEAD")["a"].as_integer(), Some(0xDEAD));
    assert_eq!(parse_ok("a = 0xdead")["a"].as_integer(), Some(0xDEAD));
    assert_eq!(parse_ok("a = 0o777")["a"].as_integer(), Some(0o777));
    assert_eq!(parse_ok("a = 0b1010")["a"].as_integer(), Some(0b1010));
    assert_eq!(
        parse_ok("n = 0xDEAD_BEEF")["n"].value::<i64>(),
        Some(3735928559)
    );

    // special floats
    assert_eq!(parse_ok("a = inf")["a"].as_float(), Some(f64::INFINITY));
    assert_eq!(parse_ok("a = +inf")["a"].as_float(), Some(f64::INFINITY));
    assert_eq!(
        parse_ok("a = -inf")["a"].as_float(),
        Some(f64::NEG_INFINITY)
    );
    assert!(parse_ok("a = nan")["a"].as_float().unwrap().is_nan());
    assert!(parse_ok("a = -nan")["a"].as_float().unwrap().is_nan());

    // exponent notation
    let f = parse_ok("a = 1e10")["a"].as_float().unwrap();
    assert!((f - 1e10).abs() < 1.0);
    let f = parse_ok("a = 1.5E-3")["a"].as_float().unwrap();
    assert!((f - 1.5e-3).abs() < 1e-12);
    let f = parse_ok("a = 2e+4")["a"].as_float().unwrap();
    assert!((f - 2e4).abs() < f64::EPSILON);
    let f = parse_ok("a = -0.5")["a"].as_float().unwrap();
    assert!((f + 0.5).abs() < f64::EPSILON);

    // underscores
    assert_eq!(parse_ok("a = 1_000_000")["a"].as_integer(), Some(1_000_000));
    let f = parse_ok("a = 1_000.5")["a"].as_float().unwrap();
    assert!((f - 1000.5).abs() < f64::EPSILON);
    let f = parse_ok("a = 1e1_0")["a"].as_float().unwrap();
    assert!((f - 1e10).abs() < 1.0);

    // integer bounds
    assert_eq!(
        parse_ok("a = 9223372036854775807")["a"].as_integer(),
        Some(i64::MAX)
    );
    assert_eq!(
        parse_ok("a = -9223372036854775808")["a"].as_integer(),
        Some(i64::MIN)
    );
}

#[test]
fn invalid_numbers() {
    for input in [
        "a = 0x",
        "a = 0b2",
        "a = 0o8",
        "a = 01",
        "a = 00.5",
        "a = 1__0",
        "a = _1",
        "a = 1_",
        "a = 0x_1",
        "a = 0xFF_",
        "a = 1.e3",
        "a = .5",
        "a = 1.",
        "a = 9223372036854775808",
        "a = -9223372036854775809",
        "a = 0x8000000000000000",
        "a = 1e",
        "a = 1e+",
        "a = 1e05",
        "a = 1e+05",
        "a = 1e400",
    ] {
        let e = parse_err(input);
        assert!(
            matches!(
                e.kind,
                ErrorKind::InvalidNumber | ErrorKind::Wanted { .. } | ErrorKind::Unexpected(..)
            ),
            "unexpected error {:?} for {input:?}",
            e.kind
        );
    }
}

#[test]
fn integers_roundtrip_in_all_bases() {
    let mut rng = oorandom::Rand64::new(9);
    for _ in 0..2000 {
        let i = (rng.rand_u64() >> 1) as i64; // non-negative
        for text in [
            format!("x = {i}"),
            format!("x = 0x{i:x}"),
            format!("x = 0x{i:X}"),
            format!("x = 0o{i:o}"),
            format!("x = 0b{i:b}"),
        ] {
            let t = parse_ok(&text);
            assert_eq!(t["x"].as_integer(), Some(i), "for {text:?}");
        }
        let neg = -((rng.rand_u64() >> 1) as i64);
        let t = parse_ok(&format!("x = {neg}"));
        assert_eq!(t["x"].as_integer(), Some(neg));
    }
}

#[test]
fn date_time_values() {
    let t = parse_ok("odt = 1979-05-27T07:32:00Z");
    assert_eq!(t["odt"].kind(), Kind::OffsetDateTime);
    let dt = t["odt"].as_offset_date_time().unwrap();
    assert_eq!(dt.date.year, 1979);
    assert_eq!(dt.offset.minutes, 0);

    let t = parse_ok("odt = 1979-05-27T00:32:00-07:00");
    assert_eq!(
        t["odt"].as_offset_date_time().unwrap().offset.minutes,
        -420
    );

    let t = parse_ok("ldt = 1979-05-27T07:32:00.999999");
    assert_eq!(t["ldt"].kind(), Kind::LocalDateTime);
    assert_eq!(
        t["ldt"].as_local_date_time().unwrap().time.nanosecond,
        999_999_000
    );

    let t = parse_ok("ld = 1979-05-27");
    assert_eq!(t["ld"].kind(), Kind::LocalDate);
    assert_eq!(t["ld"].as_local_date().unwrap().month, 5);

    let t = parse_ok("lt = 07:32:01");
    assert_eq!(t["lt"].kind(), Kind::LocalTime);
    assert_eq!(t["lt"].as_local_time().unwrap().second, 1);

    // space separator
    let t = parse_ok("odt = 1979-05-27 07:32:00Z");
    assert_eq!(t["odt"].kind(), Kind::OffsetDateTime);

    // bad dates are errors, not strings
    assert!(parse("d = 2023-02-29").is_err());
    assert!(parse("t = 24:00:00").is_err());
}

#[test]
fn arrays() {
    let t = parse_ok("a = [1, 2, 3]");
    let arr = t["a"].as_array().unwrap();
    assert_eq!(arr.len(), 3);
    assert_eq!(arr[0].as_integer(), Some(1));
    assert_eq!(arr[2].as_integer(), Some(3));

    // empty, trailing comma, nested
    assert!(parse_ok("a = []")["a"].as_array().unwrap().is_empty());
    assert_eq!(parse_ok("a = [1, 2,]")["a"].as_array().unwrap().len(), 2);
    let t = parse_ok("a = [[1, 2], [3, 4]]");
    assert_eq!(t["a"][0].as_array().unwrap().len(), 2);

    // newlines and comments anywhere between tokens
    let t = parse_ok("a = [\n  1, # one\n  2,\n  # three\n  3,\n]");
    assert_eq!(t["a"].collect::<i64>(), [1, 2, 3]);

    // heterogeneous
    let t = parse_ok("xs = [1, 2.0, \"three\"]");
    assert_eq!(t["xs"].collect::<f64>(), [1.0, 2.0]);
    assert_eq!(t["xs"].collect::<String>(), ["three"]);

    // unterminated
    assert!(parse("a = [1, 2").is_err());
}

#[test]
fn inline_tables() {
    let t = parse_ok("a = {x = 1, y = 2}");
    let inner = t["a"].as_table().unwrap();
    assert_eq!(inner.len(), 2);
    assert!(inner.is_inline());
    assert_eq!(inner.get("x").unwrap().as_integer(), Some(1));

    // empty
    assert!(parse_ok("a = {}")["a"].as_table().unwrap().is_empty());

    // nested
    let t = parse_ok("a = {b = {c = 1}}");
    assert_eq!(t["a.b.c"].as_integer(), Some(1));

    // dotted keys inside
    let t = parse_ok("a = {b.c = 1, b.d = 2}");
    assert_eq!(t["a.b.c"].as_integer(), Some(1));
    assert_eq!(t["a.b.d"].as_integer(), Some(2));

    // array of inline tables
    let t = parse_ok("a = [{x = 1}, {x = 2}]");
    assert_eq!(t["a"][1]["x"].as_integer(), Some(2));

    // newlines are not permitted inside inline tables
    assert!(parse("a = {x = 1,\ny = 2}").is_err());
    assert!(parse("a = {\n}").is_err());

    // no trailing comma
    assert!(parse("a = {x = 1,}").is_err());

    // duplicate key inside
    assert!(matches!(
        parse_err("a = {x = 1, x = 2}").kind,
        ErrorKind::DuplicateKey { .. }
    ));
}

#[test]
fn table_headers_and_structure() {
    // simple and repeated headers
    let t = parse_ok("[table]\nkey = 1");
    assert_eq!(t["table.key"].as_integer(), Some(1));

    let t = parse_ok("[a]\nx = 1\n[b]\ny = 2");
    assert_eq!(t["a.x"].as_integer(), Some(1));
    assert_eq!(t["b.y"].as_integer(), Some(2));

    // dotted header
    let t = parse_ok("[a.b.c]\nkey = 1");
    assert_eq!(t["a.b.c.key"].as_integer(), Some(1));

    // whitespace inside headers
    let t = parse_ok("[ a . b ]\nkey = 1");
    assert_eq!(t["a.b.key"].as_integer(), Some(1));

    // dotted key-value
    let t = parse_ok("a.b.c = 1");
    assert_eq!(
        t.get("a")
            .unwrap()
            .as_table()
            .unwrap()
            .get("b")
            .unwrap()
            .as_table()
            .unwrap()
            .get("c")
            .unwrap()
            .as_integer(),
        Some(1)
    );

    let t = parse_ok("a.x = 1\na.y = 2");
    assert_eq!(t["a.x"].as_integer(), Some(1));
    assert_eq!(t["a.y"].as_integer(), Some(2));

    // implicit table claimed by a later header
    let t = parse_ok("[a.b]\nx = 1\n[a]\ny = 2");
    assert_eq!(t["a.y"].as_integer(), Some(2));
    assert_eq!(t["a.b.x"].as_integer(), Some(1));

    // keys after a header land in that table
    let t = parse_ok("top = 1\n[s]\ninner = 2");
    assert_eq!(t["top"].as_integer(), Some(1));
    assert_eq!(t["s.inner"].as_integer(), Some(2));
}

#[test]
fn array_of_tables() {
    let t = parse_ok("[[items]]\nname = \"a\"\n[[items]]\nname = \"b\"");
    assert_eq!(t["items"].kind(), Kind::TableArray);
    let arr = t["items"].as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["name"].as_str(), Some("a"));
    assert_eq!(arr[1]["name"].as_str(), Some("b"));

    // sub-tables attach to the most recent element
    let t = parse_ok("[[fruit]]\nname = \"apple\"\n[fruit.physical]\ncolor = \"red\"");
    assert_eq!(t["fruit"][0]["name"].as_str(), Some("apple"));
    assert_eq!(t["fruit"][0]["physical"]["color"].as_str(), Some("red"));

    // nested array of tables
    let t = parse_ok("[[a]]\nx = 1\n[[a.b]]\ny = 2\n[[a]]\nx = 3");
    assert_eq!(t["a"][0]["b"][0]["y"].as_integer(), Some(2));
    assert_eq!(t["a"][1]["x"].as_integer(), Some(3));
    assert!(t["a"][1]["b"].is_none());
}

#[test]
fn structural_errors() {
    // duplicate key in a single table
    assert!(matches!(
        parse_err("a = 1\na = 2").kind,
        ErrorKind::DuplicateKey { .. }
    ));

    // table header repeated
    assert!(matches!(
        parse_err("[t]\na = 1\n[t]\nb = 2").kind,
        ErrorKind::DuplicateTable { .. }
    ));
    assert!(matches!(
        parse_err("[t]\n[t]").kind,
        ErrorKind::DuplicateTable { .. }
    ));

    // header over an existing value
    assert!(matches!(
        parse_err("a = 1\n[a]\nb = 2").kind,
        ErrorKind::DuplicateKey { .. }
    ));

    // header over a dotted-created table
    assert!(matches!(
        parse_err("a.b = 1\n[a]").kind,
        ErrorKind::DuplicateKey { .. }
    ));

    // table redefined as an array of tables
    assert!(matches!(
        parse_err("[a]\nx = 1\n[[a]]").kind,
        ErrorKind::RedefineAsArray
    ));

    // appending to a value-authored (static) array
    assert!(matches!(
        parse_err("a = [1]\n[[a]]").kind,
        ErrorKind::DuplicateKey { .. }
    ));
    assert!(matches!(
        parse_err("a = []\n[[a]]").kind,
        ErrorKind::DuplicateKey { .. }
    ));
    assert!(matches!(
        parse_err("a = [{x = 1}]\n[[a]]").kind,
        ErrorKind::DuplicateKey { .. }
    ));

    // dotted key through a non-table value
    assert!(matches!(
        parse_err("a = 1\na.b = 2").kind,
        ErrorKind::DottedKeyInvalidType
    ));

    // dotted key into a table already defined in header form
    assert!(matches!(
        parse_err("[a.b]\nx = 1\n[a]\nb.y = 2").kind,
        ErrorKind::DottedKeyInvalidType
    ));

    // trailing garbage after a value
    assert!(matches!(
        parse_err("a = 1 x").kind,
        ErrorKind::Wanted {
            expected: "newline",
            ..
        }
    ));
    assert!(matches!(
        parse_err("[a] x").kind,
        ErrorKind::Wanted {
            expected: "newline",
            ..
        }
    ));

    // empty key segments
    assert!(matches!(parse_err("\"\" = 1").kind, ErrorKind::EmptyKey));
    assert!(parse("a..b = 1").is_err());

    // missing value
    assert!(matches!(parse_err("a = ").kind, ErrorKind::UnexpectedEof));
}

#[test]
fn inline_tables_are_frozen() {
    // later header over an inline table
    let e = parse_err("a = {x = 1}\n[a]\ny = 2");
    assert!(matches!(e.kind, ErrorKind::DuplicateKey { .. }));
    assert_eq!(e.position().map(|(line, _)| line), Some(2));

    // dotted key into an inline table
    assert!(matches!(
        parse_err("a = {x = 1}\na.y = 2").kind,
        ErrorKind::DottedKeyInvalidType
    ));

    // header path traversing an inline table
    assert!(matches!(
        parse_err("a = {x = 1}\n[a.b]\ny = 2").kind,
        ErrorKind::DuplicateKey { .. }
    ));
}

#[test]
fn quoted_keys() {
    let t = parse_ok(r#""quoted key" = 1"#);
    assert_eq!(t.get("quoted key").unwrap().as_integer(), Some(1));

    let t = parse_ok(r#""key\nwith\nnewlines" = 1"#);
    assert!(t.contains_key("key\nwith\nnewlines"));

    let t = parse_ok("'literal key' = 1");
    assert_eq!(t.get("literal key").unwrap().as_integer(), Some(1));

    // a quoted segment in a dotted key
    let t = parse_ok("a.\"b.c\" = 1");
    assert_eq!(
        t.get("a")
            .unwrap()
            .as_table()
            .unwrap()
            .get("b.c")
            .unwrap()
            .as_integer(),
        Some(1)
    );

    // multiline strings are not keys
    assert!(matches!(
        parse_err("\"\"\"k\"\"\" = 1").kind,
        ErrorKind::MultilineStringKey
    ));
}

#[test]
fn comments_and_whitespace() {
    let t = parse_ok("# comment\na = 1 # inline comment\n# another");
    assert_eq!(t["a"].as_integer(), Some(1));

    let t = parse_ok("\n\n\na = 1\n\n\n");
    assert_eq!(t["a"].as_integer(), Some(1));

    let t = parse_ok("[t] # comment after header\na = 1");
    assert_eq!(t["t.a"].as_integer(), Some(1));
}

#[test]
fn line_terminators() {
    // CRLF
    let t = parse_ok("a = 1\r\nb = 2\r\n");
    assert_eq!(t["a"].as_integer(), Some(1));
    assert_eq!(t["b"].as_integer(), Some(2));

    // lone CR acts as a terminator
    let t = parse_ok("a = 1\rb = 2");
    assert_eq!(t["a"].as_integer(), Some(1));
    assert_eq!(t["b"].as_integer(), Some(2));

    // terminators inside multiline strings normalize to \n
    let t = parse_ok("a = \"\"\"x\r\ny\"\"\"");
    assert_eq!(t["a"].as_str(), Some("x\ny"));
}

#[test]
fn byte_order_mark_is_skipped() {
    let t = parse_ok("\u{feff}a = 1");
    assert_eq!(t["a"].as_integer(), Some(1));
}

#[test]
fn error_positions() {
    let e = parse_err("a = 1\nb = x");
    assert_eq!(e.position().map(|(line, _)| line), Some(2));

    let e = parse_err("a = 1\nb = 2\n[a]\n");
    assert_eq!(e.position().map(|(line, _)| line), Some(3));

    let e = parse_err("ok = 1\r\nbad = @");
    assert_eq!(e.position().map(|(line, _)| line), Some(2));

    // column is 1-based
    let e = parse_err("x = y");
    let (line, column) = e.position().unwrap();
    assert_eq!(line, 1);
    assert_eq!(column, 5);
}

#[test]
fn recursion_limit() {
    let deep = format!("a = {}", "[".repeat(300));
    assert!(matches!(parse_err(&deep).kind, ErrorKind::RecursionLimit));

    // well under the limit is fine
    let mut nested = String::from("a = ");
    nested.push_str(&"[".repeat(50));
    nested.push('1');
    nested.push_str(&"]".repeat(50));
    assert!(parse(&nested).is_ok());
}

#[test]
fn parse_file_adapter() {
    let path = std::env::temp_dir().join(format!(
        "toml_tree_parser_test_{}.toml",
        std::process::id()
    ));
    std::fs::write(&path, "a = 1\n[t]\nb = 2\n").unwrap();
    let t = parse_file(&path).unwrap();
    assert_eq!(t["a"].as_integer(), Some(1));
    assert_eq!(t["t.b"].as_integer(), Some(2));
    std::fs::remove_file(&path).unwrap();

    let err = parse_file(&path).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Io(_)));
}

#[test]
fn mixed_document() {
    let input = r#"
title = "TOML Example"
enabled = true
count = 100
ratio = 0.5

[database]
server = "192.168.1.1"
ports = [8001, 8001, 8002]
enabled = true

[servers.alpha]
ip = "10.0.0.1"

[servers.beta]
ip = "10.0.0.2"

[[products]]
name = "Hammer"
sku = 738594937

[[products]]
name = "Nail"
sku = 284758393
"#;
    let t = parse_ok(input);
    assert_eq!(t["title"].as_str(), Some("TOML Example"));
    assert_eq!(t["count"].as_integer(), Some(100));
    assert_eq!(t["database.ports"].as_array().unwrap().len(), 3);
    assert_eq!(t["servers.alpha.ip"].as_str(), Some("10.0.0.1"));
    assert_eq!(t["products"][0]["name"].as_str(), Some("Hammer"));
    assert_eq!(t["products"][1]["sku"].as_integer(), Some(284758393));
}
