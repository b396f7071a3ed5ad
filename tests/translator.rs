use pallenec::parser;

/// Parse and translate a source buffer. Translation needs only the
/// parse-time spans, so the fixed-point property can be exercised on the
/// plain-Lua output as well.
fn translate(source: &str) -> String {
    let parsed = parser::parse("test.pln", source).expect("source should parse");
    pallenec::translator::translate(source, &parsed.program, &parsed.comments)
}

#[test]
fn test_variable_annotation_whiteout() {
    assert_eq!(
        translate("local xs: integer = 10\n"),
        "local xs          = 10\n"
    );
}

#[test]
fn test_export_rewrites_to_local() {
    let output = translate("export function f() end\n");
    assert!(output.contains("local  function f() end"), "got: {output}");
    assert!(output.contains("return {\n    f = f,\n}\n"), "got: {output}");
}

#[test]
fn test_no_exports_appends_nothing() {
    let source = "local function f() end\n";
    assert_eq!(translate(source), source);
}

#[test]
fn test_non_stripped_bytes_are_identical() {
    let source = "function mean(a: float, b: float): float\n    return (a + b) / 2.0\nend\n";
    let output = translate(source);
    assert_eq!(source.len() + "return {\n    mean = mean,\n}\n".len(), output.len());
    for (index, (src, out)) in source.bytes().zip(output.bytes()).enumerate() {
        let in_annotation = matches!(index, 15..=21 | 25..=31 | 33..=39);
        if !in_annotation {
            assert_eq!(src, out, "byte {index} changed");
        }
    }
}

#[test]
fn test_stripped_bytes_preserve_line_geometry() {
    let source = "function f(): (integer,\n\tinteger) return 1, 2 end\n";
    let output = translate(source);
    assert_eq!(source.len() + "return {\n    f = f,\n}\n".len(), output.len());
    // the newline and tab inside the stripped annotation survive
    let annotation = &output[12..33];
    assert_eq!(annotation, " ".repeat(11) + "\n\t" + &" ".repeat(8));
    assert_eq!(source.matches('\n').count() + 3, output.matches('\n').count());
}

#[test]
fn test_cast_is_stripped() {
    let source = "local x = 10 as float\n";
    let output = translate(source);
    assert_eq!(output, "local x = 10         \n");
}

#[test]
fn test_typealias_and_record_are_whited_out() {
    let source = "typealias Ints = { integer }\nrecord P\n    x: float\nend\nlocal function f() end\n";
    let output = translate(source);
    let expected =
        "                            \n        \n            \n   \nlocal function f() end\n";
    assert_eq!(output, expected);
}

#[test]
fn test_comment_inside_stripped_span_is_preserved() {
    let source = "local x: --[[keep]] integer = 1\n";
    let output = translate(source);
    assert_eq!(output, "local x  --[[keep]]         = 1\n");
}

#[test]
fn test_translate_is_a_fixed_point() {
    let sources = [
        "local xs: integer = 10\n",
        "export function f() end\n",
        "function gcd(a: integer, b: integer): integer\n    if b == 0 then\n        return a\n    else\n        return gcd(b, a % b)\n    end\nend\n",
        "typealias Ints = { integer }\nexport n: integer = 3\n",
    ];
    for source in sources {
        let once = translate(source);
        let twice = translate(&once);
        assert_eq!(once, twice, "translator is not a fixed point on: {source}");
    }
}

#[test]
fn test_exports_in_declaration_order() {
    let source = "export function b() end\nexport function a() end\n";
    let output = translate(source);
    let b = output.find("    b = b,").unwrap();
    let a = output.find("    a = a,").unwrap();
    assert!(b < a, "exports must keep declaration order");
}
