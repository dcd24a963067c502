use std::fs;
use std::path::PathBuf;

use svp_dict_core::MAX_DESCRIPTION_CHARS;
use svp_dict_extract::{
    ExpectedNames, Extractor, Strategy, extract_descriptions, normalize, parse_export_symbols,
};

#[test]
fn test_free_form_fixture_prefers_labels_then_blocks() {
    let source = fixture("svppol_free.rpgle");
    let expected = ExpectedNames::new([
        "SVPPOL_GETPOLIZA",
        "SVPPOL_CHKVIGENCIA",
        "SVPPOL_SETESTADO",
        "SVPPOL_CALCPRIMA",
        "SVPPOL_SINDOC",
    ]);

    let result = extract_descriptions(&source, &expected);

    let poliza = result.get("SVPPOL_GETPOLIZA").expect("label for getPoliza");
    assert_eq!(poliza.text, "Obtiene los datos de una póliza");
    assert_eq!(poliza.strategy, Strategy::InlineLabel);
    assert_eq!(poliza.line, Some(6));

    assert_eq!(
        result.description("SVPPOL_CHKVIGENCIA"),
        Some("Verifica que la póliza esté vigente a la fecha indicada")
    );

    let estado = result.get("SVPPOL_SETESTADO").expect("banner above setEstado");
    assert_eq!(estado.text, "Cambia el estado de la póliza");
    assert_eq!(estado.strategy, Strategy::BlockHeader);

    assert_eq!(
        result.description("SVPPOL_CALCPRIMA"),
        Some("Calcula la prima total incluyendo recargos ****")
    );

    assert!(!result.contains("SVPPOL_SINDOC"));
    assert_eq!(result.len(), 4);
}

#[test]
fn test_internal_procedure_comment_is_not_misattributed() {
    let source = fixture("svppol_free.rpgle");
    let expected = ExpectedNames::new(["SVPPOL_FORMATEA"]);
    assert!(extract_descriptions(&source, &expected).is_empty());
}

#[test]
fn test_fixed_form_fixture() {
    let source = fixture("svpsin_fixed.rpgle");
    let listing = fixture("svpsin_exports.txt");
    let expected: ExpectedNames = parse_export_symbols(&listing, "SVPSIN").into_iter().collect();
    assert_eq!(expected.len(), 5);

    let result = extract_descriptions(&source, &expected);

    assert_eq!(
        result.description("SVPSIN_GETRECLAMO"),
        Some("Obtiene los datos de un reclamo")
    );
    // Continuation runs until the next code line, so the closing banner is kept.
    let banner = "=".repeat(65);
    assert_eq!(
        result.description("SVPSIN_CHGESTADOSRECLAMO"),
        Some(format!("Cambia los estados del reclamo indicado {banner}").as_str())
    );
    assert_eq!(result.description("SVPSIN_ANULARECLAMO"), Some("Anula un reclamo"));
    assert_eq!(
        result.description("SVPSIN_TIENEPAGOS"),
        Some("Verifica si el reclamo tiene pagos")
    );
    assert!(!result.contains("SVPSIN_ERROR"));
}

#[test]
fn test_inference_fills_undocumented_names() {
    let source = fixture("svpsin_fixed.rpgle");
    let expected = ExpectedNames::new(["SVPSIN_GETRECLAMO", "SVPSIN_ERROR", "SVPSIN_UPDPAGO"]);

    let result = Extractor::with_strategies(&expected, Strategy::ALL).extract(&source);

    assert_eq!(result.get("SVPSIN_GETRECLAMO").unwrap().strategy, Strategy::InlineLabel);
    assert_eq!(result.description("SVPSIN_ERROR"), Some("Error"));
    assert_eq!(result.description("SVPSIN_UPDPAGO"), Some("Actualiza pago"));
}

#[test]
fn test_labels_do_not_bleed_into_each_other() {
    let expected = ExpectedNames::new(["PROCA", "PROCB"]);
    let result = extract_descriptions("// PROCA : Does the thing\n// PROCB : Does another\n", &expected);
    assert_eq!(result.description("PROCA"), Some("Does the thing"));
    assert_eq!(result.description("PROCB"), Some("Does another"));
}

#[test]
fn test_block_header_with_dashed_lines() {
    let source = "// -- computes total\n// -- for the order\ndcl-proc PROCA export;\nend-proc;\n";
    let expected = ExpectedNames::new(["PROCA"]);
    let result = extract_descriptions(source, &expected);
    assert_eq!(result.description("PROCA"), Some("computes total for the order"));
}

#[test]
fn test_crlf_source_matches_lf_source() {
    let lf = fixture("svppol_free.rpgle");
    let crlf = lf.replace('\n', "\r\n");
    let expected = ExpectedNames::new(["SVPPOL_GETPOLIZA", "SVPPOL_CALCPRIMA", "SVPPOL_SETESTADO"]);
    assert_eq!(
        extract_descriptions(&lf, &expected),
        extract_descriptions(&crlf, &expected)
    );
}

#[test]
fn test_descriptions_are_single_bounded_lines() {
    let long_block = format!(
        "// {}\n// {}\ndcl-proc PROCA export;\n",
        "palabra ".repeat(30),
        "otra ".repeat(40)
    );
    let expected = ExpectedNames::new(["PROCA"]);
    let result = extract_descriptions(&long_block, &expected);
    let text = result.description("PROCA").unwrap();
    assert!(text.chars().count() <= MAX_DESCRIPTION_CHARS);
    assert!(text.ends_with("..."));
    assert!(!text.contains('\n'));
    assert_eq!(normalize(text), text);
}

#[test]
fn test_same_extractor_reused_across_sources() {
    let expected = ExpectedNames::new(["PROCA"]);
    let extractor = Extractor::new(&expected);
    assert_eq!(extractor.extract("// PROCA : uno\n").description("PROCA"), Some("uno"));
    assert_eq!(extractor.extract("// PROCA : dos\n").description("PROCA"), Some("dos"));
    assert!(extractor.extract("").is_empty());
}

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(path).expect("fixture file must be readable")
}
